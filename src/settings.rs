use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerSettings {
    /// Index of the capture device handed to the camera backend.
    pub camera_index: u32,
    /// Minimum gap between two admitted scans.
    pub cooldown_ms: u64,
    /// Play the confirmation chirp on an admitted scan.
    pub sound_enabled: bool,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            cooldown_ms: 500,
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub scanner: ScannerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> UserSettings {
        self.data.read().unwrap().clone()
    }

    pub fn scanner(&self) -> ScannerSettings {
        self.data.read().unwrap().scanner.clone()
    }

    pub fn update(&self, settings: UserSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
