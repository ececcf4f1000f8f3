//! Scan-history data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic type of a scanned payload, as persisted with each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanKind {
    Url,
    Wifi,
    Text,
}

impl ScanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanKind::Url => "URL",
            ScanKind::Wifi => "WIFI",
            ScanKind::Text => "TEXT",
        }
    }
}

/// One accepted scan. Append-only: nothing but `favorite` is ever updated
/// after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub content: String,
    pub kind: ScanKind,
    pub scanned_at: DateTime<Utc>,
    pub favorite: bool,
}
