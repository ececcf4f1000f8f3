//! Audible scan confirmation. Plays a short two-tone chirp when the gate
//! admits a value.

use log::warn;
use rodio::{OutputStream, Sink, Source};
use std::f32::consts::PI;
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

enum FeedbackCommand {
    Chirp,
}

/// Cheap-to-clone handle; the non-Send audio objects live on a dedicated
/// thread that is spawned lazily on first use.
#[derive(Clone)]
pub struct FeedbackHandle {
    tx: Arc<Mutex<Option<Sender<FeedbackCommand>>>>,
}

impl FeedbackHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<FeedbackCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<FeedbackCommand>();

        thread::Builder::new()
            .name("quickqr-feedback".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        FeedbackCommand::Chirp => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                warn!("Scan chirp unavailable: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(ScanChirp::new());
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    /// Fire-and-forget: audio problems are logged, never surfaced.
    pub fn chirp(&self) {
        match self.ensure_thread() {
            Ok(tx) => {
                if let Err(err) = tx.send(FeedbackCommand::Chirp) {
                    warn!("Feedback thread unavailable: {err}");
                }
            }
            Err(err) => warn!("Failed to start feedback thread: {err}"),
        }
    }
}

/// Two ascending sine tones, ~140 ms total.
struct ScanChirp {
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
}

impl ScanChirp {
    const TONE_MS: usize = 70;
    const LOW_FREQ: f32 = 880.0;
    const HIGH_FREQ: f32 = 1320.0;

    fn new() -> Self {
        let sample_rate = 44100;
        Self {
            sample_rate,
            num_sample: 0,
            total_samples: sample_rate as usize * 2 * Self::TONE_MS / 1000,
        }
    }
}

impl Iterator for ScanChirp {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }

        let half = self.total_samples / 2;
        let freq = if self.num_sample < half {
            Self::LOW_FREQ
        } else {
            Self::HIGH_FREQ
        };

        let t = self.num_sample as f32 / self.sample_rate as f32;
        let sample = (2.0 * PI * freq * t).sin();
        self.num_sample += 1;

        Some(sample * 0.2)
    }
}

impl Source for ScanChirp {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(2 * Self::TONE_MS as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chirp_is_finite_and_bounded() {
        let chirp = ScanChirp::new();
        let samples: Vec<f32> = chirp.collect();
        assert_eq!(samples.len(), 44100 * 2 * 70 / 1000);
        assert!(samples.iter().all(|s| s.abs() <= 0.2 + f32::EPSILON));
    }
}
