//! Calibration session state machine
//!
//! The session only decides *when* to capture and when the run is over. The
//! engine owns the sample store and the classifiers and acts on the outcomes
//! returned here.

use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;

/// Per-session overrides; anything left out falls back to [`CalibrationConfig`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationOptions {
    pub target_samples: Option<usize>,
    pub capture_interval_ms: Option<f64>,
    pub auto_train: Option<bool>,
}

/// A session that is collecting samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    pub label: String,
    pub target: usize,
    pub interval_ms: f64,
    pub auto_train: bool,
    pub collected: usize,
    #[serde(skip)]
    last_capture_ms: Option<f64>,
}

/// What happened to a frame offered to the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// Not recording, or the capture interval has not elapsed
    Skipped,
    Captured {
        collected: usize,
        target: usize,
        /// Target reached; the session is now idle
        complete: bool,
    },
}

/// Summary of a session that just ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinishedSession {
    pub label: String,
    pub collected: usize,
    pub target: usize,
    pub auto_train: bool,
}

#[derive(Debug, Default)]
pub struct CalibrationSession {
    recording: Option<Recording>,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    /// Begin recording under `label`. An empty (or blank) label is ignored and
    /// returns `None`. Starting while already recording replaces the session.
    pub fn start(
        &mut self,
        label: &str,
        options: &CalibrationOptions,
        defaults: &CalibrationConfig,
    ) -> Option<&Recording> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let interval_ms = options
            .capture_interval_ms
            .filter(|ms| ms.is_finite())
            .unwrap_or(defaults.capture_interval_ms)
            .max(0.0);

        self.recording = Some(Recording {
            label: label.to_string(),
            target: options.target_samples.unwrap_or(defaults.target_samples).max(1),
            interval_ms,
            auto_train: options.auto_train.unwrap_or(defaults.auto_train),
            collected: 0,
            last_capture_ms: None,
        });
        self.recording.as_ref()
    }

    /// Offer a frame at `now_ms`. The first frame of a session is always
    /// captured; later ones once `interval_ms` has elapsed.
    pub fn try_capture(&mut self, now_ms: f64) -> CaptureOutcome {
        let Some(rec) = self.recording.as_mut() else {
            return CaptureOutcome::Skipped;
        };
        if let Some(last) = rec.last_capture_ms {
            if now_ms - last < rec.interval_ms {
                return CaptureOutcome::Skipped;
            }
        }

        rec.collected += 1;
        rec.last_capture_ms = Some(now_ms);
        let (collected, target) = (rec.collected, rec.target);
        let complete = collected >= target;
        CaptureOutcome::Captured {
            collected,
            target,
            complete,
        }
    }

    /// End the session, returning what it collected. `None` when idle.
    pub fn finish(&mut self) -> Option<FinishedSession> {
        self.recording.take().map(|rec| FinishedSession {
            label: rec.label,
            collected: rec.collected,
            target: rec.target,
            auto_train: rec.auto_train,
        })
    }
}
