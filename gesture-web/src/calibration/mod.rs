//! Calibration module - labeled sample capture sessions
//!
//! Re-exports only. All logic in submodules.

mod session;
mod status;

pub use session::{CalibrationOptions, CalibrationSession, CaptureOutcome, FinishedSession, Recording};
pub use status::{CalibrationState, CalibrationStatus};
