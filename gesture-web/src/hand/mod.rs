//! Hand module - landmark model, geometry and pose history
//!
//! Re-exports only. All logic in submodules.

pub mod finger;
pub mod geometry;
pub mod history;
pub mod landmarks;

pub use finger::{finger_curl, is_finger_extended, is_thumb_extended, Finger, FingerStates};
pub use history::{PoseHistory, HISTORY_CAPACITY};
pub use landmarks::{HandObservation, Handedness, Landmark, LANDMARK_COUNT};
