//! Gesture Web - adaptive hand-gesture recognition for the browser
//!
//! Turns per-frame hand landmarks into discrete gesture events using a bank of
//! geometric detectors fused with classifiers trained from user calibration.
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen start hook; the JS API lives in `bridge`

mod bridge;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod features;
pub mod hand;
pub mod persistence;

use wasm_bindgen::prelude::*;

pub use bridge::{
    calibration_status, cancel_calibration, clear_calibration_data, gesture_history, init_engine,
    process_hands, start_calibration, stop_calibration, subscribe, BrowserStore,
};
pub use calibration::{CalibrationOptions, CalibrationStatus};
pub use config::EngineConfig;
pub use engine::{EngineEvent, GestureEngine, GestureEvent, GestureSource};
pub use error::{EngineError, Result};
pub use hand::{HandObservation, Handedness, Landmark};
pub use persistence::{KeyValueStore, MemoryStore};

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    bridge::init_logging();
}
