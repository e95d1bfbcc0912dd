//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod console;
mod engine_api;
mod storage;

pub use console::init_logging;
pub use engine_api::{
    calibration_status, cancel_calibration, clear_calibration_data, gesture_history, init_engine,
    process_hands, start_calibration, stop_calibration, subscribe,
};
pub use storage::BrowserStore;
