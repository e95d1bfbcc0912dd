//! Error type shared by the persistence layer and the JS bridge.
//!
//! Nothing in the frame path returns these: insufficient data is `None`,
//! degenerate geometry is clamped, and storage failures are logged and dropped
//! at the engine boundary.

use wasm_bindgen::JsValue;

/// Result alias for gesture-web
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Engine not initialized; call init_engine first")]
    NotInitialized,
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
