//! Engine configuration
//!
//! Every field has a default; JavaScript may pass a partial JSON object and
//! only the keys it names are overridden.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration for a [`GestureEngine`](crate::engine::GestureEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum time between two emitted gesture events (system-wide)
    pub cooldown_ms: f64,
    /// Frames kept per hand in the pose history
    pub history_capacity: usize,
    /// Learned predictions below this confidence are ignored by fusion
    pub learned_floor: f32,
    /// Weight of the location k-NN vote relative to the softmax models
    pub location_weight: f32,
    /// Emitted events kept for inspection
    pub gesture_history_limit: usize,
    /// Keep emitting gestures while a calibration session is recording
    pub detect_while_calibrating: bool,
    pub calibration: CalibrationConfig,
    pub training: TrainingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1000.0,
            history_capacity: 12,
            learned_floor: 0.6,
            location_weight: 0.9,
            gesture_history_limit: 50,
            detect_while_calibrating: false,
            calibration: CalibrationConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Defaults for calibration sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Samples to collect before a session stops on its own
    pub target_samples: usize,
    /// Minimum time between two captures
    pub capture_interval_ms: f64,
    /// Train when the target is reached
    pub auto_train: bool,
    /// Train on an explicit stop that does not say otherwise
    pub train_on_stop: bool,
    /// Per-label cap in the sample store; oldest samples are evicted
    pub max_samples_per_label: usize,
    /// Persist the sample store every N captures
    pub flush_every: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            target_samples: 40,
            capture_interval_ms: 150.0,
            auto_train: true,
            train_on_stop: true,
            max_samples_per_label: 180,
            flush_every: 10,
        }
    }
}

/// Hyper-parameters for the classifier bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub handshape: SoftmaxParams,
    pub orientation: SoftmaxParams,
    pub location: LocationParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            handshape: SoftmaxParams {
                epochs: 180,
                min_samples: 8,
                ..SoftmaxParams::default()
            },
            orientation: SoftmaxParams {
                epochs: 150,
                min_samples: 6,
                ..SoftmaxParams::default()
            },
            location: LocationParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftmaxParams {
    pub epochs: usize,
    pub learning_rate: f32,
    /// L2 penalty on weights (bias is not regularized)
    pub l2: f32,
    /// Stop early once mean cross-entropy drops below this
    pub loss_threshold: f32,
    pub min_samples: usize,
}

impl Default for SoftmaxParams {
    fn default() -> Self {
        Self {
            epochs: 150,
            learning_rate: 0.2,
            l2: 1e-3,
            loss_threshold: 0.02,
            min_samples: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationParams {
    /// Upper bound on neighbours; the model uses min(k, samples)
    pub k: usize,
    pub min_samples: usize,
}

impl Default for LocationParams {
    fn default() -> Self {
        Self { k: 5, min_samples: 3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "cooldown_ms": 250, "calibration": { "target_samples": 5 } }"#)
            .unwrap();
        assert_eq!(config.cooldown_ms, 250.0);
        assert_eq!(config.calibration.target_samples, 5);
        assert_eq!(config.calibration.max_samples_per_label, 180);
        assert_eq!(config.training.handshape.epochs, 180);
        assert_eq!(config.training.orientation.min_samples, 6);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(EngineConfig::from_json("{ cooldown_ms").is_err());
    }
}
