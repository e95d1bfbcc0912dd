//! Snapshot of calibration state for UIs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::features::FeatureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationState {
    Idle,
    Recording,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationStatus {
    pub state: CalibrationState,
    pub label: Option<String>,
    pub collected: usize,
    pub target: usize,
    /// Stored samples per label, per feature kind
    pub sample_counts: BTreeMap<FeatureKind, BTreeMap<String, usize>>,
    /// Labels known to each trained model
    pub trained_labels: BTreeMap<FeatureKind, Vec<String>>,
}
