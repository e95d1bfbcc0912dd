//! Feature packet - the three typed vectors fed to the classifier bank

use serde::{Deserialize, Serialize};

/// Number of handshape features
pub const HANDSHAPE_LEN: usize = 25;

/// Number of orientation features
pub const ORIENTATION_LEN: usize = 10;

/// Number of location features
pub const LOCATION_LEN: usize = 19;

/// Bound for distances, positions and other magnitudes
pub const MAGNITUDE_LIMIT: f32 = 5.0;

/// Bound for flags, cosines and unit-vector components
pub const UNIT_LIMIT: f32 = 1.0;

/// Which vector of a packet (and which classifier) a value belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Handshape,
    Orientation,
    Location,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 3] = [
        FeatureKind::Handshape,
        FeatureKind::Orientation,
        FeatureKind::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Handshape => "handshape",
            FeatureKind::Orientation => "orientation",
            FeatureKind::Location => "location",
        }
    }

    /// Expected vector length for this kind
    pub fn vector_len(&self) -> usize {
        match self {
            FeatureKind::Handshape => HANDSHAPE_LEN,
            FeatureKind::Orientation => ORIENTATION_LEN,
            FeatureKind::Location => LOCATION_LEN,
        }
    }
}

/// Features derived from one hand observation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturePacket {
    pub handshape: Vec<f32>,
    pub orientation: Vec<f32>,
    pub location: Vec<f32>,
}

impl FeaturePacket {
    pub fn get(&self, kind: FeatureKind) -> &[f32] {
        match kind {
            FeatureKind::Handshape => &self.handshape,
            FeatureKind::Orientation => &self.orientation,
            FeatureKind::Location => &self.location,
        }
    }

    /// True when every value of every vector is finite
    pub fn is_finite(&self) -> bool {
        FeatureKind::ALL
            .iter()
            .all(|kind| self.get(*kind).iter().all(|v| v.is_finite()))
    }
}

/// Bound a feature value to ±limit. NaN becomes 0.
pub fn clamp_feature(value: f32, limit: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}
