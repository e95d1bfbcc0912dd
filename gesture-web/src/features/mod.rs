//! Features module - landmark frame → typed feature vectors
//!
//! Re-exports only. All logic in submodules.

mod extract;
mod packet;

pub use extract::{extract_features, hand_scale, palm_center, palm_normal, MIN_HAND_SCALE};
pub use packet::{
    clamp_feature, FeatureKind, FeaturePacket, HANDSHAPE_LEN, LOCATION_LEN, MAGNITUDE_LIMIT,
    ORIENTATION_LEN, UNIT_LIMIT,
};
