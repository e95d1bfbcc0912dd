//! Feature extraction
//!
//! Turns one hand observation (plus the other hands in the frame) into a
//! [`FeaturePacket`]. Pure function of its inputs.
//!
//! Handshape (25):
//! - 0..20: per finger (thumb first) extended flag, curl, tip→palm, base→palm
//! - 20: palm width, 21: palm length, 22: thumb-index tip gap,
//!   23: index-pinky tip spread
//! - 24: handedness sign
//!
//! Orientation (10):
//! - 0..3: palm normal, 3: yaw, 4: pitch, 5: roll
//! - 6..9: hand direction (wrist → middle MCP), 9: handedness sign
//!
//! Location (19):
//! - 0..3: palm centre, 3..5: wrist x/y
//! - 5..15: fingertip - wrist (dx, dy) per finger, scale-normalized
//! - 15: hand scale
//! - 16: partner present, 17..19: partner palm - own palm (dx, dy)

use std::f32::consts::{FRAC_PI_2, PI};

use super::packet::{
    clamp_feature, FeaturePacket, HANDSHAPE_LEN, LOCATION_LEN, MAGNITUDE_LIMIT, ORIENTATION_LEN,
    UNIT_LIMIT,
};
use crate::hand::finger::{finger_curl, is_finger_extended, Finger};
use crate::hand::geometry::{centroid, cross, distance, normalize, sub, Vec3};
use crate::hand::landmarks::{
    HandObservation, Handedness, Landmark, FINGERTIPS, INDEX_MCP, INDEX_TIP, LANDMARK_COUNT,
    MIDDLE_MCP, PALM_POINTS, PINKY_MCP, PINKY_TIP, THUMB_TIP, WRIST,
};

/// Floor for the hand scale so distance features never divide by zero
pub const MIN_HAND_SCALE: f32 = 1e-4;

/// Extract the three feature vectors for `observation`.
///
/// Returns `None` when fewer than 21 landmarks are present. `all_hands` is
/// the full frame; the first other complete hand is used as the partner.
pub fn extract_features(
    observation: &HandObservation,
    all_hands: &[HandObservation],
) -> Option<FeaturePacket> {
    if !observation.is_complete() {
        return None;
    }
    let lm = &observation.landmarks[..LANDMARK_COUNT];
    let handedness = observation.handedness;

    let scale = hand_scale(lm);
    let palm = palm_center(lm);

    let partner = all_hands
        .iter()
        .find(|h| h.index != observation.index && h.is_complete())
        .map(|h| palm_center(&h.landmarks));

    Some(FeaturePacket {
        handshape: handshape_features(lm, handedness, palm, scale),
        orientation: orientation_features(lm, handedness),
        location: location_features(lm, palm, scale, partner),
    })
}

/// Sum of wrist→middle-MCP and index-MCP→pinky-MCP, floored
pub fn hand_scale(lm: &[Landmark]) -> f32 {
    let scale = distance(lm[WRIST], lm[MIDDLE_MCP]) + distance(lm[INDEX_MCP], lm[PINKY_MCP]);
    if scale.is_finite() {
        scale.max(MIN_HAND_SCALE)
    } else {
        MIN_HAND_SCALE
    }
}

/// Mean of the wrist and the four knuckles
pub fn palm_center(lm: &[Landmark]) -> Landmark {
    let points: Vec<Landmark> = PALM_POINTS.iter().map(|i| lm[*i]).collect();
    centroid(&points)
}

/// Unit palm normal, or (0,0,0) when wrist and knuckles are colinear
pub fn palm_normal(lm: &[Landmark]) -> Vec3 {
    let across = sub(lm[INDEX_MCP], lm[WRIST]);
    let down = sub(lm[PINKY_MCP], lm[WRIST]);
    normalize(cross(across, down))
}

fn handshape_features(lm: &[Landmark], handedness: Handedness, palm: Landmark, scale: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(HANDSHAPE_LEN);

    for finger in Finger::ALL {
        let [base, _, _, tip] = finger.chain();
        out.push(flag(is_finger_extended(lm, finger, handedness)));
        out.push(unit(finger_curl(lm, finger)));
        out.push(magnitude(distance(lm[tip], palm) / scale));
        out.push(magnitude(distance(lm[base], palm) / scale));
    }

    out.push(magnitude(distance(lm[INDEX_MCP], lm[PINKY_MCP]) / scale));
    out.push(magnitude(distance(lm[WRIST], lm[MIDDLE_MCP]) / scale));
    out.push(magnitude(distance(lm[THUMB_TIP], lm[INDEX_TIP]) / scale));
    out.push(magnitude(distance(lm[INDEX_TIP], lm[PINKY_TIP]) / scale));
    out.push(unit(handedness.sign()));

    debug_assert_eq!(out.len(), HANDSHAPE_LEN);
    out
}

fn orientation_features(lm: &[Landmark], handedness: Handedness) -> Vec<f32> {
    let normal = palm_normal(lm);
    let direction = normalize(sub(lm[MIDDLE_MCP], lm[WRIST]));

    // Ordering-consistent projections, not calibrated angles
    let yaw = normal[0].atan2(normal[2]) / PI;
    let pitch = (-direction[1]).clamp(-1.0, 1.0).asin() / FRAC_PI_2;
    let roll = direction[0].atan2(-direction[1]) / PI;

    let mut out = Vec::with_capacity(ORIENTATION_LEN);
    out.extend(normal.iter().map(|v| unit(*v)));
    out.push(unit(yaw));
    out.push(unit(pitch));
    out.push(unit(roll));
    out.extend(direction.iter().map(|v| unit(*v)));
    out.push(unit(handedness.sign()));

    debug_assert_eq!(out.len(), ORIENTATION_LEN);
    out
}

fn location_features(lm: &[Landmark], palm: Landmark, scale: f32, partner: Option<Landmark>) -> Vec<f32> {
    let wrist = lm[WRIST];
    let mut out = Vec::with_capacity(LOCATION_LEN);

    out.push(magnitude(palm.x));
    out.push(magnitude(palm.y));
    out.push(magnitude(palm.z));
    out.push(magnitude(wrist.x));
    out.push(magnitude(wrist.y));

    for tip in FINGERTIPS {
        out.push(magnitude((lm[tip].x - wrist.x) / scale));
        out.push(magnitude((lm[tip].y - wrist.y) / scale));
    }

    out.push(magnitude(scale));

    match partner {
        Some(other) => {
            out.push(flag(true));
            out.push(magnitude(other.x - palm.x));
            out.push(magnitude(other.y - palm.y));
        }
        None => out.extend([0.0, 0.0, 0.0]),
    }

    debug_assert_eq!(out.len(), LOCATION_LEN);
    out
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn unit(value: f32) -> f32 {
    clamp_feature(value, UNIT_LIMIT)
}

fn magnitude(value: f32) -> f32 {
    clamp_feature(value, MAGNITUDE_LIMIT)
}
