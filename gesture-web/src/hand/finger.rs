//! Per-finger state: curl and extended flags
//!
//! Shared by the feature extractor and the heuristic detectors so both agree
//! on what "extended" means.

use std::f32::consts::PI;

use super::geometry::{bend_angle, distance_2d};
use super::landmarks::{Handedness, Landmark, FINGER_CHAINS, THUMB_MCP, THUMB_TIP};

/// Tip must be this far above the PIP joint for a finger to count as extended
pub const EXTENSION_MARGIN: f32 = 0.02;

/// Lateral tip-to-MCP offset for a thumb with known handedness
pub const THUMB_LATERAL_MARGIN: f32 = 0.03;

/// Tip-to-MCP displacement for a thumb with unknown handedness
pub const THUMB_DISPLACEMENT_MARGIN: f32 = 0.06;

/// Finger index into [`FINGER_CHAINS`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Non-thumb fingers
    pub const LONG: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn chain(&self) -> [usize; 4] {
        FINGER_CHAINS[*self as usize]
    }
}

/// Curl of one finger in [0, 1]: the two inter-segment bends summed and
/// divided by π. 0 = straight.
pub fn finger_curl(landmarks: &[Landmark], finger: Finger) -> f32 {
    let [base, mid, distal, tip] = finger.chain();
    let first = bend_angle(landmarks[base], landmarks[mid], landmarks[distal]);
    let second = bend_angle(landmarks[mid], landmarks[distal], landmarks[tip]);
    ((first + second) / PI).clamp(0.0, 1.0)
}

/// Whether a finger is extended. Long fingers need the tip above the PIP in
/// image space; the thumb goes through [`is_thumb_extended`].
pub fn is_finger_extended(landmarks: &[Landmark], finger: Finger, handedness: Handedness) -> bool {
    if finger == Finger::Thumb {
        return is_thumb_extended(landmarks, handedness);
    }
    let [_, pip, _, tip] = finger.chain();
    landmarks[tip].y < landmarks[pip].y - EXTENSION_MARGIN
}

/// Whether the thumb is extended.
///
/// With known handedness the tip must sit outside the MCP along x (right
/// hand: smaller x, left hand: larger x). Unknown handedness falls back to
/// the raw tip-to-MCP displacement.
pub fn is_thumb_extended(landmarks: &[Landmark], handedness: Handedness) -> bool {
    let tip = landmarks[THUMB_TIP];
    let mcp = landmarks[THUMB_MCP];
    let dx = tip.x - mcp.x;
    match handedness {
        Handedness::Right => dx < -THUMB_LATERAL_MARGIN,
        Handedness::Left => dx > THUMB_LATERAL_MARGIN,
        Handedness::Unknown => distance_2d(tip, mcp) > THUMB_DISPLACEMENT_MARGIN,
    }
}

/// Snapshot of which fingers are extended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    /// index, middle, ring, pinky
    pub long: [bool; 4],
}

impl FingerStates {
    pub fn from_landmarks(landmarks: &[Landmark], handedness: Handedness) -> Self {
        let mut long = [false; 4];
        for (slot, finger) in long.iter_mut().zip(Finger::LONG) {
            *slot = is_finger_extended(landmarks, finger, handedness);
        }
        Self {
            thumb: is_thumb_extended(landmarks, handedness),
            long,
        }
    }

    pub fn index(&self) -> bool {
        self.long[0]
    }

    pub fn middle(&self) -> bool {
        self.long[1]
    }

    pub fn ring(&self) -> bool {
        self.long[2]
    }

    pub fn pinky(&self) -> bool {
        self.long[3]
    }

    /// Number of extended long fingers
    pub fn long_extended(&self) -> usize {
        self.long.iter().filter(|e| **e).count()
    }

    pub fn all_long_closed(&self) -> bool {
        self.long_extended() == 0
    }
}
