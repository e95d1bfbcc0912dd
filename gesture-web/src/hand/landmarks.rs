//! Hand landmark model (MediaPipe Hands - 21 points per hand)

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Landmarks required for a complete hand
pub const LANDMARK_COUNT: usize = 21;

/// Finger chains as (MCP, PIP, DIP, TIP). For the thumb the chain is
/// (CMC, MCP, IP, TIP) so that the two bend angles sit at MCP and IP.
pub const FINGER_CHAINS: [[usize; 4]; 5] = [
    [THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP],
    [INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP],
    [MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
    [RING_MCP, RING_PIP, RING_DIP, RING_TIP],
    [PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP],
];

/// Fingertips, thumb first
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Points averaged into the palm centre
pub const PALM_POINTS: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A single 3D landmark point (normalized camera coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // 0-1 normalized
    pub y: f32, // 0-1 normalized, grows downward
    pub z: f32, // Relative depth
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Handedness label reported by the landmark detector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Bridge encoding: 1 = right, -1 = left, anything else unknown
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Handedness::Right,
            -1 => Handedness::Left,
            _ => Handedness::Unknown,
        }
    }

    /// Signed feature value (+1 right, -1 left, 0 unknown)
    pub fn sign(&self) -> f32 {
        match self {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
            Handedness::Unknown => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

/// One detected hand in one frame.
///
/// `index` is the hand's position in the detector output for this frame only;
/// it is not a stable identity across frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub landmarks: Vec<Landmark>,
    pub handedness: Handedness,
    pub index: usize,
}

impl HandObservation {
    pub fn new(landmarks: Vec<Landmark>, handedness: Handedness, index: usize) -> Self {
        Self {
            landmarks,
            handedness,
            index,
        }
    }

    /// Whether all 21 landmarks are present
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }

    /// Parse hands from the flat layout used by the bridge:
    /// `num_hands × 21 × (x, y, z)`, one handedness code per hand. Missing
    /// handedness codes read as unknown. A buffer too short for `num_hands`
    /// hands is rejected.
    pub fn from_flat(flat_data: &[f32], handedness: &[i32], num_hands: usize) -> Result<Vec<Self>> {
        let stride = LANDMARK_COUNT * 3;
        let needed = num_hands
            .checked_mul(stride)
            .ok_or_else(|| EngineError::InvalidInput(format!("num_hands {num_hands} is out of range")))?;
        if flat_data.len() < needed {
            return Err(EngineError::InvalidInput(format!(
                "{num_hands} hands need {needed} landmark values, got {}",
                flat_data.len()
            )));
        }

        Ok(flat_data[..needed]
            .chunks_exact(stride)
            .enumerate()
            .map(|(h, chunk)| {
                let landmarks = chunk
                    .chunks_exact(3)
                    .map(|p| Landmark::new(p[0], p[1], p[2]))
                    .collect();
                let code = handedness.get(h).copied().unwrap_or(0);
                Self::new(landmarks, Handedness::from_code(code), h)
            })
            .collect())
    }
}
