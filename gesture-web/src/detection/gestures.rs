//! Heuristic gesture detectors
//!
//! Closed-form geometric rules, one per gesture. Every rule is a pure
//! function of the landmarks, handedness and frame context, returning a
//! confidence in [0, 1]. A score only counts when it reaches the gesture's
//! own threshold.

use serde::{Deserialize, Serialize};

use super::context::DetectionContext;
use crate::features::hand_scale;
use crate::hand::finger::FingerStates;
use crate::hand::geometry::{centroid, distance_2d};
use crate::hand::landmarks::{
    Handedness, Landmark, INDEX_TIP, LANDMARK_COUNT, MIDDLE_TIP, PINKY_TIP, RING_TIP, THUMB_MCP,
    THUMB_TIP, WRIST,
};

// ============================================================================
// TUNING
// ============================================================================

/// Vertical tip-to-MCP offset that also counts as an extended thumb
const THUMB_VERTICAL_MARGIN: f32 = 0.06;

/// Thumb tip must clear the mean fingertip height by this much
const THUMB_HEIGHT_MARGIN: f32 = 0.05;

/// Adjacent fingertip gap, as a fraction of hand scale, for a spread hand
const SPREAD_RATIO: f32 = 0.1;

/// Frames of history a wave needs
const WAVE_MIN_FRAMES: usize = 6;

/// Lateral index-tip travel across the history for a wave
const WAVE_MIN_RANGE_X: f32 = 0.08;

/// Palms closer than this (normalized image units) for thank-you
const THANK_YOU_MAX_PALM_DISTANCE: f32 = 0.25;

/// Horizontal wrist offset for a stacked two-hand pose
const HELP_MAX_OFFSET_X: f32 = 0.15;

/// Vertical wrist gap range for a stacked two-hand pose
const HELP_GAP_Y: (f32, f32) = (0.03, 0.25);

// ============================================================================
// GESTURES
// ============================================================================

/// Gestures with a hand-written detector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicGesture {
    ThumbsUp,
    ThumbsDown,
    OpenPalm,
    Fist,
    Point,
    Peace,
    Wave,
    ThankYou,
    Help,
}

/// Detector table, in evaluation order. Earlier entries win exact ties.
pub const DETECTORS: [HeuristicGesture; 9] = [
    HeuristicGesture::ThumbsUp,
    HeuristicGesture::ThumbsDown,
    HeuristicGesture::OpenPalm,
    HeuristicGesture::Fist,
    HeuristicGesture::Point,
    HeuristicGesture::Peace,
    HeuristicGesture::Wave,
    HeuristicGesture::ThankYou,
    HeuristicGesture::Help,
];

impl HeuristicGesture {
    /// Event name, also the label a calibrated model must use to blend
    pub fn name(&self) -> &'static str {
        match self {
            HeuristicGesture::ThumbsUp => "thumbs_up",
            HeuristicGesture::ThumbsDown => "thumbs_down",
            HeuristicGesture::OpenPalm => "open_palm",
            HeuristicGesture::Fist => "fist",
            HeuristicGesture::Point => "point",
            HeuristicGesture::Peace => "peace",
            HeuristicGesture::Wave => "wave",
            HeuristicGesture::ThankYou => "thank_you",
            HeuristicGesture::Help => "help",
        }
    }

    /// Detector whose `name` is `name`, if any. Learned labels are matched
    /// against heuristics through this.
    pub fn from_name(name: &str) -> Option<Self> {
        DETECTORS.iter().copied().find(|g| g.name() == name)
    }

    /// Minimum score for this detector to propose a gesture
    pub fn threshold(&self) -> f32 {
        match self {
            HeuristicGesture::ThumbsUp | HeuristicGesture::ThumbsDown => 0.9,
            HeuristicGesture::OpenPalm => 0.85,
            HeuristicGesture::Fist
            | HeuristicGesture::Point
            | HeuristicGesture::Peace
            | HeuristicGesture::Wave => 0.8,
            HeuristicGesture::ThankYou | HeuristicGesture::Help => 0.75,
        }
    }

    /// Score this gesture for one hand. Incomplete hands score 0.
    pub fn evaluate(&self, landmarks: &[Landmark], handedness: Handedness, ctx: &DetectionContext) -> f32 {
        if landmarks.len() < LANDMARK_COUNT {
            return 0.0;
        }
        match self {
            HeuristicGesture::ThumbsUp => detect_thumb_vertical(landmarks, handedness, true),
            HeuristicGesture::ThumbsDown => detect_thumb_vertical(landmarks, handedness, false),
            HeuristicGesture::OpenPalm => detect_open_palm(landmarks, handedness),
            HeuristicGesture::Fist => detect_fist(landmarks, handedness),
            HeuristicGesture::Point => detect_point(landmarks, handedness),
            HeuristicGesture::Peace => detect_peace(landmarks, handedness),
            HeuristicGesture::Wave => detect_wave(ctx),
            HeuristicGesture::ThankYou => detect_thank_you(landmarks, handedness, ctx),
            HeuristicGesture::Help => detect_help(landmarks, handedness, ctx),
        }
    }
}

/// One detector's score for one hand
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicScore {
    pub gesture: HeuristicGesture,
    pub confidence: f32,
}

impl HeuristicScore {
    pub fn passes(&self) -> bool {
        self.confidence >= self.gesture.threshold()
    }
}

/// Run every detector in table order
pub fn evaluate_all(landmarks: &[Landmark], handedness: Handedness, ctx: &DetectionContext) -> Vec<HeuristicScore> {
    DETECTORS
        .iter()
        .map(|gesture| HeuristicScore {
            gesture: *gesture,
            confidence: gesture.evaluate(landmarks, handedness, ctx),
        })
        .collect()
}

/// Highest-scoring detector that meets its own threshold
pub fn best_match(scores: &[HeuristicScore]) -> Option<HeuristicScore> {
    scores
        .iter()
        .filter(|s| s.passes())
        .fold(None, |best: Option<HeuristicScore>, s| match best {
            Some(b) if b.confidence >= s.confidence => Some(b),
            _ => Some(*s),
        })
}

// ============================================================================
// DETECTORS
// ============================================================================

/// Thumb counts as out when extended sideways or clearly vertical
fn thumb_out(landmarks: &[Landmark], states: &FingerStates) -> bool {
    states.thumb || (landmarks[THUMB_TIP].y - landmarks[THUMB_MCP].y).abs() > THUMB_VERTICAL_MARGIN
}

fn long_tip_mean_y(landmarks: &[Landmark]) -> f32 {
    [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP]
        .iter()
        .map(|i| landmarks[*i].y)
        .sum::<f32>()
        / 4.0
}

/// Thumbs up (`up = true`) or down: thumb out, other four closed, thumb tip
/// above/below the mean fingertip height
fn detect_thumb_vertical(landmarks: &[Landmark], handedness: Handedness, up: bool) -> f32 {
    let states = FingerStates::from_landmarks(landmarks, handedness);
    if !thumb_out(landmarks, &states) || !states.all_long_closed() {
        return 0.0;
    }
    let mean_y = long_tip_mean_y(landmarks);
    let thumb_y = landmarks[THUMB_TIP].y;
    let clears = if up {
        thumb_y < mean_y - THUMB_HEIGHT_MARGIN
    } else {
        thumb_y > mean_y + THUMB_HEIGHT_MARGIN
    };
    if clears {
        0.95
    } else {
        0.0
    }
}

fn tips_spread(landmarks: &[Landmark], pairs: &[(usize, usize)]) -> bool {
    let min_gap = hand_scale(landmarks) * SPREAD_RATIO;
    pairs
        .iter()
        .all(|(a, b)| distance_2d(landmarks[*a], landmarks[*b]) > min_gap)
}

/// Open palm / stop: three or more long fingers up, thumb tucked, fingers spread
fn detect_open_palm(landmarks: &[Landmark], handedness: Handedness) -> f32 {
    let states = FingerStates::from_landmarks(landmarks, handedness);
    if states.long_extended() < 3 || states.thumb {
        return 0.0;
    }
    let spread = tips_spread(
        landmarks,
        &[(INDEX_TIP, MIDDLE_TIP), (MIDDLE_TIP, RING_TIP), (RING_TIP, PINKY_TIP)],
    );
    if spread {
        0.9
    } else {
        0.0
    }
}

fn detect_fist(landmarks: &[Landmark], handedness: Handedness) -> f32 {
    let states = FingerStates::from_landmarks(landmarks, handedness);
    if states.all_long_closed() && !thumb_out(landmarks, &states) {
        0.85
    } else {
        0.0
    }
}

fn detect_point(landmarks: &[Landmark], handedness: Handedness) -> f32 {
    let states = FingerStates::from_landmarks(landmarks, handedness);
    if states.index() && !states.middle() && !states.ring() && !states.pinky() {
        0.85
    } else {
        0.0
    }
}

fn detect_peace(landmarks: &[Landmark], handedness: Handedness) -> f32 {
    let states = FingerStates::from_landmarks(landmarks, handedness);
    if !(states.index() && states.middle()) || states.ring() || states.pinky() {
        return 0.0;
    }
    if tips_spread(landmarks, &[(INDEX_TIP, MIDDLE_TIP)]) {
        0.85
    } else {
        0.0
    }
}

/// Wave: enough history and the index tip swept sideways. Binary, not
/// graded by amplitude.
fn detect_wave(ctx: &DetectionContext) -> f32 {
    if ctx.history_len() < WAVE_MIN_FRAMES {
        return 0.0;
    }
    let (min_x, max_x) = ctx
        .frames()
        .filter(|f| f.len() > INDEX_TIP)
        .map(|f| f[INDEX_TIP].x)
        .fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if max_x - min_x > WAVE_MIN_RANGE_X {
        0.85
    } else {
        0.0
    }
}

fn palm_of(landmarks: &[Landmark]) -> Landmark {
    centroid(&landmarks[..LANDMARK_COUNT])
}

/// Thank-you: flat hand held close to the other hand
fn detect_thank_you(landmarks: &[Landmark], handedness: Handedness, ctx: &DetectionContext) -> f32 {
    let Some(partner) = ctx.partner() else {
        return 0.0;
    };
    let states = FingerStates::from_landmarks(landmarks, handedness);
    if states.long_extended() < 3 {
        return 0.0;
    }
    let gap = distance_2d(palm_of(landmarks), palm_of(&partner.landmarks));
    if gap < THANK_YOU_MAX_PALM_DISTANCE {
        0.8
    } else {
        0.0
    }
}

/// Help: closed hand stacked above the other hand's wrist
fn detect_help(landmarks: &[Landmark], handedness: Handedness, ctx: &DetectionContext) -> f32 {
    let Some(partner) = ctx.partner() else {
        return 0.0;
    };
    let states = FingerStates::from_landmarks(landmarks, handedness);
    if !states.all_long_closed() {
        return 0.0;
    }
    let own = landmarks[WRIST];
    let other = partner.landmarks[WRIST];
    let dx = (other.x - own.x).abs();
    let dy = other.y - own.y;
    if dx < HELP_MAX_OFFSET_X && dy > HELP_GAP_Y.0 && dy < HELP_GAP_Y.1 {
        0.8
    } else {
        0.0
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::hand::{HandObservation, PoseHistory};

    fn single(lm: &[Landmark]) -> (Vec<HandObservation>, PoseHistory) {
        (
            vec![HandObservation::new(lm.to_vec(), Handedness::Unknown, 0)],
            PoseHistory::default(),
        )
    }

    #[test]
    fn test_thumbs_up_scenario() {
        let lm = thumbs_up();
        let (hands, history) = single(&lm);
        let ctx = DetectionContext::new(&hands, 0, &history);

        let up = HeuristicGesture::ThumbsUp.evaluate(&lm, Handedness::Unknown, &ctx);
        assert!(up >= 0.9, "thumbs up = {up}");

        // Two-handed detectors have no partner here and score 0 as well
        for gesture in DETECTORS.iter().filter(|g| **g != HeuristicGesture::ThumbsUp) {
            let score = gesture.evaluate(&lm, Handedness::Unknown, &ctx);
            assert_eq!(score, 0.0, "{} scored {}", gesture.name(), score);
        }
    }

    #[test]
    fn test_flipped_hand_is_not_thumbs_up() {
        let lm: Vec<Landmark> = thumbs_up()
            .iter()
            .map(|p| Landmark::new(p.x, 1.0 - p.y, p.z))
            .collect();
        let (hands, history) = single(&lm);
        let ctx = DetectionContext::new(&hands, 0, &history);
        // Flipped vertically: tips are now above PIPs, so the fingers read as
        // extended and neither thumb detector fires
        assert_eq!(HeuristicGesture::ThumbsUp.evaluate(&lm, Handedness::Unknown, &ctx), 0.0);
    }

    #[test]
    fn test_fist() {
        let lm = fist();
        let (hands, history) = single(&lm);
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert_eq!(HeuristicGesture::Fist.evaluate(&lm, Handedness::Unknown, &ctx), 0.85);
        assert_eq!(HeuristicGesture::ThumbsUp.evaluate(&lm, Handedness::Unknown, &ctx), 0.0);
    }

    #[test]
    fn test_open_palm() {
        let lm = open_palm(0.0);
        let (hands, history) = single(&lm);
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert_eq!(HeuristicGesture::OpenPalm.evaluate(&lm, Handedness::Unknown, &ctx), 0.9);
        assert_eq!(HeuristicGesture::Point.evaluate(&lm, Handedness::Unknown, &ctx), 0.0);
    }

    #[test]
    fn test_wave_needs_history_and_sweep() {
        let base = open_palm(0.0);
        let hands = vec![HandObservation::new(base.clone(), Handedness::Unknown, 0)];
        let mut history = PoseHistory::default();

        for i in 0..5 {
            history.record(0, &shifted(&base, if i % 2 == 0 { -0.06 } else { 0.06 }));
        }
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert_eq!(HeuristicGesture::Wave.evaluate(&base, Handedness::Unknown, &ctx), 0.0);

        history.record(0, &shifted(&base, 0.06));
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert_eq!(HeuristicGesture::Wave.evaluate(&base, Handedness::Unknown, &ctx), 0.85);

        // Six frames of a still hand is not a wave
        let mut still = PoseHistory::default();
        for _ in 0..6 {
            still.record(0, &base);
        }
        let ctx = DetectionContext::new(&hands, 0, &still);
        assert_eq!(HeuristicGesture::Wave.evaluate(&base, Handedness::Unknown, &ctx), 0.0);
    }

    #[test]
    fn test_two_hand_gestures_need_partner() {
        let lm = open_palm(0.0);
        let (hands, history) = single(&lm);
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert_eq!(HeuristicGesture::ThankYou.evaluate(&lm, Handedness::Unknown, &ctx), 0.0);
        assert_eq!(HeuristicGesture::Help.evaluate(&lm, Handedness::Unknown, &ctx), 0.0);

        let hands = vec![
            HandObservation::new(open_palm(-0.08), Handedness::Left, 0),
            HandObservation::new(open_palm(0.08), Handedness::Right, 1),
        ];
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert_eq!(
            HeuristicGesture::ThankYou.evaluate(&hands[0].landmarks, Handedness::Left, &ctx),
            0.8
        );
    }

    #[test]
    fn test_help_stacks_fist_over_other_hand() {
        let top = fist();
        let bottom: Vec<Landmark> = open_palm(0.0)
            .iter()
            .map(|p| Landmark::new(p.x, p.y + 0.1, p.z))
            .collect();
        let hands = vec![
            HandObservation::new(top.clone(), Handedness::Right, 0),
            HandObservation::new(bottom, Handedness::Left, 1),
        ];
        let history = PoseHistory::default();
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert_eq!(HeuristicGesture::Help.evaluate(&top, Handedness::Right, &ctx), 0.8);
    }

    #[test]
    fn test_detectors_are_deterministic() {
        let lm = thumbs_up();
        let (hands, history) = single(&lm);
        let ctx = DetectionContext::new(&hands, 0, &history);
        let first = evaluate_all(&lm, Handedness::Unknown, &ctx);
        let second = evaluate_all(&lm, Handedness::Unknown, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_best_match_respects_thresholds() {
        let scores = vec![
            HeuristicScore { gesture: HeuristicGesture::OpenPalm, confidence: 0.8 },
            HeuristicScore { gesture: HeuristicGesture::Fist, confidence: 0.82 },
            HeuristicScore { gesture: HeuristicGesture::Point, confidence: 0.81 },
        ];
        // open palm misses its 0.85 threshold
        let best = best_match(&scores).unwrap();
        assert_eq!(best.gesture, HeuristicGesture::Fist);
        assert!(best_match(&scores[..1]).is_none());
    }

    #[test]
    fn test_incomplete_hand_scores_zero() {
        let lm = vec![Landmark::default(); 10];
        let (hands, history) = single(&lm);
        let ctx = DetectionContext::new(&hands, 0, &history);
        assert!(evaluate_all(&lm, Handedness::Unknown, &ctx).iter().all(|s| s.confidence == 0.0));
    }

    #[test]
    fn test_name_round_trip() {
        for gesture in DETECTORS {
            assert_eq!(HeuristicGesture::from_name(gesture.name()), Some(gesture));
        }
        assert_eq!(HeuristicGesture::from_name("yes"), None);
    }
}
