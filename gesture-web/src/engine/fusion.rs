//! Combining heuristic scores with the learned prediction for one hand

use crate::classifier::Prediction;
use crate::detection::{best_match, HeuristicGesture, HeuristicScore};

use super::events::GestureSource;

/// Fusion result for one hand
#[derive(Clone, Debug, PartialEq)]
pub struct FusedGesture {
    pub gesture: String,
    pub confidence: f32,
    pub source: GestureSource,
}

/// Pick one gesture for a hand.
///
/// A learned prediction counts only at or above `learned_floor`. When its
/// label names a heuristic that passed its own threshold the two are averaged
/// into a blended candidate. That blend always stands when the agreeing
/// heuristic is also the best one, and otherwise must at least match the best
/// heuristic. Without agreement the more confident side wins and the
/// heuristic keeps ties.
pub fn fuse(scores: &[HeuristicScore], learned: Option<&Prediction>, learned_floor: f32) -> Option<FusedGesture> {
    let winner = best_match(scores);
    let heuristic = winner.map(|s| FusedGesture {
        gesture: s.gesture.name().to_string(),
        confidence: s.confidence,
        source: GestureSource::Heuristic,
    });

    let Some(p) = learned.filter(|p| p.confidence >= learned_floor) else {
        return heuristic;
    };

    let agreeing = HeuristicGesture::from_name(&p.label)
        .and_then(|gesture| scores.iter().find(|s| s.gesture == gesture && s.passes()));

    match agreeing {
        Some(agreeing) => {
            let blended = FusedGesture {
                gesture: p.label.clone(),
                confidence: (agreeing.confidence + p.confidence) / 2.0,
                source: GestureSource::Blended,
            };
            match (winner, heuristic) {
                (Some(w), Some(h)) if w.gesture != agreeing.gesture && h.confidence > blended.confidence => Some(h),
                _ => Some(blended),
            }
        }
        None => {
            let learned = FusedGesture {
                gesture: p.label.clone(),
                confidence: p.confidence,
                source: GestureSource::Learned,
            };
            match heuristic {
                Some(h) if h.confidence >= learned.confidence => Some(h),
                _ => Some(learned),
            }
        }
    }
}
