//! Read-only view of the frame handed to every detector

use crate::hand::{HandObservation, Landmark, PoseHistory};

/// What a detector may look at besides its own hand's landmarks
#[derive(Clone, Copy)]
pub struct DetectionContext<'a> {
    /// Every hand in the current frame, including the one being evaluated
    pub hands: &'a [HandObservation],
    /// Per-frame index of the hand being evaluated
    pub hand_index: usize,
    pub history: &'a PoseHistory,
}

impl<'a> DetectionContext<'a> {
    pub fn new(hands: &'a [HandObservation], hand_index: usize, history: &'a PoseHistory) -> Self {
        Self {
            hands,
            hand_index,
            history,
        }
    }

    /// First other complete hand in the frame
    pub fn partner(&self) -> Option<&'a HandObservation> {
        self.hands
            .iter()
            .find(|h| h.index != self.hand_index && h.is_complete())
    }

    /// This hand's recent frames, oldest first
    pub fn frames(&self) -> impl Iterator<Item = &'a [Landmark]> {
        self.history.frames(self.hand_index)
    }

    pub fn history_len(&self) -> usize {
        self.history.len(self.hand_index)
    }
}
