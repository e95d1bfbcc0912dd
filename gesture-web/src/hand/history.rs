//! Rolling pose history per hand index
//!
//! Keeps the last N landmark frames for each hand slot, oldest first.
//! Motion detectors (wave) read it; nothing else writes to it.

use std::collections::{BTreeMap, VecDeque};

use super::landmarks::Landmark;

/// Default number of frames kept per hand
pub const HISTORY_CAPACITY: usize = 12;

/// Ring buffer of recent landmark frames, keyed by per-frame hand index
#[derive(Debug, Clone)]
pub struct PoseHistory {
    capacity: usize,
    hands: BTreeMap<usize, VecDeque<Vec<Landmark>>>,
}

impl PoseHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            hands: BTreeMap::new(),
        }
    }

    /// Append a copy of this frame's landmarks, evicting the oldest frame
    /// once the hand's buffer is full
    pub fn record(&mut self, hand_index: usize, landmarks: &[Landmark]) {
        let capacity = self.capacity;
        let frames = self
            .hands
            .entry(hand_index)
            .or_insert_with(|| VecDeque::with_capacity(capacity + 1));
        frames.push_back(landmarks.to_vec());

        while frames.len() > capacity {
            frames.pop_front();
        }
    }

    /// Drop every buffer (called when a frame contains no hands)
    pub fn clear(&mut self) {
        self.hands.clear();
    }

    /// Frames for one hand, oldest to newest
    pub fn frames(&self, hand_index: usize) -> impl Iterator<Item = &[Landmark]> {
        self.hands
            .get(&hand_index)
            .into_iter()
            .flat_map(|frames| frames.iter().map(Vec::as_slice))
    }

    /// Number of frames held for one hand
    pub fn len(&self, hand_index: usize) -> usize {
        self.hands.get(&hand_index).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hands.values().all(VecDeque::is_empty)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PoseHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: f32) -> Vec<Landmark> {
        vec![Landmark::new(x, 0.5, 0.0); 21]
    }

    #[test]
    fn test_history_never_exceeds_capacity() {
        let mut history = PoseHistory::new(12);
        for i in 0..40 {
            history.record(0, &frame(i as f32 / 40.0));
            assert!(history.len(0) <= 12);
        }
        assert_eq!(history.len(0), 12);

        // Oldest frames were evicted first
        let first = history.frames(0).next().unwrap();
        assert_eq!(first[0].x, 28.0 / 40.0);
    }

    #[test]
    fn test_hands_are_independent() {
        let mut history = PoseHistory::default();
        history.record(0, &frame(0.1));
        history.record(1, &frame(0.9));
        history.record(1, &frame(0.8));
        assert_eq!(history.len(0), 1);
        assert_eq!(history.len(1), 2);
        assert_eq!(history.len(2), 0);
        assert_eq!(history.frames(2).count(), 0);
    }

    #[test]
    fn test_clear_empties_all_hands() {
        let mut history = PoseHistory::default();
        history.record(0, &frame(0.1));
        history.record(1, &frame(0.2));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.len(0), 0);
    }
}
