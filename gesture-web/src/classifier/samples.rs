//! Labeled calibration samples, one table per feature kind
//!
//! Each table maps label → FIFO of feature vectors, capped per label.
//! `BTreeMap` keeps label order (and therefore serialized output) stable.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::features::{FeatureKind, FeaturePacket};

/// Samples for one feature kind
pub type SampleTable = BTreeMap<String, VecDeque<Vec<f32>>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStore {
    #[serde(default)]
    pub handshape: SampleTable,
    #[serde(default)]
    pub orientation: SampleTable,
    #[serde(default)]
    pub location: SampleTable,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, kind: FeatureKind) -> &SampleTable {
        match kind {
            FeatureKind::Handshape => &self.handshape,
            FeatureKind::Orientation => &self.orientation,
            FeatureKind::Location => &self.location,
        }
    }

    fn table_mut(&mut self, kind: FeatureKind) -> &mut SampleTable {
        match kind {
            FeatureKind::Handshape => &mut self.handshape,
            FeatureKind::Orientation => &mut self.orientation,
            FeatureKind::Location => &mut self.location,
        }
    }

    /// Append one vector under `label`, evicting that label's oldest
    /// samples beyond `cap`
    pub fn push(&mut self, kind: FeatureKind, label: &str, vector: Vec<f32>, cap: usize) {
        let samples = self.table_mut(kind).entry(label.to_string()).or_default();
        samples.push_back(vector);
        while samples.len() > cap.max(1) {
            samples.pop_front();
        }
    }

    /// Append one sample per feature kind
    pub fn add_packet(&mut self, label: &str, packet: &FeaturePacket, cap: usize) {
        for kind in FeatureKind::ALL {
            self.push(kind, label, packet.get(kind).to_vec(), cap);
        }
    }

    /// All (label, vector) pairs of one kind, label-ordered then oldest first
    pub fn samples(&self, kind: FeatureKind) -> Vec<(&str, &[f32])> {
        self.table(kind)
            .iter()
            .flat_map(|(label, vectors)| vectors.iter().map(move |v| (label.as_str(), v.as_slice())))
            .collect()
    }

    /// Sample count for one label and kind
    pub fn count_for(&self, kind: FeatureKind, label: &str) -> usize {
        self.table(kind).get(label).map_or(0, VecDeque::len)
    }

    /// Total samples of one kind
    pub fn count(&self, kind: FeatureKind) -> usize {
        self.table(kind).values().map(VecDeque::len).sum()
    }

    /// Per-label counts of one kind
    pub fn label_counts(&self, kind: FeatureKind) -> BTreeMap<String, usize> {
        self.table(kind)
            .iter()
            .map(|(label, vectors)| (label.clone(), vectors.len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        FeatureKind::ALL.iter().all(|kind| self.count(*kind) == 0)
    }

    pub fn clear(&mut self) {
        self.handshape.clear();
        self.orientation.clear();
        self.location.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(v: f32) -> FeaturePacket {
        FeaturePacket {
            handshape: vec![v; 3],
            orientation: vec![v; 2],
            location: vec![v; 4],
        }
    }

    #[test]
    fn test_add_packet_fills_every_kind() {
        let mut store = SampleStore::new();
        store.add_packet("yes", &packet(0.5), 180);
        for kind in FeatureKind::ALL {
            assert_eq!(store.count_for(kind, "yes"), 1);
        }
        assert_eq!(store.samples(FeatureKind::Location)[0].1, &[0.5; 4]);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut store = SampleStore::new();
        for i in 0..5 {
            store.push(FeatureKind::Handshape, "a", vec![i as f32], 3);
        }
        let values: Vec<f32> = store
            .samples(FeatureKind::Handshape)
            .iter()
            .map(|(_, v)| v[0])
            .collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_counts_and_clear() {
        let mut store = SampleStore::new();
        store.add_packet("a", &packet(0.1), 10);
        store.add_packet("b", &packet(0.2), 10);
        store.add_packet("b", &packet(0.3), 10);
        assert_eq!(store.count(FeatureKind::Orientation), 3);
        assert_eq!(store.label_counts(FeatureKind::Handshape).get("b"), Some(&2));
        store.clear();
        assert!(store.is_empty());
    }
}
