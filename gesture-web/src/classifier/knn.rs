//! k-nearest-neighbour location classifier
//!
//! Stores every normalized training vector and votes among the `k` closest
//! with inverse-distance weights.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::normalizer::Normalizer;
use super::TrainingSkip;
use crate::config::LocationParams;

/// Added to distances so an exact match does not divide by zero
const DISTANCE_BIAS: f32 = 1e-3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationModel {
    /// Label of each stored point, parallel to `points`
    pub labels: Vec<String>,
    pub points: Vec<Vec<f32>>,
    pub normalizer: Normalizer,
    pub k: usize,
}

impl LocationModel {
    pub fn train(samples: &[(&str, &[f32])], params: &LocationParams) -> Result<Self, TrainingSkip> {
        let dim = samples.first().map_or(0, |(_, v)| v.len());
        let usable: Vec<(&str, &[f32])> = samples
            .iter()
            .copied()
            .filter(|(_, v)| v.len() == dim && v.iter().all(|x| x.is_finite()))
            .collect();

        let needed = params.min_samples.max(1);
        if usable.len() < needed {
            return Err(TrainingSkip::TooFewSamples {
                needed,
                found: usable.len(),
            });
        }

        let distinct = usable.iter().map(|(label, _)| *label).collect::<BTreeSet<_>>().len();
        if distinct < 2 {
            return Err(TrainingSkip::TooFewLabels { found: distinct });
        }

        let rows: Vec<&[f32]> = usable.iter().map(|(_, v)| *v).collect();
        let normalizer = Normalizer::fit(&rows, dim);
        let points = rows.iter().filter_map(|row| normalizer.apply(row)).collect();
        let labels = usable.iter().map(|(label, _)| label.to_string()).collect();

        Ok(Self {
            labels,
            points,
            normalizer,
            k: params.k.clamp(1, usable.len()),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Winning label and its share of the neighbour vote
    pub fn predict(&self, features: &[f32]) -> Option<(String, f32)> {
        let query = self.normalizer.apply(features)?;

        let mut neighbours: Vec<(f32, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (euclidean(p, &query), i))
            .collect();
        // Stable on ties: earlier samples first
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut votes: BTreeMap<&str, f32> = BTreeMap::new();
        let mut total = 0.0;
        for &(d, i) in neighbours.iter().take(self.k) {
            let w = 1.0 / (d + DISTANCE_BIAS);
            *votes.entry(self.labels[i].as_str()).or_default() += w;
            total += w;
        }
        if total <= 0.0 {
            return None;
        }

        let (label, weight) = votes
            .into_iter()
            .fold(None, |acc: Option<(&str, f32)>, (label, w)| match acc {
                Some((_, best)) if best >= w => acc,
                _ => Some((label, w)),
            })?;
        Some((label.to_string(), weight / total))
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
