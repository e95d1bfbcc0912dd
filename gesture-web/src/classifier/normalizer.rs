//! Per-feature standardization learned from a training set

use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as zero and replaced by 1
const MIN_STD: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Normalizer {
    /// Mean and population std per column. Rows must share `dim`.
    pub fn fit(rows: &[&[f32]], dim: usize) -> Self {
        let n = rows.len().max(1) as f32;
        let mut mean = vec![0.0; dim];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut std = vec![0.0; dim];
        for row in rows {
            for ((s, v), m) in std.iter_mut().zip(row.iter()).zip(mean.iter()) {
                *s += (v - m) * (v - m);
            }
        }
        for s in std.iter_mut() {
            *s = (*s / n).sqrt();
            if !s.is_finite() || *s < MIN_STD {
                *s = 1.0;
            }
        }

        Self { mean, std }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Standardize one vector; `None` on a dimension mismatch
    pub fn apply(&self, values: &[f32]) -> Option<Vec<f32>> {
        if values.len() != self.dim() {
            return None;
        }
        Some(
            values
                .iter()
                .zip(self.mean.iter().zip(self.std.iter()))
                .map(|(v, (m, s))| (v - m) / s)
                .collect(),
        )
    }
}
