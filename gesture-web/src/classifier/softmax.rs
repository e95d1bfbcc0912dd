//! Multinomial logistic regression (softmax) trained by batch gradient descent
//!
//! Deterministic for a fixed sample set and parameters: weights start at
//! zero, samples are visited in store order, and there is no shuffling,
//! mini-batching or momentum.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::normalizer::Normalizer;
use super::TrainingSkip;
use crate::config::SoftmaxParams;

/// Probabilities are floored here before taking the log
const MIN_PROB: f32 = 1e-12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxModel {
    /// Class labels, sorted
    pub labels: Vec<String>,
    /// One weight row per label
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub normalizer: Normalizer,
    /// Mean cross-entropy after the last epoch run
    pub final_loss: f32,
    pub epochs_run: usize,
}

impl SoftmaxModel {
    /// Train on (label, features) pairs.
    ///
    /// Needs at least `params.min_samples` samples and two distinct labels.
    /// Samples whose length differs from the first sample are ignored.
    pub fn train(samples: &[(&str, &[f32])], params: &SoftmaxParams) -> Result<Self, TrainingSkip> {
        let dim = match samples.first() {
            Some((_, v)) => v.len(),
            None => {
                return Err(TrainingSkip::TooFewSamples {
                    needed: params.min_samples,
                    found: 0,
                })
            }
        };
        let usable: Vec<(&str, &[f32])> = samples
            .iter()
            .copied()
            .filter(|(_, v)| v.len() == dim && v.iter().all(|x| x.is_finite()))
            .collect();

        if usable.len() < params.min_samples.max(1) {
            return Err(TrainingSkip::TooFewSamples {
                needed: params.min_samples,
                found: usable.len(),
            });
        }

        let labels: Vec<String> = usable
            .iter()
            .map(|(label, _)| label.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if labels.len() < 2 {
            return Err(TrainingSkip::TooFewLabels { found: labels.len() });
        }

        let rows: Vec<&[f32]> = usable.iter().map(|(_, v)| *v).collect();
        let normalizer = Normalizer::fit(&rows, dim);
        let inputs: Vec<Vec<f32>> = rows
            .iter()
            .filter_map(|row| normalizer.apply(row))
            .collect();
        let targets: Vec<usize> = usable
            .iter()
            .filter_map(|(label, _)| labels.iter().position(|l| l == label))
            .collect();

        let classes = labels.len();
        let n = inputs.len() as f32;
        let mut weights = vec![vec![0.0f32; dim]; classes];
        let mut bias = vec![0.0f32; classes];
        let mut final_loss = f32::INFINITY;
        let mut epochs_run = 0;

        for _ in 0..params.epochs.max(1) {
            let mut grad_w = vec![vec![0.0f32; dim]; classes];
            let mut grad_b = vec![0.0f32; classes];
            let mut loss = 0.0f32;

            for (x, &target) in inputs.iter().zip(targets.iter()) {
                let probs = softmax(&logits(&weights, &bias, x));
                loss -= probs[target].max(MIN_PROB).ln();

                for (c, p) in probs.iter().enumerate() {
                    let g = p - if c == target { 1.0 } else { 0.0 };
                    grad_b[c] += g;
                    for (gw, xi) in grad_w[c].iter_mut().zip(x.iter()) {
                        *gw += g * xi;
                    }
                }
            }

            final_loss = loss / n;
            if final_loss < params.loss_threshold {
                break;
            }
            epochs_run += 1;

            for c in 0..classes {
                for (w, gw) in weights[c].iter_mut().zip(grad_w[c].iter()) {
                    *w -= params.learning_rate * (gw / n + params.l2 * *w);
                }
                bias[c] -= params.learning_rate * grad_b[c] / n;
            }
        }

        Ok(Self {
            labels,
            weights,
            bias,
            normalizer,
            final_loss,
            epochs_run,
        })
    }

    /// Class probabilities in `labels` order; `None` on a dimension mismatch
    pub fn probabilities(&self, features: &[f32]) -> Option<Vec<f32>> {
        let x = self.normalizer.apply(features)?;
        Some(softmax(&logits(&self.weights, &self.bias, &x)))
    }

    /// Most probable label and its probability
    pub fn predict(&self, features: &[f32]) -> Option<(String, f32)> {
        let probs = self.probabilities(features)?;
        let (best, p) = probs
            .iter()
            .enumerate()
            .fold(None, |acc: Option<(usize, f32)>, (i, p)| match acc {
                Some((_, bp)) if bp >= *p => acc,
                _ => Some((i, *p)),
            })?;
        Some((self.labels[best].clone(), p))
    }
}

fn logits(weights: &[Vec<f32>], bias: &[f32], x: &[f32]) -> Vec<f32> {
    weights
        .iter()
        .zip(bias.iter())
        .map(|(row, b)| row.iter().zip(x.iter()).map(|(w, xi)| w * xi).sum::<f32>() + b)
        .collect()
}

/// Numerically stable softmax
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        let uniform = 1.0 / logits.len().max(1) as f32;
        return vec![uniform; logits.len()];
    }
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SoftmaxParams {
        SoftmaxParams {
            epochs: 180,
            min_samples: 8,
            ..SoftmaxParams::default()
        }
    }

    /// Two clusters separated along the first two features
    fn clusters() -> Vec<(String, Vec<f32>)> {
        let mut out = Vec::new();
        for i in 0..6 {
            let jitter = i as f32 * 0.01;
            out.push(("yes".to_string(), vec![1.0 + jitter, 0.0, 0.3]));
            out.push(("no".to_string(), vec![0.0, 1.0 - jitter, 0.3]));
        }
        out
    }

    fn borrowed(samples: &[(String, Vec<f32>)]) -> Vec<(&str, &[f32])> {
        samples.iter().map(|(l, v)| (l.as_str(), v.as_slice())).collect()
    }

    #[test]
    fn test_separable_clusters_are_learned() {
        let data = clusters();
        let model = SoftmaxModel::train(&borrowed(&data), &params()).unwrap();
        assert_eq!(model.labels, vec!["no".to_string(), "yes".to_string()]);

        let (label, confidence) = model.predict(&[1.02, 0.0, 0.3]).unwrap();
        assert_eq!(label, "yes");
        assert!(confidence > 0.8, "confidence = {confidence}");

        let (label, _) = model.predict(&[0.0, 0.98, 0.3]).unwrap();
        assert_eq!(label, "no");
        assert!(model.final_loss < 0.5);
    }

    #[test]
    fn test_single_label_is_insufficient() {
        let data: Vec<(String, Vec<f32>)> = (0..10).map(|i| ("x".to_string(), vec![i as f32, 1.0])).collect();
        let result = SoftmaxModel::train(&borrowed(&data), &params());
        assert_eq!(result.unwrap_err(), TrainingSkip::TooFewLabels { found: 1 });
    }

    #[test]
    fn test_too_few_samples() {
        let data = clusters();
        let result = SoftmaxModel::train(&borrowed(&data[..4]), &params());
        assert_eq!(result.unwrap_err(), TrainingSkip::TooFewSamples { needed: 8, found: 4 });
    }

    #[test]
    fn test_training_is_deterministic() {
        let data = clusters();
        let a = SoftmaxModel::train(&borrowed(&data), &params()).unwrap();
        let b = SoftmaxModel::train(&borrowed(&data), &params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dimension_mismatch_predicts_none() {
        let data = clusters();
        let model = SoftmaxModel::train(&borrowed(&data), &params()).unwrap();
        assert!(model.predict(&[1.0]).is_none());
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }
}
