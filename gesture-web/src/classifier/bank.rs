//! The three learned models and how their votes are combined

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::knn::LocationModel;
use super::samples::SampleStore;
use super::softmax::SoftmaxModel;
use crate::config::TrainingConfig;
use crate::features::{FeatureKind, FeaturePacket};

/// Vote weight of each softmax model
const SOFTMAX_WEIGHT: f32 = 1.0;

/// Why a model was not (re)trained
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainingSkip {
    #[error("need at least {needed} samples, have {found}")]
    TooFewSamples { needed: usize, found: usize },
    #[error("need at least 2 labels, have {found}")]
    TooFewLabels { found: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    Trained {
        labels: Vec<String>,
        samples: usize,
        /// Softmax models only
        final_loss: Option<f32>,
    },
    Skipped {
        reason: TrainingSkip,
    },
}

impl ModelOutcome {
    pub fn is_trained(&self) -> bool {
        matches!(self, ModelOutcome::Trained { .. })
    }
}

/// Outcome of one training pass, per model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub handshape: ModelOutcome,
    pub orientation: ModelOutcome,
    pub location: ModelOutcome,
}

impl TrainingReport {
    pub fn outcome(&self, kind: FeatureKind) -> &ModelOutcome {
        match kind {
            FeatureKind::Handshape => &self.handshape,
            FeatureKind::Orientation => &self.orientation,
            FeatureKind::Location => &self.location,
        }
    }

    pub fn any_trained(&self) -> bool {
        FeatureKind::ALL.iter().any(|kind| self.outcome(*kind).is_trained())
    }
}

/// One model's opinion about a packet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub kind: FeatureKind,
    pub label: String,
    pub confidence: f32,
    pub weight: f32,
}

/// Combined learned prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
    pub contributors: Vec<Contribution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierBank {
    #[serde(default)]
    pub handshape: Option<SoftmaxModel>,
    #[serde(default)]
    pub orientation: Option<SoftmaxModel>,
    #[serde(default)]
    pub location: Option<LocationModel>,
}

impl ClassifierBank {
    /// Train every model from scratch. A model whose data is insufficient
    /// comes back as `None`, discarding whatever was there before.
    pub fn train(samples: &SampleStore, config: &TrainingConfig) -> (Self, TrainingReport) {
        let handshape_samples = samples.samples(FeatureKind::Handshape);
        let orientation_samples = samples.samples(FeatureKind::Orientation);
        let location_samples = samples.samples(FeatureKind::Location);

        let handshape = SoftmaxModel::train(&handshape_samples, &config.handshape);
        let orientation = SoftmaxModel::train(&orientation_samples, &config.orientation);
        let location = LocationModel::train(&location_samples, &config.location);

        let report = TrainingReport {
            handshape: softmax_outcome(&handshape, handshape_samples.len()),
            orientation: softmax_outcome(&orientation, orientation_samples.len()),
            location: match &location {
                Ok(model) => ModelOutcome::Trained {
                    labels: distinct(&model.labels),
                    samples: model.len(),
                    final_loss: None,
                },
                Err(reason) => ModelOutcome::Skipped { reason: reason.clone() },
            },
        };

        for kind in FeatureKind::ALL {
            match report.outcome(kind) {
                ModelOutcome::Trained { labels, samples, final_loss } => info!(
                    model = kind.as_str(),
                    samples,
                    labels = labels.len(),
                    final_loss = final_loss.unwrap_or(0.0),
                    "model trained"
                ),
                ModelOutcome::Skipped { reason } => {
                    info!(model = kind.as_str(), %reason, "model skipped")
                }
            }
        }

        let bank = Self {
            handshape: handshape.ok(),
            orientation: orientation.ok(),
            location: location.ok(),
        };
        (bank, report)
    }

    pub fn is_empty(&self) -> bool {
        self.handshape.is_none() && self.orientation.is_none() && self.location.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Labels each trained model knows, keyed by model kind
    pub fn trained_labels(&self) -> BTreeMap<FeatureKind, Vec<String>> {
        let mut out = BTreeMap::new();
        if let Some(model) = &self.handshape {
            out.insert(FeatureKind::Handshape, model.labels.clone());
        }
        if let Some(model) = &self.orientation {
            out.insert(FeatureKind::Orientation, model.labels.clone());
        }
        if let Some(model) = &self.location {
            out.insert(FeatureKind::Location, distinct(&model.labels));
        }
        out
    }

    /// Weighted vote across every model that produced a prediction.
    ///
    /// score(label) = Σ weight·confidence over contributions naming the label,
    /// divided by Σ weight over all contributions.
    pub fn predict(&self, packet: Option<&FeaturePacket>, location_weight: f32) -> Option<Prediction> {
        let packet = packet?;
        let mut contributors = Vec::new();

        let softmax_models = [
            (FeatureKind::Handshape, self.handshape.as_ref()),
            (FeatureKind::Orientation, self.orientation.as_ref()),
        ];
        for (kind, model) in softmax_models {
            if let Some((label, confidence)) = model.and_then(|m| m.predict(packet.get(kind))) {
                contributors.push(Contribution {
                    kind,
                    label,
                    confidence,
                    weight: SOFTMAX_WEIGHT,
                });
            }
        }
        if let Some((label, confidence)) = self
            .location
            .as_ref()
            .and_then(|m| m.predict(packet.get(FeatureKind::Location)))
        {
            contributors.push(Contribution {
                kind: FeatureKind::Location,
                label,
                confidence,
                weight: location_weight.max(0.0),
            });
        }

        let total_weight: f32 = contributors.iter().map(|c| c.weight).sum();
        if total_weight <= 0.0 {
            return None;
        }

        let mut scores: BTreeMap<&str, f32> = BTreeMap::new();
        for c in &contributors {
            *scores.entry(c.label.as_str()).or_default() += c.weight * c.confidence;
        }
        let (label, score) = scores
            .into_iter()
            .fold(None, |acc: Option<(&str, f32)>, (label, s)| match acc {
                Some((_, best)) if best >= s => acc,
                _ => Some((label, s)),
            })?;

        let prediction = Prediction {
            label: label.to_string(),
            confidence: (score / total_weight).clamp(0.0, 1.0),
            contributors,
        };
        debug!(label = %prediction.label, confidence = prediction.confidence, "learned prediction");
        Some(prediction)
    }
}

fn softmax_outcome(result: &Result<SoftmaxModel, TrainingSkip>, samples: usize) -> ModelOutcome {
    match result {
        Ok(model) => ModelOutcome::Trained {
            labels: model.labels.clone(),
            samples,
            final_loss: Some(model.final_loss),
        },
        Err(reason) => ModelOutcome::Skipped { reason: reason.clone() },
    }
}

fn distinct(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
