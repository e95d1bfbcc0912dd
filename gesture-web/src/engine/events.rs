//! Engine notifications and the subscriber list they are delivered to

use std::collections::BTreeMap;

use serde::Serialize;

use crate::classifier::TrainingReport;
use crate::error::Result;
use crate::features::FeatureKind;
use crate::hand::{Handedness, Landmark};

/// Which side of fusion produced a gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureSource {
    Heuristic,
    Learned,
    /// Heuristic and learned agreed; confidence is their mean
    Blended,
}

impl GestureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureSource::Heuristic => "heuristic",
            GestureSource::Learned => "learned",
            GestureSource::Blended => "blended",
        }
    }
}

/// An emitted gesture
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GestureEvent {
    pub gesture: String,
    pub confidence: f32,
    pub hand_index: usize,
    pub handedness: Handedness,
    pub source: GestureSource,
    /// Landmarks of the winning hand in the emitting frame
    pub landmarks: Vec<Landmark>,
    pub timestamp_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EngineEvent {
    GestureDetected(GestureEvent),
    CalibrationStarted {
        label: String,
        target: usize,
        interval_ms: f64,
    },
    CalibrationProgress {
        label: String,
        collected: usize,
        target: usize,
    },
    CalibrationStopped {
        label: String,
        collected: usize,
        /// Whether a training pass follows
        train: bool,
    },
    CalibrationTrained {
        report: TrainingReport,
    },
    CalibrationLoaded {
        samples: BTreeMap<FeatureKind, usize>,
        trained_labels: BTreeMap<FeatureKind, Vec<String>>,
    },
    CalibrationCleared,
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::GestureDetected(_) => "gesture-detected",
            EngineEvent::CalibrationStarted { .. } => "calibration-started",
            EngineEvent::CalibrationProgress { .. } => "calibration-progress",
            EngineEvent::CalibrationStopped { .. } => "calibration-stopped",
            EngineEvent::CalibrationTrained { .. } => "calibration-trained",
            EngineEvent::CalibrationLoaded { .. } => "calibration-loaded",
            EngineEvent::CalibrationCleared => "calibration-cleared",
        }
    }

    /// JSON payload, including the `event` name field
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&EngineEvent)>;

/// Ordered list of callbacks; every event reaches every subscriber in
/// registration order
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn emit(&mut self, event: &EngineEvent) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(event);
        }
    }
}
