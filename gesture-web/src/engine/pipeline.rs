//! Gesture engine - owns all recognition state and runs one frame at a time
//!
//! Per frame: record pose history, feed an active calibration session, run the
//! detector bank and the classifier bank for every hand, fuse, pick the best
//! hand and apply the emission cooldown.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info, warn};

use super::events::{EngineEvent, EventBus, GestureEvent, SubscriptionId};
use super::fusion::{fuse, FusedGesture};
use crate::calibration::{
    CalibrationOptions, CalibrationSession, CalibrationState, CalibrationStatus, CaptureOutcome,
};
use crate::classifier::{ClassifierBank, SampleStore, TrainingReport};
use crate::config::EngineConfig;
use crate::detection::{evaluate_all, DetectionContext};
use crate::features::{extract_features, FeatureKind};
use crate::hand::{HandObservation, PoseHistory};
use crate::persistence::{self, KeyValueStore};

pub struct GestureEngine<S: KeyValueStore> {
    config: EngineConfig,
    store: S,
    history: PoseHistory,
    samples: SampleStore,
    classifiers: ClassifierBank,
    session: CalibrationSession,
    events: EventBus,
    last_emit_ms: Option<f64>,
    emitted: VecDeque<GestureEvent>,
}

impl<S: KeyValueStore> GestureEngine<S> {
    /// Create an engine with empty state. Call [`restore`](Self::restore) to
    /// load persisted samples and models.
    pub fn new(config: EngineConfig, store: S) -> Self {
        let history = PoseHistory::new(config.history_capacity);
        Self {
            config,
            store,
            history,
            samples: SampleStore::new(),
            classifiers: ClassifierBank::default(),
            session: CalibrationSession::new(),
            events: EventBus::new(),
            last_emit_ms: None,
            emitted: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pose_history(&self) -> &PoseHistory {
        &self.history
    }

    pub fn samples(&self) -> &SampleStore {
        &self.samples
    }

    pub fn classifiers(&self) -> &ClassifierBank {
        &self.classifiers
    }

    /// Recently emitted gestures, oldest first
    pub fn gesture_history(&self) -> impl Iterator<Item = &GestureEvent> {
        self.emitted.iter()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Load persisted samples and models. Missing or unreadable records leave
    /// that part empty. Emits `calibration-loaded`.
    pub fn restore(&mut self) {
        match persistence::load_samples(&self.store) {
            Ok(Some(samples)) => self.samples = samples,
            Ok(None) => {}
            Err(err) => warn!(%err, "could not load calibration samples"),
        }
        match persistence::load_models(&self.store) {
            Ok(Some(bank)) => self.classifiers = bank,
            Ok(None) => {}
            Err(err) => warn!(%err, "could not load trained models"),
        }

        let samples: BTreeMap<FeatureKind, usize> = FeatureKind::ALL
            .iter()
            .map(|kind| (*kind, self.samples.count(*kind)))
            .collect();
        info!(
            handshape = samples[&FeatureKind::Handshape],
            models = !self.classifiers.is_empty(),
            "calibration restored"
        );
        self.events.emit(&EngineEvent::CalibrationLoaded {
            samples,
            trained_labels: self.classifiers.trained_labels(),
        });
    }

    fn persist_samples(&mut self) {
        if let Err(err) = persistence::save_samples(&mut self.store, &self.samples) {
            warn!(%err, "could not persist calibration samples");
        }
    }

    fn persist_models(&mut self) {
        if let Err(err) = persistence::save_models(&mut self.store, &self.classifiers) {
            warn!(%err, "could not persist trained models");
        }
    }

    // ========================================================================
    // FRAME PIPELINE
    // ========================================================================

    /// Process one frame of detected hands observed at `now_ms`.
    ///
    /// Returns the emitted gesture, if any; the same event also goes to
    /// subscribers. A frame with no hands clears the pose history.
    pub fn process_frame(&mut self, hands: &[HandObservation], now_ms: f64) -> Option<GestureEvent> {
        if hands.is_empty() {
            self.history.clear();
            return None;
        }

        for hand in hands.iter().filter(|h| h.is_complete()) {
            self.history.record(hand.index, &hand.landmarks);
        }

        if self.session.is_recording() {
            self.capture_calibration(hands, now_ms);
            if self.session.is_recording() && !self.config.detect_while_calibrating {
                return None;
            }
        }

        let (hand, fused) = self.best_hand(hands)?;
        self.emit_gesture(hand, fused, now_ms)
    }

    /// Highest fused confidence across hands; the earlier hand keeps ties
    fn best_hand<'h>(&self, hands: &'h [HandObservation]) -> Option<(&'h HandObservation, FusedGesture)> {
        let mut best: Option<(&HandObservation, FusedGesture)> = None;
        for hand in hands.iter().filter(|h| h.is_complete()) {
            let ctx = DetectionContext::new(hands, hand.index, &self.history);
            let scores = evaluate_all(&hand.landmarks, hand.handedness, &ctx);

            let prediction = if self.classifiers.is_empty() {
                None
            } else {
                let packet = extract_features(hand, hands).filter(|p| p.is_finite());
                self.classifiers.predict(packet.as_ref(), self.config.location_weight)
            };

            let Some(fused) = fuse(&scores, prediction.as_ref(), self.config.learned_floor) else {
                continue;
            };
            let better = best
                .as_ref()
                .map_or(true, |(_, current)| fused.confidence > current.confidence);
            if better {
                best = Some((hand, fused));
            }
        }
        best
    }

    fn emit_gesture(&mut self, hand: &HandObservation, fused: FusedGesture, now_ms: f64) -> Option<GestureEvent> {
        if let Some(last) = self.last_emit_ms {
            if now_ms - last <= self.config.cooldown_ms {
                debug!(gesture = %fused.gesture, "suppressed by cooldown");
                return None;
            }
        }

        let event = GestureEvent {
            gesture: fused.gesture,
            confidence: fused.confidence.clamp(0.0, 1.0),
            hand_index: hand.index,
            handedness: hand.handedness,
            source: fused.source,
            landmarks: hand.landmarks.clone(),
            timestamp_ms: now_ms,
        };
        debug!(
            gesture = %event.gesture,
            confidence = event.confidence,
            source = event.source.as_str(),
            hand = event.hand_index,
            "gesture detected"
        );

        self.last_emit_ms = Some(now_ms);
        self.emitted.push_back(event.clone());
        while self.emitted.len() > self.config.gesture_history_limit {
            self.emitted.pop_front();
        }
        self.events.emit(&EngineEvent::GestureDetected(event.clone()));
        Some(event)
    }

    // ========================================================================
    // CALIBRATION
    // ========================================================================

    /// Capture from the first hand in the frame
    fn capture_calibration(&mut self, hands: &[HandObservation], now_ms: f64) {
        let Some(packet) = hands
            .first()
            .and_then(|hand| extract_features(hand, hands))
            .filter(|p| p.is_finite())
        else {
            return;
        };

        let CaptureOutcome::Captured {
            collected,
            target,
            complete,
        } = self.session.try_capture(now_ms)
        else {
            return;
        };
        let Some((label, auto_train)) = self.session.recording().map(|r| (r.label.clone(), r.auto_train)) else {
            return;
        };

        self.samples
            .add_packet(&label, &packet, self.config.calibration.max_samples_per_label);
        debug!(%label, collected, target, "calibration sample captured");
        self.events.emit(&EngineEvent::CalibrationProgress {
            label,
            collected,
            target,
        });

        let flush_every = self.config.calibration.flush_every.max(1);
        if collected % flush_every == 0 {
            self.persist_samples();
        }
        if complete {
            self.stop_calibration(Some(auto_train));
        }
    }

    /// Start recording samples under `label`. An empty label does nothing.
    pub fn start_calibration(&mut self, label: &str, options: &CalibrationOptions) {
        let Some(rec) = self.session.start(label, options, &self.config.calibration) else {
            debug!("calibration start ignored: empty label");
            return;
        };
        let event = EngineEvent::CalibrationStarted {
            label: rec.label.clone(),
            target: rec.target,
            interval_ms: rec.interval_ms,
        };
        info!(label = %rec.label, target = rec.target, "calibration started");
        self.events.emit(&event);
    }

    /// Stop recording. Trains when `train` says so, falling back to
    /// `train_on_stop`. Returns the training report when a training pass ran.
    pub fn stop_calibration(&mut self, train: Option<bool>) -> Option<TrainingReport> {
        let finished = self.session.finish()?;
        let train = train.unwrap_or(self.config.calibration.train_on_stop);

        self.persist_samples();
        info!(label = %finished.label, collected = finished.collected, train, "calibration stopped");
        self.events.emit(&EngineEvent::CalibrationStopped {
            label: finished.label,
            collected: finished.collected,
            train,
        });

        if train {
            Some(self.train())
        } else {
            None
        }
    }

    /// Stop without training
    pub fn cancel_calibration(&mut self) {
        self.stop_calibration(Some(false));
    }

    /// Retrain every model from the current sample store, replacing the
    /// previous models, and persist them
    pub fn train(&mut self) -> TrainingReport {
        let (bank, report) = ClassifierBank::train(&self.samples, &self.config.training);
        self.classifiers = bank;
        self.persist_models();
        self.events.emit(&EngineEvent::CalibrationTrained { report: report.clone() });
        report
    }

    /// Drop every sample and model, in memory and in the store. Ends any
    /// recording session without training.
    pub fn clear_calibration_data(&mut self) {
        self.session.finish();
        self.samples.clear();
        self.classifiers.clear();
        if let Err(err) = persistence::remove_all(&mut self.store) {
            warn!(%err, "could not remove persisted calibration data");
        }
        info!("calibration data cleared");
        self.events.emit(&EngineEvent::CalibrationCleared);
    }

    pub fn calibration_status(&self) -> CalibrationStatus {
        let recording = self.session.recording();
        CalibrationStatus {
            state: if recording.is_some() {
                CalibrationState::Recording
            } else {
                CalibrationState::Idle
            },
            label: recording.map(|r| r.label.clone()),
            collected: recording.map_or(0, |r| r.collected),
            target: recording.map_or(0, |r| r.target),
            sample_counts: FeatureKind::ALL
                .iter()
                .map(|kind| (*kind, self.samples.label_counts(*kind)))
                .collect(),
            trained_labels: self.classifiers.trained_labels(),
        }
    }
}
