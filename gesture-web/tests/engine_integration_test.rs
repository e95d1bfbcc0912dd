//! Engine Integration Tests
//!
//! Drive the public engine API the way the browser bridge does:
//! - Heuristic detection and the emission cooldown
//! - Calibration of two labels, training and fused prediction
//! - Persisting through a store and restoring into a fresh engine

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gesture_web::calibration::{CalibrationOptions, CalibrationState};
use gesture_web::hand::landmarks::*;
use gesture_web::persistence::{save_models, save_samples, KeyValueStore, MODELS_KEY, SAMPLES_KEY};
use gesture_web::{EngineConfig, EngineEvent, GestureEngine, GestureSource, HandObservation, Handedness, MemoryStore};

// ============================================================================
// Helper Functions
// ============================================================================

/// Store whose contents outlive the engine that writes to it
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<HashMap<String, String>>>);

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> gesture_web::Result<Option<String>> {
        Ok(self.0.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> gesture_web::Result<()> {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> gesture_web::Result<()> {
        self.0.borrow_mut().remove(key);
        Ok(())
    }
}

/// Thumb pointing up, four fingers curled
fn thumbs_up() -> Vec<Landmark> {
    let mut lm = vec![Landmark::default(); LANDMARK_COUNT];
    lm[WRIST] = Landmark::new(0.5, 0.7, 0.0);
    lm[THUMB_CMC] = Landmark::new(0.44, 0.45, 0.0);
    lm[THUMB_MCP] = Landmark::new(0.42, 0.3, 0.0);
    lm[THUMB_IP] = Landmark::new(0.42, 0.25, 0.0);
    lm[THUMB_TIP] = Landmark::new(0.42, 0.2, 0.0);
    lm[INDEX_MCP] = Landmark::new(0.5, 0.45, 0.0);
    lm[INDEX_PIP] = Landmark::new(0.55, 0.42, 0.0);
    lm[INDEX_DIP] = Landmark::new(0.56, 0.46, 0.0);
    lm[INDEX_TIP] = Landmark::new(0.54, 0.48, 0.0);
    lm[MIDDLE_MCP] = Landmark::new(0.53, 0.47, 0.0);
    lm[MIDDLE_PIP] = Landmark::new(0.58, 0.44, 0.0);
    lm[MIDDLE_DIP] = Landmark::new(0.59, 0.48, 0.0);
    lm[MIDDLE_TIP] = Landmark::new(0.57, 0.5, 0.0);
    lm[RING_MCP] = Landmark::new(0.55, 0.5, 0.0);
    lm[RING_PIP] = Landmark::new(0.6, 0.47, 0.0);
    lm[RING_DIP] = Landmark::new(0.61, 0.51, 0.0);
    lm[RING_TIP] = Landmark::new(0.59, 0.53, 0.0);
    lm[PINKY_MCP] = Landmark::new(0.56, 0.54, 0.0);
    lm[PINKY_PIP] = Landmark::new(0.6, 0.52, 0.0);
    lm[PINKY_DIP] = Landmark::new(0.61, 0.55, 0.0);
    lm[PINKY_TIP] = Landmark::new(0.6, 0.57, 0.0);
    lm
}

/// Thumb folded across the curled fingers
fn fist() -> Vec<Landmark> {
    let mut lm = thumbs_up();
    lm[THUMB_MCP] = Landmark::new(0.43, 0.36, 0.0);
    lm[THUMB_IP] = Landmark::new(0.45, 0.38, 0.0);
    lm[THUMB_TIP] = Landmark::new(0.47, 0.34, 0.0);
    lm
}

/// Four long fingers straight up and spread, thumb tucked
fn open_palm() -> Vec<Landmark> {
    let mut lm = vec![Landmark::default(); LANDMARK_COUNT];
    lm[WRIST] = Landmark::new(0.5, 0.8, 0.0);
    lm[THUMB_CMC] = Landmark::new(0.46, 0.75, 0.0);
    lm[THUMB_MCP] = Landmark::new(0.45, 0.7, 0.0);
    lm[THUMB_IP] = Landmark::new(0.46, 0.67, 0.0);
    lm[THUMB_TIP] = Landmark::new(0.47, 0.66, 0.0);
    for (mcp, x) in [(INDEX_MCP, 0.44), (MIDDLE_MCP, 0.5), (RING_MCP, 0.56), (PINKY_MCP, 0.62)] {
        for step in 0..4 {
            lm[mcp + step] = Landmark::new(x, 0.6 - 0.06 * step as f32, 0.0);
        }
    }
    lm
}

fn frame(landmarks: Vec<Landmark>) -> Vec<HandObservation> {
    vec![HandObservation::new(landmarks, Handedness::Unknown, 0)]
}

/// Record `label` from `landmarks` until the session auto-stops; returns the
/// time after the last frame
fn calibrate<S: KeyValueStore>(engine: &mut GestureEngine<S>, label: &str, landmarks: Vec<Landmark>, start_ms: f64) -> f64 {
    let options = CalibrationOptions {
        target_samples: Some(10),
        capture_interval_ms: Some(100.0),
        ..CalibrationOptions::default()
    };
    engine.start_calibration(label, &options);
    let hands = frame(landmarks);
    let mut now = start_ms;
    while engine.calibration_status().state == CalibrationState::Recording {
        engine.process_frame(&hands, now);
        now += 100.0;
    }
    now
}

fn event_log<S: KeyValueStore>(engine: &mut GestureEngine<S>) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    engine.subscribe(move |event: &EngineEvent| sink.borrow_mut().push(event.name().to_string()));
    log
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn test_thumbs_up_is_detected_once_per_cooldown() {
    let mut engine = GestureEngine::new(EngineConfig::default(), MemoryStore::new());
    let log = event_log(&mut engine);
    let hands = frame(thumbs_up());

    let mut emitted = Vec::new();
    for i in 0..30 {
        if let Some(event) = engine.process_frame(&hands, i as f64 * 33.0) {
            emitted.push(event);
        }
    }

    // 30 frames at ~30 fps span 957 ms, inside one cooldown window
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].gesture, "thumbs_up");
    assert_eq!(emitted[0].source, GestureSource::Heuristic);
    assert!(emitted[0].confidence >= 0.9);
    assert_eq!(*log.borrow(), vec!["gesture-detected".to_string()]);

    assert!(engine.process_frame(&hands, 2000.0).is_some());
}

#[test]
fn test_history_never_exceeds_capacity() {
    let config = EngineConfig {
        history_capacity: 4,
        ..EngineConfig::default()
    };
    let mut engine = GestureEngine::new(config, MemoryStore::new());
    for i in 0..20 {
        engine.process_frame(&frame(open_palm()), i as f64 * 33.0);
        assert!(engine.pose_history().len(0) <= 4);
    }
    assert_eq!(engine.pose_history().len(0), 4);
}

#[test]
fn test_identical_input_gives_identical_events() {
    let run = || {
        let mut engine = GestureEngine::new(EngineConfig::default(), MemoryStore::new());
        let hands = frame(thumbs_up());
        (0..10)
            .filter_map(|i| engine.process_frame(&hands, i as f64 * 500.0))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

// ============================================================================
// Calibration, training and restore
// ============================================================================

#[test]
fn test_calibrated_labels_are_recognized_and_survive_restore() {
    let store = SharedStore::default();
    let mut engine = GestureEngine::new(EngineConfig::default(), store.clone());
    let log = event_log(&mut engine);

    let now = calibrate(&mut engine, "hello", open_palm(), 0.0);
    let now = calibrate(&mut engine, "fist", fist(), now);

    let status = engine.calibration_status();
    assert_eq!(status.state, CalibrationState::Idle);
    for counts in status.sample_counts.values() {
        assert_eq!(counts.get("hello"), Some(&10));
        assert_eq!(counts.get("fist"), Some(&10));
    }
    assert_eq!(status.trained_labels.len(), 3);
    assert_eq!(
        log.borrow().iter().filter(|name| *name == "calibration-trained").count(),
        2
    );

    // The open palm heuristic scores 0.9; the learned label beats it
    let event = engine.process_frame(&frame(open_palm()), now + 5000.0).unwrap();
    assert_eq!(event.gesture, "hello");
    assert_eq!(event.source, GestureSource::Learned);

    // Learned and heuristic agree on "fist" and are averaged
    let event = engine.process_frame(&frame(fist()), now + 10000.0).unwrap();
    assert_eq!(event.gesture, "fist");
    assert_eq!(event.source, GestureSource::Blended);

    assert!(store.get(MODELS_KEY).unwrap().is_some());
    assert!(store.get(SAMPLES_KEY).unwrap().is_some());

    let mut restored = GestureEngine::new(EngineConfig::default(), store.clone());
    let restored_log = event_log(&mut restored);
    restored.restore();
    assert_eq!(*restored_log.borrow(), vec!["calibration-loaded".to_string()]);
    assert_eq!(restored.classifiers(), engine.classifiers());
    assert_eq!(restored.samples(), engine.samples());

    let event = restored.process_frame(&frame(fist()), 0.0).unwrap();
    assert_eq!(event.gesture, "fist");
    assert_eq!(event.source, GestureSource::Blended);
}

#[test]
fn test_restore_then_persist_writes_identical_records() {
    let store = SharedStore::default();
    let mut engine = GestureEngine::new(EngineConfig::default(), store.clone());
    let now = calibrate(&mut engine, "hello", open_palm(), 0.0);
    calibrate(&mut engine, "fist", fist(), now);

    let models = store.get(MODELS_KEY).unwrap().unwrap();
    let samples = store.get(SAMPLES_KEY).unwrap().unwrap();

    let mut restored = GestureEngine::new(EngineConfig::default(), store.clone());
    restored.restore();
    let mut rewritten = SharedStore::default();
    save_samples(&mut rewritten, restored.samples()).unwrap();
    save_models(&mut rewritten, restored.classifiers()).unwrap();

    assert_eq!(rewritten.get(MODELS_KEY).unwrap(), Some(models));
    assert_eq!(rewritten.get(SAMPLES_KEY).unwrap(), Some(samples));
}

#[test]
fn test_single_label_trains_nothing() {
    let mut engine = GestureEngine::new(EngineConfig::default(), MemoryStore::new());
    let now = calibrate(&mut engine, "hello", open_palm(), 0.0);

    assert!(engine.classifiers().handshape.is_none());
    assert!(engine.classifiers().orientation.is_none());
    assert!(engine.classifiers().location.is_none());
    assert!(engine.classifiers().is_empty());

    // One calibrated word must not swallow the heuristics
    let event = engine.process_frame(&frame(thumbs_up()), now + 5000.0).unwrap();
    assert_eq!(event.gesture, "thumbs_up");
    assert_eq!(event.source, GestureSource::Heuristic);
}

#[test]
fn test_clear_forgets_everything() {
    let store = SharedStore::default();
    let mut engine = GestureEngine::new(EngineConfig::default(), store.clone());
    calibrate(&mut engine, "hello", open_palm(), 0.0);
    engine.clear_calibration_data();

    assert!(store.0.borrow().is_empty());
    let mut restored = GestureEngine::new(EngineConfig::default(), store);
    restored.restore();
    assert!(restored.samples().is_empty());
    assert!(restored.classifiers().is_empty());
}
