//! wasm_bindgen surface over a single [`GestureEngine`]
//!
//! Engine events are queued while the engine is borrowed and handed to the
//! JavaScript callbacks afterwards, so a callback may call back into this API.

use std::cell::RefCell;

use js_sys::Function;
use wasm_bindgen::prelude::*;

use super::storage::BrowserStore;
use crate::calibration::CalibrationOptions;
use crate::config::EngineConfig;
use crate::engine::{EngineEvent, GestureEngine, GestureEvent};
use crate::error::{EngineError, Result};
use crate::hand::HandObservation;

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static ENGINE: RefCell<Option<GestureEngine<BrowserStore>>> = const { RefCell::new(None) };
    static CALLBACKS: RefCell<Vec<Function>> = const { RefCell::new(Vec::new()) };
    static PENDING: RefCell<Vec<(&'static str, String)>> = const { RefCell::new(Vec::new()) };
}

fn with_engine<R>(f: impl FnOnce(&mut GestureEngine<BrowserStore>) -> R) -> Result<R> {
    let result = ENGINE.with(|cell| cell.borrow_mut().as_mut().map(f).ok_or(EngineError::NotInitialized));
    dispatch_pending();
    result
}

fn queue_event(event: &EngineEvent) {
    match event.to_json() {
        Ok(json) => PENDING.with(|pending| pending.borrow_mut().push((event.name(), json))),
        Err(err) => tracing::warn!(%err, event = event.name(), "could not encode event"),
    }
}

fn dispatch_pending() {
    let events = PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
    if events.is_empty() {
        return;
    }
    let callbacks = CALLBACKS.with(|callbacks| callbacks.borrow().clone());
    for (name, json) in events {
        for callback in &callbacks {
            if let Err(err) = callback.call2(&JsValue::NULL, &JsValue::from_str(name), &JsValue::from_str(&json)) {
                tracing::warn!(event = name, error = ?err, "event callback threw");
            }
        }
    }
}

fn parse_json<T: Default + serde::de::DeserializeOwned>(json: Option<String>) -> Result<T> {
    match json.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Create (or replace) the engine from an optional, possibly partial JSON
/// config, then restore persisted calibration. Subscribe first to receive
/// `calibration-loaded`.
#[wasm_bindgen]
pub fn init_engine(config_json: Option<String>) -> std::result::Result<(), JsValue> {
    let config: EngineConfig = parse_json(config_json)?;
    let mut engine = GestureEngine::new(config, BrowserStore::detect());
    engine.subscribe(queue_event);
    ENGINE.with(|cell| *cell.borrow_mut() = Some(engine));
    with_engine(|engine| engine.restore())?;
    Ok(())
}

/// Called from JavaScript once per MediaPipe result with a flat Float32Array
/// of `num_hands × 21 × 3` values and one handedness code per hand
/// (1 right, -1 left, 0 unknown). Returns the emitted gesture as JSON.
/// Throws when the buffer is shorter than `num_hands` hands.
#[wasm_bindgen]
pub fn process_hands(
    flat_data: &[f32],
    handedness: &[i32],
    num_hands: usize,
) -> std::result::Result<Option<String>, JsValue> {
    let hands = HandObservation::from_flat(flat_data, handedness, num_hands)?;
    let now = js_sys::Date::now();
    let Some(event) = with_engine(|engine| engine.process_frame(&hands, now))? else {
        return Ok(None);
    };
    let json = serde_json::to_string(&event).map_err(EngineError::from)?;
    Ok(Some(json))
}

#[wasm_bindgen]
pub fn start_calibration(label: &str, options_json: Option<String>) -> std::result::Result<(), JsValue> {
    let options: CalibrationOptions = parse_json(options_json)?;
    with_engine(|engine| engine.start_calibration(label, &options))?;
    Ok(())
}

/// Returns the training report as JSON when a training pass ran
#[wasm_bindgen]
pub fn stop_calibration(train: Option<bool>) -> std::result::Result<Option<String>, JsValue> {
    let report = with_engine(|engine| engine.stop_calibration(train))?;
    let json = report
        .map(|r| serde_json::to_string(&r))
        .transpose()
        .map_err(EngineError::from)?;
    Ok(json)
}

#[wasm_bindgen]
pub fn cancel_calibration() -> std::result::Result<(), JsValue> {
    with_engine(|engine| engine.cancel_calibration())?;
    Ok(())
}

#[wasm_bindgen]
pub fn clear_calibration_data() -> std::result::Result<(), JsValue> {
    with_engine(|engine| engine.clear_calibration_data())?;
    Ok(())
}

/// Register `callback(name, payload_json)` for every engine event
#[wasm_bindgen]
pub fn subscribe(callback: Function) {
    CALLBACKS.with(|callbacks| callbacks.borrow_mut().push(callback));
}

#[wasm_bindgen]
pub fn calibration_status() -> std::result::Result<String, JsValue> {
    let status = with_engine(|engine| serde_json::to_string(&engine.calibration_status()))?;
    Ok(status.map_err(EngineError::from)?)
}

/// Recently emitted gestures as a JSON array, oldest first
#[wasm_bindgen]
pub fn gesture_history() -> std::result::Result<String, JsValue> {
    let history = with_engine(|engine| {
        let events: Vec<&GestureEvent> = engine.gesture_history().collect();
        serde_json::to_string(&events)
    })?;
    Ok(history.map_err(EngineError::from)?)
}
