//! JSON records for the sample store and the classifier bank
//!
//! A missing record loads as `None`. A record that fails to parse is an
//! error; the engine logs it and starts empty.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::KeyValueStore;
use crate::classifier::{ClassifierBank, SampleStore};
use crate::error::Result;

/// Key of the trained-model record
pub const MODELS_KEY: &str = "gesture-web.models";

/// Key of the calibration-sample record
pub const SAMPLES_KEY: &str = "gesture-web.samples";

fn save<S: KeyValueStore, T: Serialize>(store: &mut S, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

fn load<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn save_models<S: KeyValueStore>(store: &mut S, bank: &ClassifierBank) -> Result<()> {
    save(store, MODELS_KEY, bank)
}

pub fn load_models<S: KeyValueStore>(store: &S) -> Result<Option<ClassifierBank>> {
    load(store, MODELS_KEY)
}

pub fn save_samples<S: KeyValueStore>(store: &mut S, samples: &SampleStore) -> Result<()> {
    save(store, SAMPLES_KEY, samples)
}

pub fn load_samples<S: KeyValueStore>(store: &S) -> Result<Option<SampleStore>> {
    load(store, SAMPLES_KEY)
}

/// Delete both records. Both removals are attempted; the first error wins.
pub fn remove_all<S: KeyValueStore>(store: &mut S) -> Result<()> {
    let models = store.remove(MODELS_KEY);
    let samples = store.remove(SAMPLES_KEY);
    models.and(samples)
}
