//! Persistence module - key/value storage for samples and trained models
//!
//! Re-exports only. All logic in submodules.

mod records;
mod store;

pub use records::{load_models, load_samples, remove_all, save_models, save_samples, MODELS_KEY, SAMPLES_KEY};
pub use store::{KeyValueStore, MemoryStore};
