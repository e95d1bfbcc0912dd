//! Engine module - per-frame pipeline, fusion and event delivery
//!
//! Re-exports only. All logic in submodules.

mod events;
mod fusion;
mod pipeline;

pub use events::{EngineEvent, EventBus, GestureEvent, GestureSource, SubscriptionId};
pub use fusion::{fuse, FusedGesture};
pub use pipeline::GestureEngine;
