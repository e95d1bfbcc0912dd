//! Detection module - hand-written geometric gesture detectors
//!
//! Re-exports only. All logic in submodules.

mod context;
mod gestures;

#[cfg(test)]
pub(crate) use gestures::fixtures;

pub use context::DetectionContext;
pub use gestures::{best_match, evaluate_all, HeuristicGesture, HeuristicScore, DETECTORS};
