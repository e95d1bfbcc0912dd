//! Classifier module - learned gesture models trained from calibration samples
//!
//! Two softmax regressors (handshape, orientation) and a k-NN location model.
//! Re-exports only. All logic in submodules.

mod bank;
mod knn;
mod normalizer;
mod samples;
mod softmax;

pub use bank::{ClassifierBank, Contribution, ModelOutcome, Prediction, TrainingReport, TrainingSkip};
pub use knn::LocationModel;
pub use normalizer::Normalizer;
pub use samples::{SampleStore, SampleTable};
pub use softmax::SoftmaxModel;
