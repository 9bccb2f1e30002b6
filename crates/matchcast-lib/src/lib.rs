//! Core library for three-way match outcome prediction
//!
//! This crate provides the model lifecycle around an opaque three-class
//! probabilistic classifier:
//! - Feature standardization (fit once, applied at inference)
//! - Training and atomic state commits
//! - Persistence of scaler and classifier state blobs
//! - Probability-to-label mapping (away / draw / home)
//! - Tracking-sink reporting for newly fitted models

pub mod classifier;
pub mod config;
pub mod error;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod scaler;
pub mod store;
pub mod tracking;

pub use classifier::{AttentiveNet, Classifier, NUM_CLASSES};
pub use config::{Device, TrainConfig};
pub use error::ModelError;
pub use model::{FitSummary, OutcomeModel};
pub use outcome::{
    feature_matrix, MatchFeatures, Outcome, OutcomeDistribution, OutcomeProbabilities,
    FEATURE_NAMES,
};
pub use pipeline::{FitReport, TrainingSession};
pub use scaler::{FeatureScaler, ScalerState};
pub use store::{ArtifactInfo, ModelStore, SavedArtifacts, CLASSIFIER_FILE, SCALER_FILE};
pub use tracking::{LogSink, TrackingSink, TrainedModelEvent, ARTIFACT_NAME};
