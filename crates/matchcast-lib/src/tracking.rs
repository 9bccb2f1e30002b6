//! Experiment tracking sink
//!
//! After a successful fit the training pipeline reports the model as a named
//! artifact to a tracking sink. The sink is fire-and-forget from the core's
//! perspective: failures are logged by the caller and never affect the
//! fitted model.

use chrono::{DateTime, Utc};
use tracing::info;

/// Artifact name reported for every fitted outcome model
pub const ARTIFACT_NAME: &str = "transformer_model";

/// Event describing a newly fitted model
#[derive(Debug, Clone)]
pub struct TrainedModelEvent {
    pub artifact: String,
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub checksum: Option<String>,
}

impl TrainedModelEvent {
    pub fn new(samples: usize, checksum: Option<String>) -> Self {
        Self {
            artifact: ARTIFACT_NAME.to_string(),
            trained_at: Utc::now(),
            samples,
            checksum,
        }
    }
}

/// External experiment-tracking collaborator
pub trait TrackingSink: Send + Sync {
    /// Report a newly fitted model artifact
    fn log_model(&self, event: &TrainedModelEvent) -> anyhow::Result<()>;
}

/// Default sink that emits a structured log event
pub struct LogSink;

impl TrackingSink for LogSink {
    fn log_model(&self, event: &TrainedModelEvent) -> anyhow::Result<()> {
        info!(
            event = "model_trained",
            artifact = %event.artifact,
            trained_at = %event.trained_at,
            samples = event.samples,
            checksum = event.checksum.as_deref().unwrap_or("-"),
            "reported trained model"
        );
        Ok(())
    }
}
