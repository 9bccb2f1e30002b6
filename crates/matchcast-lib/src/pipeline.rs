//! Training orchestration
//!
//! Composes fit, persistence and tracking as separate operations so the core
//! model stays filesystem-free. The durability policy is explicit: a fit
//! error aborts the session, but persistence and tracking failures leave the
//! in-memory model fully usable and are surfaced in the [`FitReport`] and in
//! the logs instead of rolled back.

use ndarray::Array2;
use tracing::warn;

use crate::error::ModelError;
use crate::model::{FitSummary, OutcomeModel};
use crate::outcome::Outcome;
use crate::store::{ModelStore, SavedArtifacts};
use crate::tracking::{TrackingSink, TrainedModelEvent};

/// What actually happened during a training session
///
/// `artifacts` is `None` exactly when `persist_error` is `Some`: the model
/// trained but was not durably saved, and callers must not assume otherwise.
#[derive(Debug)]
pub struct FitReport {
    pub summary: FitSummary,
    pub artifacts: Option<SavedArtifacts>,
    pub persist_error: Option<String>,
    pub tracked: bool,
}

impl FitReport {
    pub fn persisted(&self) -> bool {
        self.artifacts.is_some()
    }
}

/// Orchestrates fit → save → track for an [`OutcomeModel`]
pub struct TrainingSession {
    store: ModelStore,
    sink: Box<dyn TrackingSink>,
}

impl TrainingSession {
    pub fn new(store: ModelStore, sink: Box<dyn TrackingSink>) -> Self {
        Self { store, sink }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Fit the model, then persist and report it.
    ///
    /// A fit failure propagates and leaves the model state untouched.
    /// Persistence and sink failures are logged and recorded in the report.
    pub fn run(
        &self,
        model: &OutcomeModel,
        rows: &Array2<f64>,
        labels: &[Outcome],
    ) -> Result<FitReport, ModelError> {
        let summary = model.fit(rows, labels)?;

        let (artifacts, persist_error) = match model
            .export()
            .and_then(|(scaler, blob)| self.store.save(&scaler, &blob))
        {
            Ok(saved) => (Some(saved), None),
            Err(e) => {
                warn!(error = %e, "model trained but artifacts were not persisted");
                (None, Some(e.to_string()))
            }
        };

        let checksum = artifacts
            .as_ref()
            .map(|saved| saved.classifier.checksum.clone());
        let event = TrainedModelEvent::new(summary.samples, checksum);
        let tracked = match self.sink.log_model(&event) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "tracking sink rejected trained-model event");
                false
            }
        };

        Ok(FitReport {
            summary,
            artifacts,
            persist_error,
            tracked,
        })
    }

    /// Restore a model's committed state from the session's store
    pub fn restore(&self, model: &OutcomeModel) -> Result<(), ModelError> {
        let (scaler, blob) = self.store.load()?;
        model.import(scaler, &blob)
    }
}
