//! Outcome model lifecycle
//!
//! Owns the scaler/classifier pair and the fit/predict state machine. The
//! committed pair lives behind a single `RwLock` slot and is swapped as one
//! `Arc`, so concurrent readers always observe a consistent pre-fit or
//! post-fit pair, never a torn mix. An internal guard serializes fits.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use ndarray::Array2;
use tracing::info;

use crate::classifier::{AttentiveNet, Classifier, NUM_CLASSES};
use crate::config::TrainConfig;
use crate::error::ModelError;
use crate::outcome::{MatchFeatures, Outcome, OutcomeDistribution, OutcomeProbabilities};
use crate::scaler::{FeatureScaler, ScalerState};

/// The committed scaler/classifier pair, always replaced wholesale
struct Fitted {
    scaler: ScalerState,
    classifier: Box<dyn Classifier>,
}

/// Summary of a successful fit
#[derive(Debug, Clone)]
pub struct FitSummary {
    pub samples: usize,
    pub arity: usize,
    pub classifier: String,
    pub fitted_at: DateTime<Utc>,
}

/// Three-way outcome model wrapping a feature scaler and an opaque
/// three-class probabilistic classifier
///
/// Starts unfit; a successful [`fit`](Self::fit) commits both states
/// atomically. Fitting does not touch the filesystem — persistence is
/// composed by the caller (see [`TrainingSession`](crate::pipeline::TrainingSession)
/// and [`ModelStore`](crate::store::ModelStore)).
pub struct OutcomeModel {
    prototype: Box<dyn Classifier>,
    fitted: RwLock<Option<Arc<Fitted>>>,
    fit_guard: Mutex<()>,
}

impl OutcomeModel {
    /// Build a model around an injected classifier prototype
    pub fn new(prototype: Box<dyn Classifier>) -> Self {
        Self {
            prototype,
            fitted: RwLock::new(None),
            fit_guard: Mutex::new(()),
        }
    }

    /// Build a model around the built-in attentive classifier
    pub fn attentive(config: TrainConfig) -> Self {
        Self::new(Box::new(AttentiveNet::new(config)))
    }

    pub fn is_fitted(&self) -> bool {
        self.committed().is_some()
    }

    fn committed(&self) -> Option<Arc<Fitted>> {
        self.fitted
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn commit(&self, pair: Fitted) {
        let mut slot = self
            .fitted
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::new(pair));
    }

    /// Fit scaler and classifier on a training table.
    ///
    /// Validation happens before any state changes; on any failure the
    /// previously committed pair (or the unfit state) is left untouched.
    /// Blocks while another fit is in flight on this instance.
    pub fn fit(&self, rows: &Array2<f64>, labels: &[Outcome]) -> Result<FitSummary, ModelError> {
        if rows.nrows() == 0 {
            return Err(ModelError::EmptyInput);
        }
        if rows.nrows() != labels.len() {
            return Err(ModelError::LengthMismatch {
                rows: rows.nrows(),
                labels: labels.len(),
            });
        }

        let _guard = self
            .fit_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let scaler = FeatureScaler::fit(rows)?;
        let standardized = FeatureScaler::transform(rows, &scaler)?;

        let class_ids: Vec<usize> = labels.iter().map(|o| o.class_id()).collect();
        let mut classifier = self.prototype.clone_unfit();
        classifier.fit(&standardized, &class_ids)?;

        let summary = FitSummary {
            samples: rows.nrows(),
            arity: rows.ncols(),
            classifier: classifier.name().to_string(),
            fitted_at: Utc::now(),
        };

        self.commit(Fitted { scaler, classifier });
        info!(
            samples = summary.samples,
            arity = summary.arity,
            classifier = %summary.classifier,
            "model fitted"
        );
        Ok(summary)
    }

    /// Probability distributions for one or more feature rows
    pub fn predict_proba(&self, rows: &Array2<f64>) -> Result<Vec<OutcomeDistribution>, ModelError> {
        let fitted = self.committed().ok_or(ModelError::NotFitted)?;
        let standardized = FeatureScaler::transform(rows, &fitted.scaler)?;
        let probs = fitted.classifier.predict_proba(&standardized)?;

        debug_assert_eq!(probs.ncols(), NUM_CLASSES);
        Ok(probs
            .rows()
            .into_iter()
            .map(|row| OutcomeDistribution::new(row[0], row[1], row[2]))
            .collect())
    }

    /// Named home/draw/away probabilities for a single fixture
    ///
    /// Maps classifier class ids onto labels (2 → home, 1 → draw, 0 → away)
    /// and rounds each value to 3 decimal places.
    pub fn predict_one(&self, features: MatchFeatures) -> Result<OutcomeProbabilities, ModelError> {
        let distributions = self.predict_proba(&features.to_row())?;
        Ok(OutcomeProbabilities::from(distributions[0]))
    }

    /// Snapshot the committed states for persistence
    pub fn export(&self) -> Result<(ScalerState, Vec<u8>), ModelError> {
        let fitted = self.committed().ok_or(ModelError::NotFitted)?;
        let blob = fitted.classifier.export_state()?;
        Ok((fitted.scaler.clone(), blob))
    }

    /// Restore and commit previously exported states.
    ///
    /// Like `fit`, this replaces the committed pair atomically; a failed
    /// import leaves the prior state untouched.
    pub fn import(&self, scaler: ScalerState, classifier_blob: &[u8]) -> Result<(), ModelError> {
        let mut classifier = self.prototype.clone_unfit();
        classifier.import_state(classifier_blob)?;
        self.commit(Fitted { scaler, classifier });
        Ok(())
    }
}
