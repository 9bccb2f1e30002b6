//! Trainable three-class probabilistic classifier capability

mod attentive;

pub use attentive::AttentiveNet;

use ndarray::Array2;

use crate::error::ModelError;

/// Number of outcome classes predicted by every classifier
pub const NUM_CLASSES: usize = 3;

/// Capability contract for a trainable three-class probabilistic classifier
///
/// The outcome model depends only on this trait, so any estimator producing
/// per-row probability triples can be substituted. `y` entries are class ids
/// (0 = away, 1 = draw, 2 = home).
pub trait Classifier: Send + Sync {
    /// Train on a standardized feature matrix, replacing any prior state
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<(), ModelError>;

    /// Per-row probability distributions, shape `(n, 3)`, each row summing
    /// to 1.0 within floating tolerance
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError>;

    /// Self-contained serialization of the trained state
    fn export_state(&self) -> Result<Vec<u8>, ModelError>;

    /// Replace state from a blob produced by [`export_state`](Self::export_state)
    fn import_state(&mut self, blob: &[u8]) -> Result<(), ModelError>;

    /// A fresh classifier configured identically to `self` but untrained.
    /// Used so a failed re-fit never disturbs committed state.
    fn clone_unfit(&self) -> Box<dyn Classifier>;

    /// Human readable name used for logging and tracking
    fn name(&self) -> &str {
        "classifier"
    }
}
