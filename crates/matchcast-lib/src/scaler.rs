//! Feature standardization
//!
//! Maps raw feature matrices to zero-mean / unit-variance space. Fitting and
//! transforming are pure functions over an explicit [`ScalerState`]; there is
//! no hidden state to drift out of sync with the classifier.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;

/// Per-column standardization parameters, immutable once fitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl ScalerState {
    /// Number of feature columns this state was fitted on
    pub fn arity(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }
}

/// Standard scaler over feature matrices
pub struct FeatureScaler;

impl FeatureScaler {
    /// Compute per-column mean and standard deviation across all rows.
    ///
    /// Degenerate columns (zero or non-finite standard deviation) get their
    /// std substituted with 1.0 so the transform degenerates to a mean shift
    /// instead of a division by zero. The substitution is logged.
    pub fn fit(rows: &Array2<f64>) -> Result<ScalerState, ModelError> {
        if rows.nrows() == 0 {
            return Err(ModelError::EmptyInput);
        }

        let means = rows.mean_axis(Axis(0)).ok_or(ModelError::EmptyInput)?;
        let mut stds = rows.std_axis(Axis(0), 0.0);

        for (column, std) in stds.iter_mut().enumerate() {
            if *std == 0.0 || !std.is_finite() {
                debug!(column, "constant feature column, substituting std = 1.0");
                *std = 1.0;
            }
        }

        Ok(ScalerState { means, stds })
    }

    /// Apply `(x - mean) / std` per column.
    pub fn transform(rows: &Array2<f64>, state: &ScalerState) -> Result<Array2<f64>, ModelError> {
        if rows.ncols() != state.arity() {
            return Err(ModelError::DimensionMismatch {
                expected: state.arity(),
                actual: rows.ncols(),
            });
        }

        let mut standardized = rows.clone();
        for mut row in standardized.axis_iter_mut(Axis(0)) {
            row -= &state.means;
            row /= &state.stds;
        }
        Ok(standardized)
    }
}
