//! Core data types for match outcome prediction

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Feature column order expected by the convenience prediction API
pub const FEATURE_NAMES: [&str; 3] = ["home_form", "market_margin", "home_implied"];

/// Three-way match result, indexed by classifier class id
///
/// The class-id convention is fixed: 0 = away win, 1 = draw, 2 = home win.
/// Every consumer of classifier output relies on this ordering, so it is
/// encoded once here and covered by explicit tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Away = 0,
    Draw = 1,
    Home = 2,
}

impl Outcome {
    /// Classifier class id for this outcome
    pub fn class_id(self) -> usize {
        self as usize
    }

    /// Outcome for a classifier class id
    pub fn from_class_id(id: usize) -> Option<Self> {
        match id {
            0 => Some(Outcome::Away),
            1 => Some(Outcome::Draw),
            2 => Some(Outcome::Home),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Outcome::Away => "away",
            Outcome::Draw => "draw",
            Outcome::Home => "home",
        };
        f.write_str(label)
    }
}

/// A probability distribution over the three outcomes, indexed by class id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDistribution([f64; 3]);

impl OutcomeDistribution {
    pub fn new(away: f64, draw: f64, home: f64) -> Self {
        Self([away, draw, home])
    }

    pub fn away(&self) -> f64 {
        self.0[0]
    }

    pub fn draw(&self) -> f64 {
        self.0[1]
    }

    pub fn home(&self) -> f64 {
        self.0[2]
    }

    /// Probability for a specific outcome
    pub fn probability(&self, outcome: Outcome) -> f64 {
        self.0[outcome.class_id()]
    }

    /// The most likely outcome
    pub fn argmax(&self) -> Outcome {
        let mut best = Outcome::Away;
        for outcome in [Outcome::Draw, Outcome::Home] {
            if self.probability(outcome) > self.probability(best) {
                best = outcome;
            }
        }
        best
    }

    pub fn as_array(&self) -> [f64; 3] {
        self.0
    }
}

/// Named result of a single-fixture prediction, rounded to 3 decimal places
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl From<OutcomeDistribution> for OutcomeProbabilities {
    fn from(dist: OutcomeDistribution) -> Self {
        Self {
            home: round3(dist.home()),
            draw: round3(dist.draw()),
            away: round3(dist.away()),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// The fixed named feature triple used by [`predict_one`]
///
/// Column order matches [`FEATURE_NAMES`]: recent home-team form, bookmaker
/// market margin, home-team implied probability.
///
/// [`predict_one`]: crate::model::OutcomeModel::predict_one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchFeatures {
    pub home_form: f64,
    pub market_margin: f64,
    pub home_implied: f64,
}

impl MatchFeatures {
    pub fn new(home_form: f64, market_margin: f64, home_implied: f64) -> Self {
        Self {
            home_form,
            market_margin,
            home_implied,
        }
    }

    /// Single-row feature matrix in the fixed column order
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_vec(
            (1, FEATURE_NAMES.len()),
            vec![self.home_form, self.market_margin, self.home_implied],
        )
        .expect("shape matches data length")
    }
}

/// Build a feature matrix from row slices, validating a uniform arity
pub fn feature_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>, ModelError> {
    let arity = rows.first().map(Vec::len).ok_or(ModelError::EmptyInput)?;
    let mut flat = Vec::with_capacity(rows.len() * arity);
    for row in rows {
        if row.len() != arity {
            return Err(ModelError::DimensionMismatch {
                expected: arity,
                actual: row.len(),
            });
        }
        flat.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), arity), flat).map_err(|_| ModelError::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_convention() {
        assert_eq!(Outcome::Away.class_id(), 0);
        assert_eq!(Outcome::Draw.class_id(), 1);
        assert_eq!(Outcome::Home.class_id(), 2);
        assert_eq!(Outcome::from_class_id(0), Some(Outcome::Away));
        assert_eq!(Outcome::from_class_id(1), Some(Outcome::Draw));
        assert_eq!(Outcome::from_class_id(2), Some(Outcome::Home));
        assert_eq!(Outcome::from_class_id(3), None);
    }

    #[test]
    fn test_distribution_accessors() {
        let dist = OutcomeDistribution::new(0.1, 0.2, 0.7);
        assert_eq!(dist.away(), 0.1);
        assert_eq!(dist.draw(), 0.2);
        assert_eq!(dist.home(), 0.7);
        assert_eq!(dist.argmax(), Outcome::Home);
    }

    #[test]
    fn test_probabilities_rounding() {
        let probs = OutcomeProbabilities::from(OutcomeDistribution::new(0.1111, 0.2222, 0.6667));
        assert_eq!(probs.away, 0.111);
        assert_eq!(probs.draw, 0.222);
        assert_eq!(probs.home, 0.667);
    }

    #[test]
    fn test_probabilities_json_keys() {
        let probs = OutcomeProbabilities::from(OutcomeDistribution::new(0.1, 0.2, 0.7));
        let json = serde_json::to_value(probs).unwrap();
        assert_eq!(json["home"], 0.7);
        assert_eq!(json["draw"], 0.2);
        assert_eq!(json["away"], 0.1);
    }

    #[test]
    fn test_match_features_row_order() {
        let row = MatchFeatures::new(1.0, 2.0, 3.0).to_row();
        assert_eq!(row.shape(), &[1, 3]);
        assert_eq!(row[[0, 0]], 1.0);
        assert_eq!(row[[0, 1]], 2.0);
        assert_eq!(row[[0, 2]], 3.0);
    }

    #[test]
    fn test_feature_matrix_validation() {
        assert!(matches!(feature_matrix(&[]), Err(ModelError::EmptyInput)));
        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            feature_matrix(&ragged),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
        let matrix = feature_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
    }
}
