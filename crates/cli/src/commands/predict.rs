//! Predict command

use std::path::Path;

use anyhow::{Context, Result};
use matchcast_lib::{MatchFeatures, ModelStore, OutcomeModel, TrainConfig};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{format_probability, print_info, print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct PredictionRow {
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Probability")]
    probability: String,
}

pub fn run(
    models_dir: &Path,
    home_form: f64,
    market_margin: f64,
    home_implied: f64,
    format: OutputFormat,
) -> Result<()> {
    let store = ModelStore::new(models_dir)
        .with_context(|| format!("cannot open model store at {}", models_dir.display()))?;
    let (scaler, blob) = store
        .load()
        .context("no trained model found; run `matchcast train` first")?;

    let model = OutcomeModel::attentive(TrainConfig::default());
    model.import(scaler, &blob)?;

    let probs = model.predict_one(MatchFeatures::new(home_form, market_margin, home_implied))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&probs)?),
        OutputFormat::Table => {
            print_info(&format!(
                "fixture: home_form={} market_margin={} home_implied={}",
                home_form, market_margin, home_implied
            ));
            print_table(
                &[
                    PredictionRow {
                        outcome: "home".to_string(),
                        probability: format_probability(probs.home),
                    },
                    PredictionRow {
                        outcome: "draw".to_string(),
                        probability: format_probability(probs.draw),
                    },
                    PredictionRow {
                        outcome: "away".to_string(),
                        probability: format_probability(probs.away),
                    },
                ],
                format,
            );
        }
    }
    Ok(())
}
