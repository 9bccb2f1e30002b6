//! Train command

use std::path::Path;

use anyhow::{Context, Result};
use matchcast_lib::{
    feature_matrix, LogSink, ModelStore, OutcomeModel, TrainConfig, TrainingSession,
};
use serde::Serialize;
use tabled::Tabled;

use crate::dataset;
use crate::output::{print_success, print_table, print_warning, OutputFormat};

/// Hyperparameter overrides from the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub epochs: Option<usize>,
    pub lr: Option<f64>,
    pub embed_dim: Option<usize>,
    pub steps: Option<usize>,
    pub seed: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: TrainConfig) -> TrainConfig {
        if let Some(epochs) = self.epochs {
            config.max_epochs = epochs;
        }
        if let Some(lr) = self.lr {
            config.learning_rate = lr;
        }
        if let Some(embed_dim) = self.embed_dim {
            config.embed_dim = embed_dim;
        }
        if let Some(steps) = self.steps {
            config.refinement_steps = steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

#[derive(Tabled, Serialize)]
struct TrainRow {
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "Features")]
    features: usize,
    #[tabled(rename = "Classifier")]
    classifier: String,
    #[tabled(rename = "Persisted")]
    persisted: bool,
    #[tabled(rename = "Tracked")]
    tracked: bool,
}

pub fn run(
    data: &Path,
    models_dir: &Path,
    overrides: Overrides,
    format: OutputFormat,
) -> Result<()> {
    let dataset = dataset::load(data)?;
    let rows = feature_matrix(&dataset.rows).context("training table is not rectangular")?;

    let config = overrides.apply(TrainConfig::default());
    let model = OutcomeModel::attentive(config);

    let store = ModelStore::new(models_dir)
        .with_context(|| format!("cannot open model store at {}", models_dir.display()))?;
    let session = TrainingSession::new(store, Box::new(LogSink));

    let report = session.run(&model, &rows, &dataset.labels)?;

    if let Some(error) = &report.persist_error {
        print_warning(&format!(
            "model trained but was NOT saved to {}: {}",
            models_dir.display(),
            error
        ));
    } else {
        print_success(&format!("model trained and saved to {}", models_dir.display()));
    }

    print_table(
        &[TrainRow {
            samples: report.summary.samples,
            features: report.summary.arity,
            classifier: report.summary.classifier.clone(),
            persisted: report.persisted(),
            tracked: report.tracked,
        }],
        format,
    );
    Ok(())
}
