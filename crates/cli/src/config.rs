//! CLI configuration

use anyhow::Result;
use serde::Deserialize;

/// CLI settings loaded from MATCHCAST_* environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Directory holding persisted model artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: String,
}

fn default_models_dir() -> String {
    "models".to_string()
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MATCHCAST"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| CliConfig {
            models_dir: default_models_dir(),
        }))
    }
}
