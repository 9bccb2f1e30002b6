//! Inspect command

use std::path::Path;

use anyhow::{Context, Result};
use matchcast_lib::ModelStore;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{format_bytes, print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct ArtifactRow {
    #[tabled(rename = "Artifact")]
    artifact: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "SHA256")]
    checksum: String,
}

pub fn run(models_dir: &Path, format: OutputFormat) -> Result<()> {
    let store = ModelStore::new(models_dir)
        .with_context(|| format!("cannot open model store at {}", models_dir.display()))?;

    let rows: Vec<ArtifactRow> = store
        .inspect()?
        .into_iter()
        .map(|artifact| ArtifactRow {
            artifact: artifact
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: format_bytes(artifact.size_bytes as u64),
            checksum: artifact.checksum,
        })
        .collect();

    print_table(&rows, format);
    Ok(())
}
