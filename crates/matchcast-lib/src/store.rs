//! Durable storage for fitted model artifacts
//!
//! Writes two independent self-contained blobs to fixed well-known names
//! under a models directory: one for the scaler state, one for the
//! classifier state. Writes go through a temp file + rename so readers
//! never observe a half-written artifact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::ModelError;
use crate::scaler::ScalerState;

/// Well-known scaler artifact file name
pub const SCALER_FILE: &str = "transformer_scaler.json";

/// Well-known classifier artifact file name
pub const CLASSIFIER_FILE: &str = "transformer_model.json";

/// Metadata for one persisted artifact
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub size_bytes: usize,
    pub checksum: String,
}

/// Metadata for a completed save of both artifacts
#[derive(Debug, Clone)]
pub struct SavedArtifacts {
    pub scaler: ArtifactInfo,
    pub classifier: ArtifactInfo,
}

/// Store over a models directory with fixed artifact names
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Open a store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ModelError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ModelError::persistence(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(CLASSIFIER_FILE)
    }

    /// Persist both state blobs atomically (per file)
    pub fn save(
        &self,
        scaler: &ScalerState,
        classifier_blob: &[u8],
    ) -> Result<SavedArtifacts, ModelError> {
        let scaler_bytes = serde_json::to_vec(scaler)?;
        let scaler_info = self.write_artifact(&self.scaler_path(), &scaler_bytes)?;
        let classifier_info = self.write_artifact(&self.classifier_path(), classifier_blob)?;

        info!(
            dir = %self.dir.display(),
            scaler_bytes = scaler_info.size_bytes,
            classifier_bytes = classifier_info.size_bytes,
            "model artifacts saved"
        );
        Ok(SavedArtifacts {
            scaler: scaler_info,
            classifier: classifier_info,
        })
    }

    /// Load both state blobs
    pub fn load(&self) -> Result<(ScalerState, Vec<u8>), ModelError> {
        let scaler_path = self.scaler_path();
        let scaler_bytes =
            fs::read(&scaler_path).map_err(|e| ModelError::persistence(&scaler_path, e))?;
        let scaler: ScalerState = serde_json::from_slice(&scaler_bytes)?;

        let classifier_path = self.classifier_path();
        let classifier_blob =
            fs::read(&classifier_path).map_err(|e| ModelError::persistence(&classifier_path, e))?;

        Ok((scaler, classifier_blob))
    }

    /// Metadata for currently persisted artifacts, if present
    pub fn inspect(&self) -> Result<Vec<ArtifactInfo>, ModelError> {
        let mut artifacts = Vec::new();
        for path in [self.scaler_path(), self.classifier_path()] {
            if !path.exists() {
                continue;
            }
            let bytes = fs::read(&path).map_err(|e| ModelError::persistence(&path, e))?;
            artifacts.push(ArtifactInfo {
                checksum: compute_checksum(&bytes),
                size_bytes: bytes.len(),
                path,
            });
        }
        Ok(artifacts)
    }

    fn write_artifact(&self, path: &Path, bytes: &[u8]) -> Result<ArtifactInfo, ModelError> {
        let temp_path = path.with_extension("tmp");
        let mut file =
            File::create(&temp_path).map_err(|e| ModelError::persistence(&temp_path, e))?;
        file.write_all(bytes)
            .map_err(|e| ModelError::persistence(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| ModelError::persistence(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| ModelError::persistence(path, e))?;

        Ok(ArtifactInfo {
            path: path.to_path_buf(),
            size_bytes: bytes.len(),
            checksum: compute_checksum(bytes),
        })
    }
}

/// SHA256 checksum of artifact bytes
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::FeatureScaler;
    use ndarray::array;
    use tempfile::TempDir;

    fn sample_scaler() -> ScalerState {
        let rows = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        FeatureScaler::fit(&rows).unwrap()
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        let checksum = compute_checksum(b"state blob");
        assert_eq!(checksum.len(), 64);
        assert_eq!(checksum, compute_checksum(b"state blob"));
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::new(temp.path().join("models")).unwrap();

        let scaler = sample_scaler();
        let blob = br#"{"weights":[1.0,2.0]}"#.to_vec();
        let saved = store.save(&scaler, &blob).unwrap();
        assert_eq!(saved.classifier.size_bytes, blob.len());
        assert!(saved.scaler.path.ends_with(SCALER_FILE));

        let (restored_scaler, restored_blob) = store.load().unwrap();
        assert_eq!(restored_scaler, scaler);
        assert_eq!(restored_blob, blob);
    }

    #[test]
    fn test_load_missing_artifacts() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::new(temp.path()).unwrap();
        assert!(matches!(store.load(), Err(ModelError::Persistence { .. })));
    }

    #[test]
    fn test_inspect_lists_saved_artifacts() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::new(temp.path()).unwrap();
        assert!(store.inspect().unwrap().is_empty());

        store.save(&sample_scaler(), b"blob").unwrap();
        let artifacts = store.inspect().unwrap();
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::new(temp.path()).unwrap();
        store.save(&sample_scaler(), b"blob").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }
}
