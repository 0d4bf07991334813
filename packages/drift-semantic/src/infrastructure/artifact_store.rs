//! JSON artifact I/O: atomic writes (temp file + rename), sorted-key
//! 2-space-indent serialization, and `DriftError` mapping on read.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{DriftError, Result};

pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path(&self, artifact: &str) -> PathBuf {
        self.output_dir.join(format!("{artifact}.json"))
    }

    /// Write `value` as canonical (sorted-key, 2-space-indent) JSON, atomically.
    pub fn write<T: Serialize>(&self, artifact: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.path(artifact);
        let body = serde_json::to_string_pretty(value)
            .map_err(|source| DriftError::MalformedArtifact {
                path: path.display().to_string(),
                source,
            })?;

        let tmp = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        std::fs::write(tmp.path(), body.as_bytes())?;
        tmp.persist(&path).map_err(|e| DriftError::Io(e.error))?;
        debug!(artifact, path = %path.display(), "wrote artifact");
        Ok(())
    }

    /// Read and parse an artifact required by the current stage. `producing_stage`
    /// names the stage that should have produced it, for the error message.
    pub fn read_required<T: DeserializeOwned>(
        &self,
        artifact: &str,
        producing_stage: &str,
    ) -> Result<T> {
        let path = self.path(artifact);
        if !path.exists() {
            return Err(DriftError::MissingArtifact {
                artifact: artifact.to_string(),
                path: path.display().to_string(),
                producing_stage: producing_stage.to_string(),
            });
        }
        let bytes = std::fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|source| DriftError::MalformedArtifact {
            path: path.display().to_string(),
            source,
        })
    }

    /// Read an optional artifact; returns `None` when the file does not exist.
    pub fn read_optional<T: DeserializeOwned>(&self, artifact: &str) -> Result<Option<T>> {
        let path = self.path(artifact);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let value = serde_json::from_slice(&bytes).map_err(|source| DriftError::MalformedArtifact {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        b: i32,
        a: i32,
    }

    #[test]
    fn round_trips_through_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let value = Sample { b: 2, a: 1 };
        store.write("sample", &value).unwrap();
        let read: Sample = store.read_required("sample", "fingerprint").unwrap();
        assert_eq!(read, value);
    }

    #[test]
    fn missing_required_artifact_names_producing_stage() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.read_required::<Sample>("missing", "fingerprint").unwrap_err();
        match err {
            DriftError::MissingArtifact { producing_stage, .. } => {
                assert_eq!(producing_stage, "fingerprint");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn optional_artifact_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let value: Option<Sample> = store.read_optional("absent").unwrap();
        assert!(value.is_none());
    }
}
