//! # Artifact Store
//!
//! Two kinds of filesystem state feed the pipeline:
//!
//! - **Fixed artifacts** — the compiled model, settings, proving key, and
//!   verifying key. Generated once per model, read-only, safely shared
//!   across concurrent requests.
//! - **Transient artifacts** — the uploaded input vector, the witness, and
//!   the proof. Owned by exactly one request. Each request gets its own
//!   scratch directory keyed by a generated request identifier, created at
//!   request start and removed on completion, so two in-flight requests
//!   can never clobber each other's files.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Errors from artifact filesystem operations.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// An underlying filesystem operation failed.
    #[error("artifact I/O error at {path}: {source}")]
    Io {
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArtifactError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Resolved paths of the fixed, long-lived artifacts.
#[derive(Debug, Clone)]
pub struct FixedArtifacts {
    /// Compiled model circuit.
    pub model: PathBuf,
    /// Circuit settings.
    pub settings: PathBuf,
    /// Proving key.
    pub proving_key: PathBuf,
    /// Verifying key.
    pub verifying_key: PathBuf,
}

/// Resolves artifact locations and opens per-request workspaces.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifact_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl ArtifactStore {
    /// Well-known fixed artifact file names inside the artifact directory.
    const MODEL: &'static str = "model.compiled";
    const SETTINGS: &'static str = "settings.json";
    const PROVING_KEY: &'static str = "pk.key";
    const VERIFYING_KEY: &'static str = "vk.key";

    /// Create a store over a fixed-artifact directory and a scratch root.
    pub fn new(artifact_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        ArtifactStore {
            artifact_dir: artifact_dir.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Resolve the fixed artifact paths. Purely deterministic; existence is
    /// not checked here — a missing artifact surfaces as an engine failure.
    pub fn fixed(&self) -> FixedArtifacts {
        FixedArtifacts {
            model: self.artifact_dir.join(Self::MODEL),
            settings: self.artifact_dir.join(Self::SETTINGS),
            proving_key: self.artifact_dir.join(Self::PROVING_KEY),
            verifying_key: self.artifact_dir.join(Self::VERIFYING_KEY),
        }
    }

    /// Open a fresh workspace for one request.
    ///
    /// Creates `scratch_dir/<request-id>/`; the caller owns the directory
    /// until [`RequestWorkspace::close`].
    pub async fn open_workspace(&self) -> Result<RequestWorkspace, ArtifactError> {
        let request_id = Uuid::new_v4();
        let dir = self.scratch_dir.join(request_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ArtifactError::io(&dir, e))?;
        tracing::debug!(request_id = %request_id, dir = %dir.display(), "opened request workspace");
        Ok(RequestWorkspace { request_id, dir })
    }
}

/// The transient filesystem state of one in-flight request.
///
/// Holds the input, witness, and proof paths for exactly one pipeline run.
/// Dropping the workspace removes its directory best-effort; call
/// [`close`](Self::close) to surface removal failures.
#[derive(Debug)]
pub struct RequestWorkspace {
    request_id: Uuid,
    dir: PathBuf,
}

impl RequestWorkspace {
    /// The generated request identifier keying this workspace.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Path of the uploaded input vector.
    pub fn input_path(&self) -> PathBuf {
        self.dir.join("input.json")
    }

    /// Path the witness stage writes to.
    pub fn witness_path(&self) -> PathBuf {
        self.dir.join("witness.json")
    }

    /// Path the prove stage writes to.
    pub fn proof_path(&self) -> PathBuf {
        self.dir.join("proof.json")
    }

    /// Persist the uploaded input bytes, overwriting any prior content.
    pub async fn write_input(&self, bytes: &[u8]) -> Result<(), ArtifactError> {
        let path = self.input_path();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ArtifactError::io(&path, e))
    }

    /// Read back the proof artifact, if present and parseable.
    ///
    /// A missing or corrupt proof file is a recoverable condition — the
    /// response simply carries no proof — so this never returns an error.
    pub async fn read_proof(&self) -> Option<Value> {
        let path = self.proof_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "proof file not readable");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "proof file is not valid JSON");
                None
            }
        }
    }

    /// Remove the workspace directory and everything in it.
    pub async fn close(self) -> Result<(), ArtifactError> {
        let dir = self.dir.clone();
        // Suppress the Drop cleanup; we are removing explicitly.
        std::mem::forget(self);
        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| ArtifactError::io(&dir, e))
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    request_id = %self.request_id,
                    dir = %self.dir.display(),
                    error = %e,
                    "failed to remove request workspace"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(tmp: &tempfile::TempDir) -> ArtifactStore {
        ArtifactStore::new(tmp.path().join("zkfiles"), tmp.path().join("scratch"))
    }

    #[test]
    fn fixed_paths_are_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        let a = store.fixed();
        let b = store.fixed();
        assert_eq!(a.model, b.model);
        assert!(a.model.ends_with("model.compiled"));
        assert!(a.settings.ends_with("settings.json"));
        assert!(a.proving_key.ends_with("pk.key"));
        assert!(a.verifying_key.ends_with("vk.key"));
    }

    #[tokio::test]
    async fn workspaces_are_isolated_per_request() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        let a = store.open_workspace().await.unwrap();
        let b = store.open_workspace().await.unwrap();
        assert_ne!(a.request_id(), b.request_id());
        assert_ne!(a.input_path(), b.input_path());

        a.write_input(b"{\"input_data\":[[1.0]]}").await.unwrap();
        b.write_input(b"{\"input_data\":[[2.0]]}").await.unwrap();
        let a_bytes = tokio::fs::read(a.input_path()).await.unwrap();
        assert_eq!(a_bytes, b"{\"input_data\":[[1.0]]}");
    }

    #[tokio::test]
    async fn write_input_overwrites_prior_content() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = store(&tmp).open_workspace().await.unwrap();
        ws.write_input(b"first").await.unwrap();
        ws.write_input(b"second").await.unwrap();
        let bytes = tokio::fs::read(ws.input_path()).await.unwrap();
        assert_eq!(bytes, b"second");
    }

    #[tokio::test]
    async fn read_proof_returns_none_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = store(&tmp).open_workspace().await.unwrap();
        assert!(ws.read_proof().await.is_none());
    }

    #[tokio::test]
    async fn read_proof_returns_none_when_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = store(&tmp).open_workspace().await.unwrap();
        tokio::fs::write(ws.proof_path(), b"not json {{").await.unwrap();
        assert!(ws.read_proof().await.is_none());
    }

    #[tokio::test]
    async fn read_proof_parses_json() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = store(&tmp).open_workspace().await.unwrap();
        tokio::fs::write(ws.proof_path(), b"{\"hex_proof\":\"ab\"}")
            .await
            .unwrap();
        let value = ws.read_proof().await.unwrap();
        assert_eq!(value["hex_proof"], "ab");
    }

    #[tokio::test]
    async fn close_removes_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        let ws = store.open_workspace().await.unwrap();
        let dir = ws.input_path().parent().unwrap().to_path_buf();
        ws.write_input(b"{}").await.unwrap();
        ws.close().await.unwrap();
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn drop_removes_the_directory_best_effort() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp);
        let dir;
        {
            let ws = store.open_workspace().await.unwrap();
            dir = ws.input_path().parent().unwrap().to_path_buf();
            ws.write_input(b"{}").await.unwrap();
        }
        assert!(!dir.exists());
    }
}
