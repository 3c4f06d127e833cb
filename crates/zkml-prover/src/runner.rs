//! # Stage Runner
//!
//! The external proving engine is reached through a single sealed
//! capability: [`StageRunner::execute`]. Orchestration logic never names
//! the execution mechanism, so a local process, a sandboxed container, or
//! a remote call are interchangeable behind the trait.
//!
//! ## Sealed Trait
//!
//! Only implementations defined within this crate can exist
//! ([`EzklRunner`] and the test-oriented [`MockRunner`](crate::MockRunner)).
//! The engine boundary is a trust boundary; sealing keeps unvetted
//! execution mechanisms out of the pipeline.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;

use zkml_core::{Stage, StageResult};

/// Errors starting or awaiting the external engine process.
///
/// A nonzero engine exit is **not** a `RunnerError` — that is a
/// [`StageResult`] with `success = false`. This type covers only failures
/// of the invocation mechanism itself.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The engine binary could not be spawned.
    #[error("failed to spawn proving engine `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The child process could not be awaited.
    #[error("failed to await proving engine: {0}")]
    Wait(#[source] std::io::Error),
}

/// Typed argument list for one engine invocation.
///
/// The three constructors encode the engine's command contract; `to_argv`
/// renders the exact argument vector the engine expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageArgs {
    /// `gen-witness -M <model> -D <input> -O <witness>`
    Witness {
        /// Compiled model path.
        model: PathBuf,
        /// Uploaded input vector path.
        input: PathBuf,
        /// Where the witness is written.
        witness_out: PathBuf,
    },
    /// `prove -M <model> -W <witness> --proof-path <proof> --pk-path <pk>`
    Prove {
        /// Compiled model path.
        model: PathBuf,
        /// Witness produced by the previous stage.
        witness: PathBuf,
        /// Where the proof is written.
        proof_out: PathBuf,
        /// Proving key path.
        proving_key: PathBuf,
    },
    /// `verify --proof-path <proof> --vk-path <vk> --settings-path <settings>`
    Verify {
        /// Proof produced by the previous stage.
        proof: PathBuf,
        /// Verifying key path.
        verifying_key: PathBuf,
        /// Circuit settings path.
        settings: PathBuf,
    },
}

impl StageArgs {
    /// Which pipeline stage this invocation belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            StageArgs::Witness { .. } => Stage::Witness,
            StageArgs::Prove { .. } => Stage::Prove,
            StageArgs::Verify { .. } => Stage::Verify,
        }
    }

    /// Render the engine's argument vector.
    pub fn to_argv(&self) -> Vec<OsString> {
        match self {
            StageArgs::Witness {
                model,
                input,
                witness_out,
            } => vec![
                "gen-witness".into(),
                "-M".into(),
                model.into(),
                "-D".into(),
                input.into(),
                "-O".into(),
                witness_out.into(),
            ],
            StageArgs::Prove {
                model,
                witness,
                proof_out,
                proving_key,
            } => vec![
                "prove".into(),
                "-M".into(),
                model.into(),
                "-W".into(),
                witness.into(),
                "--proof-path".into(),
                proof_out.into(),
                "--pk-path".into(),
                proving_key.into(),
            ],
            StageArgs::Verify {
                proof,
                verifying_key,
                settings,
            } => vec![
                "verify".into(),
                "--proof-path".into(),
                proof.into(),
                "--vk-path".into(),
                verifying_key.into(),
                "--settings-path".into(),
                settings.into(),
            ],
        }
    }
}

pub(crate) mod private {
    /// Sealing marker. Only in-crate runners may implement `StageRunner`.
    pub trait Sealed {}
}

/// Sealed capability for executing one pipeline stage against the engine.
///
/// One invocation per call; no retries, no timeout at this layer. Retry
/// and cancellation policy belong to the orchestrator (and are not
/// exercised — each stage runs exactly once per request).
#[async_trait]
pub trait StageRunner: private::Sealed + Send + Sync {
    /// Run one stage to completion and report its outcome.
    ///
    /// An engine process that exits nonzero resolves to
    /// `Ok(StageResult { success: false, .. })`; `Err` is reserved for
    /// failures to invoke the engine at all.
    async fn execute(&self, args: &StageArgs) -> Result<StageResult, RunnerError>;
}

/// Runs stages by spawning the proving engine binary as a child process.
///
/// Stdout and stderr are captured separately; exit status 0 maps to a
/// successful [`StageResult`] carrying stdout, nonzero to a failed one
/// carrying stderr (or stdout if stderr is empty). The child is awaited
/// without a timeout — a hung engine hangs the stage.
#[derive(Debug, Clone)]
pub struct EzklRunner {
    program: PathBuf,
}

impl EzklRunner {
    /// Create a runner for the given engine binary (name or path).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        EzklRunner {
            program: program.into(),
        }
    }
}

impl private::Sealed for EzklRunner {}

#[async_trait]
impl StageRunner for EzklRunner {
    async fn execute(&self, args: &StageArgs) -> Result<StageResult, RunnerError> {
        let stage = args.stage();
        let argv = args.to_argv();
        tracing::info!(
            stage = %stage,
            program = %self.program.display(),
            "invoking proving engine"
        );

        let output = tokio::process::Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    RunnerError::Spawn {
                        program: self.program.display().to_string(),
                        source: e,
                    }
                }
                _ => RunnerError::Wait(e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let success = output.status.success();
        tracing::info!(
            stage = %stage,
            status = ?output.status.code(),
            success,
            "proving engine exited"
        );

        Ok(StageResult::from_streams(success, stdout, stderr))
    }
}
