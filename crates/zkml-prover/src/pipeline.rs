//! # Pipeline Orchestrator
//!
//! Sequences the three proving stages with stage-local short-circuiting:
//!
//! 1. Persist the uploaded input into a fresh request workspace.
//! 2. **witness** — fatal on failure.
//! 3. **prove** — fatal on failure.
//! 4. **verify** — recorded, but never gates the response: the proof
//!    artifact is read back and returned regardless, because callers need
//!    it for inspection or on-chain re-verification even when local
//!    verification disagrees.
//! 5. Read back the proof (missing/corrupt ⇒ no proof, not a failure).
//!
//! Stages run strictly in program order; each is awaited to completion
//! before the next begins. Nothing here retries — recovery is the
//! caller's choice.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use zkml_core::{Stage, StageReport, StageResult};

use crate::artifacts::{ArtifactError, ArtifactStore, RequestWorkspace};
use crate::runner::{RunnerError, StageArgs, StageRunner};

/// Fatal pipeline failures.
///
/// Witness and prove failures carry the engine's captured diagnostic
/// text. A verify failure is not an error — see [`PipelineReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The uploaded input is not syntactically valid JSON. No stage runs.
    #[error("input is not valid JSON: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// The witness stage exited nonzero.
    #[error("Failed to generate witness")]
    Witness {
        /// Captured engine diagnostics.
        details: String,
    },

    /// The prove stage exited nonzero.
    #[error("Failed to generate proof")]
    Prove {
        /// Captured engine diagnostics.
        details: String,
    },

    /// Transient artifact I/O failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The engine could not be invoked at all.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

impl PipelineError {
    /// Engine diagnostics attached to the failure, if any.
    pub fn details(&self) -> Option<&str> {
        match self {
            PipelineError::Witness { details } | PipelineError::Prove { details } => {
                Some(details)
            }
            _ => None,
        }
    }
}

/// Normalized outcome of a pipeline run that reached the verify stage.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Identifier of the request workspace this run used.
    pub request_id: Uuid,
    /// Whether local verification succeeded.
    pub verified: bool,
    /// The verify stage's captured output.
    pub verification: String,
    /// The proof artifact read back from the prove stage, if present and
    /// parseable.
    pub proof: Option<serde_json::Value>,
    /// Per-stage outcomes in execution order, for step projection.
    pub stages: Vec<StageReport>,
}

/// Orchestrates one "verify this input" operation.
#[derive(Clone)]
pub struct Pipeline {
    store: ArtifactStore,
    runner: Arc<dyn StageRunner>,
}

impl Pipeline {
    /// Build a pipeline over an artifact store and a stage runner.
    pub fn new(store: ArtifactStore, runner: Arc<dyn StageRunner>) -> Self {
        Pipeline { store, runner }
    }

    /// Run the full pipeline for one uploaded input vector.
    ///
    /// Re-running with identical input is not guaranteed to produce a
    /// byte-identical proof (proving may be non-deterministic) but always
    /// produces the same success/failure classification.
    pub async fn run(&self, input: &[u8]) -> Result<PipelineReport, PipelineError> {
        // Schema beyond "parseable" is the engine's concern; unparsable
        // bytes never reach it.
        serde_json::from_slice::<serde_json::Value>(input)
            .map_err(PipelineError::MalformedInput)?;

        let workspace = self.store.open_workspace().await?;
        let request_id = workspace.request_id();
        workspace.write_input(input).await?;

        let result = self.run_stages(&workspace).await;

        if let Err(e) = workspace.close().await {
            tracing::warn!(request_id = %request_id, error = %e, "workspace cleanup failed");
        }

        result.map(|(verified, verification, proof, stages)| PipelineReport {
            request_id,
            verified,
            verification,
            proof,
            stages,
        })
    }

    async fn run_stages(
        &self,
        workspace: &RequestWorkspace,
    ) -> Result<(bool, String, Option<serde_json::Value>, Vec<StageReport>), PipelineError> {
        let fixed = self.store.fixed();
        let mut stages = Vec::with_capacity(3);

        let witness = self
            .execute_stage(
                &mut stages,
                StageArgs::Witness {
                    model: fixed.model.clone(),
                    input: workspace.input_path(),
                    witness_out: workspace.witness_path(),
                },
            )
            .await?;
        if !witness.success {
            return Err(PipelineError::Witness {
                details: witness.output,
            });
        }

        let prove = self
            .execute_stage(
                &mut stages,
                StageArgs::Prove {
                    model: fixed.model,
                    witness: workspace.witness_path(),
                    proof_out: workspace.proof_path(),
                    proving_key: fixed.proving_key,
                },
            )
            .await?;
        if !prove.success {
            return Err(PipelineError::Prove {
                details: prove.output,
            });
        }

        // Non-fatal: record the outcome and read the proof back either way.
        let verify = self
            .execute_stage(
                &mut stages,
                StageArgs::Verify {
                    proof: workspace.proof_path(),
                    verifying_key: fixed.verifying_key,
                    settings: fixed.settings,
                },
            )
            .await?;

        let proof = workspace.read_proof().await;

        Ok((verify.success, verify.output, proof, stages))
    }

    async fn execute_stage(
        &self,
        stages: &mut Vec<StageReport>,
        args: StageArgs,
    ) -> Result<StageResult, PipelineError> {
        let stage = args.stage();
        let result = self.runner.execute(&args).await?;
        if !result.success {
            tracing::warn!(stage = %stage, output = %result.output, "pipeline stage failed");
        } else {
            tracing::info!(stage = %stage, "pipeline stage completed");
        }
        stages.push(StageReport {
            stage,
            result: result.clone(),
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;
    use serde_json::json;
    use zkml_core::{project_steps, StepStatus};

    const INPUT: &[u8] = br#"{"input_data":[[250.0,45.0,80.0,90.0,30.0]]}"#;

    fn proof_json() -> serde_json::Value {
        json!({
            "hex_proof": "1ec0",
            "pretty_public_inputs": { "inputs": [], "outputs": [["42"]] }
        })
    }

    fn pipeline_with(runner: Arc<MockRunner>) -> (Pipeline, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path().join("zkfiles"), tmp.path().join("scratch"));
        (Pipeline::new(store, runner), tmp)
    }

    #[tokio::test]
    async fn all_stages_succeed() {
        let runner = Arc::new(MockRunner::new().with_proof(proof_json()));
        let (pipeline, _tmp) = pipeline_with(runner.clone());

        let report = pipeline.run(INPUT).await.unwrap();
        assert!(report.verified);
        assert_eq!(report.verification, "verify ok\n");
        assert_eq!(report.proof.unwrap(), proof_json());
        assert_eq!(runner.calls(), vec![Stage::Witness, Stage::Prove, Stage::Verify]);
    }

    #[tokio::test]
    async fn witness_failure_short_circuits() {
        let runner = Arc::new(MockRunner::new().failing(Stage::Witness, "model mismatch"));
        let (pipeline, _tmp) = pipeline_with(runner.clone());

        let err = pipeline.run(INPUT).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate witness");
        assert_eq!(err.details(), Some("model mismatch"));
        // Prove and verify were never invoked.
        assert_eq!(runner.calls(), vec![Stage::Witness]);
    }

    #[tokio::test]
    async fn prove_failure_short_circuits_after_witness() {
        let runner = Arc::new(MockRunner::new().failing(Stage::Prove, "pk unreadable"));
        let (pipeline, _tmp) = pipeline_with(runner.clone());

        let err = pipeline.run(INPUT).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate proof");
        assert_eq!(runner.calls(), vec![Stage::Witness, Stage::Prove]);
    }

    #[tokio::test]
    async fn verify_failure_still_returns_the_proof() {
        let runner = Arc::new(
            MockRunner::new()
                .with_proof(proof_json())
                .failing(Stage::Verify, "constraint unsatisfied"),
        );
        let (pipeline, _tmp) = pipeline_with(runner.clone());

        let report = pipeline.run(INPUT).await.unwrap();
        assert!(!report.verified);
        assert_eq!(report.verification, "constraint unsatisfied");
        // The artifact written by the prove stage comes back verbatim.
        assert_eq!(report.proof.unwrap(), proof_json());
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn missing_proof_file_is_not_a_failure() {
        // No proof JSON configured, so the prove stage writes nothing.
        let runner = Arc::new(MockRunner::new());
        let (pipeline, _tmp) = pipeline_with(runner);

        let report = pipeline.run(INPUT).await.unwrap();
        assert!(report.verified);
        assert!(report.proof.is_none());
    }

    #[tokio::test]
    async fn malformed_input_never_reaches_the_engine() {
        let runner = Arc::new(MockRunner::new());
        let (pipeline, _tmp) = pipeline_with(runner.clone());

        let err = pipeline.run(b"{not json").await.unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput(_)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn classification_is_stable_across_reruns() {
        let runner = Arc::new(MockRunner::new().with_proof(proof_json()));
        let (pipeline, _tmp) = pipeline_with(runner);

        let first = pipeline.run(INPUT).await.unwrap();
        let second = pipeline.run(INPUT).await.unwrap();
        assert_eq!(first.verified, second.verified);
        assert_ne!(first.request_id, second.request_id);
    }

    #[tokio::test]
    async fn stage_reports_project_to_steps() {
        let runner = Arc::new(
            MockRunner::new()
                .with_proof(proof_json())
                .failing(Stage::Verify, "bad proof"),
        );
        let (pipeline, _tmp) = pipeline_with(runner);

        let report = pipeline.run(INPUT).await.unwrap();
        let steps = project_steps(&report.stages, None);
        assert_eq!(steps[0].status, StepStatus::Completed);
        assert_eq!(steps[1].status, StepStatus::Completed);
        assert_eq!(steps[2].status, StepStatus::Error);
    }
}
