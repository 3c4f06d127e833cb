//! # Mock Stage Runner
//!
//! A scripted [`StageRunner`] for tests and local development without the
//! proving engine installed. Outcomes are configured per stage; every
//! invocation is recorded so tests can assert ordering and call counts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use zkml_core::{Stage, StageResult};

use crate::runner::{private, RunnerError, StageArgs, StageRunner};

/// Scripted stage runner.
///
/// Unconfigured stages succeed with a canned output line. When a proof
/// JSON is configured, a successful prove stage writes it to the stage's
/// proof output path, mimicking the engine's artifact side effect.
#[derive(Debug, Default)]
pub struct MockRunner {
    outcomes: Mutex<HashMap<Stage, StageResult>>,
    proof_json: Option<Value>,
    calls: Mutex<Vec<Stage>>,
}

impl MockRunner {
    /// A runner where every stage succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a stage's outcome.
    pub fn with_outcome(self, stage: Stage, result: StageResult) -> Self {
        self.outcomes.lock().unwrap().insert(stage, result);
        self
    }

    /// Script a stage to fail with the given diagnostic text.
    pub fn failing(self, stage: Stage, diagnostic: &str) -> Self {
        self.with_outcome(
            stage,
            StageResult {
                success: false,
                output: diagnostic.to_string(),
            },
        )
    }

    /// Configure the proof JSON a successful prove stage writes.
    pub fn with_proof(mut self, proof: Value) -> Self {
        self.proof_json = Some(proof);
        self
    }

    /// Stages invoked so far, in order.
    pub fn calls(&self) -> Vec<Stage> {
        self.calls.lock().unwrap().clone()
    }
}

impl private::Sealed for MockRunner {}

#[async_trait]
impl StageRunner for MockRunner {
    async fn execute(&self, args: &StageArgs) -> Result<StageResult, RunnerError> {
        let stage = args.stage();
        self.calls.lock().unwrap().push(stage);

        let result = self
            .outcomes
            .lock()
            .unwrap()
            .get(&stage)
            .cloned()
            .unwrap_or_else(|| StageResult {
                success: true,
                output: format!("{stage} ok\n"),
            });

        if result.success {
            if let (StageArgs::Prove { proof_out, .. }, Some(proof)) = (args, &self.proof_json) {
                let bytes = serde_json::to_vec(proof).expect("proof JSON serializes");
                tokio::fs::write(proof_out, bytes)
                    .await
                    .expect("mock proof write");
            }
        }

        Ok(result)
    }
}
