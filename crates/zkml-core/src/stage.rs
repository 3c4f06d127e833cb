//! # Pipeline Stages
//!
//! The proving pipeline runs exactly three stages, in program order:
//! witness generation, proof generation, proof verification. Witness and
//! prove failures abort the pipeline; a verify failure is recorded but
//! does not stop the response from carrying the proof artifact.

use serde::{Deserialize, Serialize};

/// One stage of the proving pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Generate the witness trace from the input vector.
    Witness,
    /// Generate the zero-knowledge proof from the witness.
    Prove,
    /// Verify the generated proof locally.
    Verify,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Witness, Stage::Prove, Stage::Verify];

    /// Short display name, as shown in the processing-steps UI.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Witness => "Witness Generation",
            Stage::Prove => "Proof Generation",
            Stage::Verify => "Proof Verification",
        }
    }

    /// Human description of what the stage does.
    pub fn description(self) -> &'static str {
        match self {
            Stage::Witness => "Generating witness from input",
            Stage::Prove => "Creating zero-knowledge proof",
            Stage::Verify => "Verifying the generated proof",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Witness => "witness",
            Stage::Prove => "prove",
            Stage::Verify => "verify",
        };
        f.write_str(s)
    }
}

/// Outcome of a single external-engine invocation.
///
/// `output` carries the accumulated stdout on success; on failure it
/// carries the accumulated stderr, falling back to stdout when the process
/// wrote nothing to stderr. A failed stage therefore never reports an
/// empty `output` if the process produced any text at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Captured diagnostic or result text.
    pub output: String,
}

impl StageResult {
    /// Build a result from an exit outcome and the two captured streams.
    pub fn from_streams(success: bool, stdout: String, stderr: String) -> Self {
        let output = if success {
            stdout
        } else if stderr.is_empty() {
            stdout
        } else {
            stderr
        };
        StageResult { success, output }
    }
}

/// A stage paired with its outcome, as collected by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Which stage ran.
    pub stage: Stage,
    /// What the external engine reported.
    pub result: StageResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_in_execution_order() {
        assert_eq!(Stage::ALL, [Stage::Witness, Stage::Prove, Stage::Verify]);
    }

    #[test]
    fn success_result_carries_stdout() {
        let r = StageResult::from_streams(true, "ok\n".into(), "noise\n".into());
        assert!(r.success);
        assert_eq!(r.output, "ok\n");
    }

    #[test]
    fn failure_result_prefers_stderr() {
        let r = StageResult::from_streams(false, "partial\n".into(), "model mismatch\n".into());
        assert!(!r.success);
        assert_eq!(r.output, "model mismatch\n");
    }

    #[test]
    fn failure_result_falls_back_to_stdout_when_stderr_empty() {
        let r = StageResult::from_streams(false, "wrote this before dying".into(), String::new());
        assert_eq!(r.output, "wrote this before dying");
    }

    #[test]
    fn stage_display_is_lowercase() {
        assert_eq!(Stage::Witness.to_string(), "witness");
        assert_eq!(Stage::Prove.to_string(), "prove");
        assert_eq!(Stage::Verify.to_string(), "verify");
    }
}
