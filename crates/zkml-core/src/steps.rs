//! # UI Step Projection
//!
//! Clients render the pipeline as a list of steps. Rather than mirroring
//! the orchestrator's state machine with a second, incrementally-mutated
//! copy, the step list is a pure function of the stage reports: recompute
//! it from each response and the two can never diverge.

use serde::{Deserialize, Serialize};

use crate::stage::{Stage, StageReport};

/// Display status of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// Not yet reached.
    Pending,
    /// Currently executing.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Failed; terminal for this run.
    Error,
}

/// One UI-facing pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Display name.
    pub name: String,
    /// Human description of the work.
    pub description: String,
    /// Current status.
    pub status: StepStatus,
}

/// Project stage reports into the three-step UI list.
///
/// Stages with a successful report project as `Completed`, a failed report
/// as `Error`, the stage named in `active` (if any, and unreported) as
/// `InProgress`, and everything else as `Pending`. A fresh run with no
/// reports and no active stage projects all steps as `Pending`.
pub fn project_steps(reports: &[StageReport], active: Option<Stage>) -> Vec<Step> {
    Stage::ALL
        .iter()
        .map(|&stage| {
            let status = match reports.iter().find(|r| r.stage == stage) {
                Some(report) if report.result.success => StepStatus::Completed,
                Some(_) => StepStatus::Error,
                None if active == Some(stage) => StepStatus::InProgress,
                None => StepStatus::Pending,
            };
            Step {
                name: stage.name().to_string(),
                description: stage.description().to_string(),
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageResult;

    fn report(stage: Stage, success: bool) -> StageReport {
        StageReport {
            stage,
            result: StageResult {
                success,
                output: String::new(),
            },
        }
    }

    #[test]
    fn fresh_run_is_all_pending() {
        let steps = project_steps(&[], None);
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn witness_failure_leaves_later_stages_pending() {
        let steps = project_steps(&[report(Stage::Witness, false)], None);
        assert_eq!(steps[0].status, StepStatus::Error);
        assert_eq!(steps[1].status, StepStatus::Pending);
        assert_eq!(steps[2].status, StepStatus::Pending);
    }

    #[test]
    fn active_stage_projects_in_progress() {
        let steps = project_steps(&[report(Stage::Witness, true)], Some(Stage::Prove));
        assert_eq!(steps[0].status, StepStatus::Completed);
        assert_eq!(steps[1].status, StepStatus::InProgress);
        assert_eq!(steps[2].status, StepStatus::Pending);
    }

    #[test]
    fn full_success_is_all_completed() {
        let reports: Vec<_> = Stage::ALL.iter().map(|&s| report(s, true)).collect();
        let steps = project_steps(&reports, None);
        assert!(steps.iter().all(|s| s.status == StepStatus::Completed));
    }

    #[test]
    fn verify_failure_keeps_earlier_completions() {
        let reports = vec![
            report(Stage::Witness, true),
            report(Stage::Prove, true),
            report(Stage::Verify, false),
        ];
        let steps = project_steps(&reports, None);
        assert_eq!(steps[0].status, StepStatus::Completed);
        assert_eq!(steps[1].status, StepStatus::Completed);
        assert_eq!(steps[2].status, StepStatus::Error);
    }

    #[test]
    fn step_names_match_stage_names() {
        let steps = project_steps(&[], None);
        assert_eq!(steps[0].name, "Witness Generation");
        assert_eq!(steps[1].description, "Creating zero-knowledge proof");
    }
}
