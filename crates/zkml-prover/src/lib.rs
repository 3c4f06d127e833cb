//! # zkml-prover — Proving Pipeline
//!
//! Drives the external proving engine through its three-stage contract
//! (witness → prove → verify) and manages the filesystem artifacts each
//! stage consumes and produces.
//!
//! ## Architecture
//!
//! - [`ArtifactStore`] resolves the fixed, read-only artifacts (compiled
//!   model, settings, proving key, verifying key) and opens a per-request
//!   [`RequestWorkspace`] keyed by a generated identifier, so concurrent
//!   requests never share transient files.
//! - [`StageRunner`] is the sealed capability boundary to the engine: one
//!   `execute` call per stage. [`EzklRunner`] spawns the engine binary as a
//!   child process; [`MockRunner`] scripts outcomes for tests.
//! - [`Pipeline`] sequences the stages with stage-local short-circuiting
//!   and composes the normalized report.

pub mod artifacts;
pub mod mock;
pub mod pipeline;
pub mod runner;

pub use artifacts::{ArtifactError, ArtifactStore, FixedArtifacts, RequestWorkspace};
pub use mock::MockRunner;
pub use pipeline::{Pipeline, PipelineError, PipelineReport};
pub use runner::{EzklRunner, RunnerError, StageArgs, StageRunner};
