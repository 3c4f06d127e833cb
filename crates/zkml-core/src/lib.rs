//! # zkml-core — Foundational Types for the zkML Proof Gateway
//!
//! Shared vocabulary between the proving pipeline, the on-chain verifier,
//! and the HTTP surface:
//!
//! - [`Stage`] / [`StageResult`] / [`StageReport`] — the three-stage
//!   pipeline (witness → prove → verify) and its per-stage outcomes.
//! - [`ProofArtifact`] — the proof JSON produced by the external engine,
//!   with typed access to the hex proof string and public instances.
//! - [`Step`] / [`project_steps`] — UI-facing projection of stage state,
//!   recomputed from reports rather than mutated incrementally.
//! - [`normalize_hex_proof`] — idempotent `0x`-prefixing of the proof's
//!   hex byte string.

pub mod hex;
pub mod proof;
pub mod stage;
pub mod steps;

pub use hex::normalize_hex_proof;
pub use proof::{ProofArtifact, ProofArtifactError};
pub use stage::{Stage, StageReport, StageResult};
pub use steps::{project_steps, Step, StepStatus};
