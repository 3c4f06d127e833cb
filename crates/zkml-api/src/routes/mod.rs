//! # API Route Modules
//!
//! - `proofs` — the proof pipeline surface: multipart upload → pipeline
//!   run, and optional server-side on-chain verification of a returned
//!   proof artifact.
//! - `health` — liveness probe, mounted outside the middleware stack.

pub mod health;
pub mod proofs;
