//! # Proof Artifact Model
//!
//! The external engine writes the proof as a JSON document. The pipeline
//! treats it as opaque (it is returned to the caller verbatim); the
//! on-chain adapter needs two pieces of structure out of it: the
//! hex-encoded proof byte string and the first row of public outputs.
//!
//! The model is deliberately tolerant — unknown fields are preserved via
//! `#[serde(flatten)]` so nothing the engine produced is dropped on a
//! decode/encode round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors reading structure out of a proof artifact.
#[derive(Debug, Error)]
pub enum ProofArtifactError {
    /// The artifact is not the JSON shape the engine produces.
    #[error("malformed proof artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The artifact has no public output row to use as contract instances.
    #[error("proof artifact has no public outputs")]
    MissingOutputs,
}

/// The structured public-inputs section of the proof JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrettyPublicInputs {
    /// Rows of public input scalars, as decimal or hex strings.
    #[serde(default)]
    pub inputs: Vec<Vec<String>>,
    /// Rows of public output scalars; the first row is the instance vector.
    #[serde(default)]
    pub outputs: Vec<Vec<String>>,
    /// Fields the engine emits that this gateway does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A proof document produced by the prove stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofArtifact {
    /// Hex-encoded proof bytes, with or without a `0x` prefix.
    pub hex_proof: String,
    /// Structured public inputs/outputs.
    pub pretty_public_inputs: PrettyPublicInputs,
    /// Everything else the engine emitted, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ProofArtifact {
    /// Parse an artifact out of a raw proof JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ProofArtifactError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// The instance vector for on-chain verification: the first row of the
    /// public outputs.
    pub fn first_output_row(&self) -> Result<&[String], ProofArtifactError> {
        self.pretty_public_inputs
            .outputs
            .first()
            .map(Vec::as_slice)
            .ok_or(ProofArtifactError::MissingOutputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "hex_proof": "0abc",
            "pretty_public_inputs": {
                "inputs": [["250.0", "45.0"]],
                "outputs": [["0x1a", "42"]],
                "rescaled_outputs": [["0.42"]]
            },
            "transcript_type": "EVM"
        })
    }

    #[test]
    fn parses_engine_shape() {
        let artifact = ProofArtifact::from_value(&sample()).unwrap();
        assert_eq!(artifact.hex_proof, "0abc");
        assert_eq!(artifact.first_output_row().unwrap(), ["0x1a", "42"]);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let value = sample();
        let artifact = ProofArtifact::from_value(&value).unwrap();
        let back = serde_json::to_value(&artifact).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn missing_outputs_is_an_error() {
        let value = json!({
            "hex_proof": "ff",
            "pretty_public_inputs": { "inputs": [], "outputs": [] }
        });
        let artifact = ProofArtifact::from_value(&value).unwrap();
        assert!(matches!(
            artifact.first_output_row(),
            Err(ProofArtifactError::MissingOutputs)
        ));
    }

    #[test]
    fn missing_hex_proof_is_malformed() {
        let value = json!({ "pretty_public_inputs": { "outputs": [["1"]] } });
        assert!(matches!(
            ProofArtifact::from_value(&value),
            Err(ProofArtifactError::Malformed(_))
        ));
    }
}
