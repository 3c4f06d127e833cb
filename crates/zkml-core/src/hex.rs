//! Hex-proof normalization.
//!
//! The external engine emits the proof's byte string sometimes with and
//! sometimes without a `0x` prefix; the on-chain call requires exactly one.

/// Normalize a hex-encoded proof string to a single `0x`-prefixed form.
///
/// Idempotent: an already-prefixed string is returned unchanged, an
/// unprefixed string gains exactly one `0x` prefix.
pub fn normalize_hex_proof(hex_proof: &str) -> String {
    if hex_proof.starts_with("0x") {
        hex_proof.to_string()
    } else {
        format!("0x{hex_proof}")
    }
}
