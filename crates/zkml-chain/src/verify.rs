//! # On-Chain Verification Lifecycle
//!
//! One attempt walks the state machine
//!
//! ```text
//! Idle → CheckingNetwork → (AddingChain → SwitchingChain)?
//!      → Submitting → AwaitingReceipt
//!      → { verified | failed | pending | rejected | error }
//! ```
//!
//! Each call starts fresh from `Idle`; the verifier is reentrant across
//! attempts but holds no internal mutual exclusion — a caller that can
//! trigger concurrent attempts for the same proof must serialize them
//! (e.g. by disabling the triggering control while one is in flight).

use std::str::FromStr;
use std::time::Duration;

use ethers::types::{Address, Bytes, TxHash, U256};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

use zkml_core::{normalize_hex_proof, ProofArtifact};

use crate::network::NetworkDescriptor;
use crate::provider::{
    ReceiptStatus, WalletError, WalletProvider, CODE_CHAIN_NOT_ADDED, CODE_USER_REJECTED,
};

/// Receipt wait budget: five minutes, one confirmation.
const RECEIPT_WAIT: Duration = Duration::from_secs(300);
const CONFIRMATIONS: usize = 1;

/// Where one verification attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyPhase {
    /// No attempt in flight.
    Idle,
    /// Querying the wallet's current chain.
    CheckingNetwork,
    /// Registering the target network with the wallet.
    AddingChain,
    /// Asking the wallet to switch to the target network.
    SwitchingChain,
    /// Submitting the contract call.
    Submitting,
    /// Waiting for the inclusion receipt.
    AwaitingReceipt,
    /// Attempt finished (any terminal outcome).
    Done,
}

impl std::fmt::Display for VerifyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerifyPhase::Idle => "idle",
            VerifyPhase::CheckingNetwork => "checking-network",
            VerifyPhase::AddingChain => "adding-chain",
            VerifyPhase::SwitchingChain => "switching-chain",
            VerifyPhase::Submitting => "submitting",
            VerifyPhase::AwaitingReceipt => "awaiting-receipt",
            VerifyPhase::Done => "done",
        };
        f.write_str(s)
    }
}

/// Terminal classification of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "outcome", content = "detail")]
pub enum VerifyOutcome {
    /// Receipt included with success status.
    Verified,
    /// Receipt included but the verifier rejected the proof.
    Failed,
    /// Wait budget expired; the transaction may still confirm.
    Pending,
    /// The user rejected a wallet prompt (chain add/switch or signing).
    Rejected,
    /// The wallet does not know the target network.
    ChainNotRegistered,
    /// The account cannot pay for the transaction.
    InsufficientFunds,
    /// Anything else, with the raw provider message.
    Error(String),
}

impl VerifyOutcome {
    /// Short user-facing message for this outcome.
    pub fn message(&self) -> String {
        match self {
            VerifyOutcome::Verified => "Proof verified successfully!".to_string(),
            VerifyOutcome::Failed => "Proof verification failed".to_string(),
            VerifyOutcome::Pending => "Transaction pending confirmation".to_string(),
            VerifyOutcome::Rejected => "Transaction rejected".to_string(),
            VerifyOutcome::ChainNotRegistered => {
                "Target network not found in wallet".to_string()
            }
            VerifyOutcome::InsufficientFunds => {
                "Insufficient funds for transaction".to_string()
            }
            VerifyOutcome::Error(msg) => format!("Error verifying proof: {msg}"),
        }
    }
}

/// Result of one verification attempt.
///
/// `transaction_hash` is recorded the moment submission returns and is
/// retained through a later receipt timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    /// Hash of the submitted transaction, if submission happened.
    pub transaction_hash: Option<TxHash>,
    /// Terminal classification.
    pub result: VerifyOutcome,
}

/// Errors deriving contract call arguments from a proof artifact.
#[derive(Debug, Error)]
pub enum CallArgsError {
    /// The hex proof string does not decode to bytes.
    #[error("proof hex is not decodable: {0}")]
    BadHex(String),

    /// The artifact has no public output row.
    #[error("proof artifact has no public outputs")]
    MissingOutputs,

    /// A public output scalar is neither decimal nor hex.
    #[error("public output is not an integer: {0}")]
    BadScalar(String),
}

/// Derive `(proof_bytes, instances)` for the `verifyProof` call.
///
/// The hex proof is normalized to a single `0x` prefix first; the
/// instances are the first public output row, each scalar parsed as a
/// decimal or `0x`-hex unsigned 256-bit integer.
pub fn call_args(artifact: &ProofArtifact) -> Result<(Bytes, Vec<U256>), CallArgsError> {
    let normalized = normalize_hex_proof(&artifact.hex_proof);
    let proof_bytes =
        Bytes::from_str(&normalized).map_err(|e| CallArgsError::BadHex(e.to_string()))?;

    let row = artifact
        .first_output_row()
        .map_err(|_| CallArgsError::MissingOutputs)?;
    let instances = row
        .iter()
        .map(|scalar| parse_instance(scalar))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((proof_bytes, instances))
}

fn parse_instance(scalar: &str) -> Result<U256, CallArgsError> {
    let s = scalar.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x") {
        U256::from_str_radix(hex, 16).ok()
    } else {
        U256::from_dec_str(s).ok()
    };
    parsed.ok_or_else(|| CallArgsError::BadScalar(scalar.to_string()))
}

/// Classify a wallet error by its code and message.
fn classify(e: &WalletError) -> VerifyOutcome {
    let msg = e.message.to_ascii_lowercase();
    match e.code {
        Some(CODE_USER_REJECTED) => VerifyOutcome::Rejected,
        Some(CODE_CHAIN_NOT_ADDED) => VerifyOutcome::ChainNotRegistered,
        _ if msg.contains("user rejected") => VerifyOutcome::Rejected,
        _ if msg.contains("insufficient funds") => VerifyOutcome::InsufficientFunds,
        _ => VerifyOutcome::Error(e.message.clone()),
    }
}

/// Drives one proof through on-chain verification.
pub struct ChainVerifier<P: WalletProvider> {
    provider: P,
    network: NetworkDescriptor,
    contract: Address,
    receipt_wait: Duration,
    phases: Option<watch::Sender<VerifyPhase>>,
}

impl<P: WalletProvider> ChainVerifier<P> {
    /// Build a verifier over an explicit provider, network, and contract.
    pub fn new(provider: P, network: NetworkDescriptor, contract: Address) -> Self {
        ChainVerifier {
            provider,
            network,
            contract,
            receipt_wait: RECEIPT_WAIT,
            phases: None,
        }
    }

    /// Observe phase transitions through a watch channel.
    pub fn with_phase_channel(mut self, phases: watch::Sender<VerifyPhase>) -> Self {
        self.phases = Some(phases);
        self
    }

    /// Override the receipt wait budget (tests).
    pub fn with_receipt_wait(mut self, wait: Duration) -> Self {
        self.receipt_wait = wait;
        self
    }

    fn set_phase(&self, phase: VerifyPhase) {
        tracing::info!(phase = %phase, chain_id = self.network.chain_id, "verification phase");
        if let Some(tx) = &self.phases {
            let _ = tx.send(phase);
        }
    }

    /// Run one verification attempt for a proof artifact.
    pub async fn verify(&self, artifact: &ProofArtifact) -> VerificationOutcome {
        let outcome = self.verify_inner(artifact).await;
        self.set_phase(VerifyPhase::Done);
        tracing::info!(
            result = ?outcome.result,
            tx = ?outcome.transaction_hash,
            "verification attempt finished"
        );
        outcome
    }

    async fn verify_inner(&self, artifact: &ProofArtifact) -> VerificationOutcome {
        let (proof_bytes, instances) = match call_args(artifact) {
            Ok(args) => args,
            Err(e) => {
                return VerificationOutcome {
                    transaction_hash: None,
                    result: VerifyOutcome::Error(e.to_string()),
                }
            }
        };

        self.set_phase(VerifyPhase::CheckingNetwork);
        if let Err(e) = self.ensure_network().await {
            return VerificationOutcome {
                transaction_hash: None,
                result: classify(&e),
            };
        }

        self.set_phase(VerifyPhase::Submitting);
        let tx_hash = match self
            .provider
            .submit_verify_proof(self.contract, proof_bytes, instances)
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                return VerificationOutcome {
                    transaction_hash: None,
                    result: classify(&e),
                }
            }
        };
        tracing::info!(tx = %tx_hash, url = %self.network.tx_url(&format!("{tx_hash:?}")), "transaction submitted");

        self.set_phase(VerifyPhase::AwaitingReceipt);
        let result = match self
            .provider
            .await_receipt(tx_hash, self.receipt_wait, CONFIRMATIONS)
            .await
        {
            Ok(ReceiptStatus::Success) => VerifyOutcome::Verified,
            Ok(ReceiptStatus::Reverted) => VerifyOutcome::Failed,
            Ok(ReceiptStatus::TimedOut) => VerifyOutcome::Pending,
            Err(e) => classify(&e),
        };

        // The hash survives every post-submission outcome, timeout included.
        VerificationOutcome {
            transaction_hash: Some(tx_hash),
            result,
        }
    }

    /// Make sure the wallet is on the target chain, registering it first
    /// if needed. Add is always attempted before switch, matching the
    /// wallet prompt flow; a rejection at either step surfaces unchanged.
    async fn ensure_network(&self) -> Result<(), WalletError> {
        let current = self.provider.chain_id().await?;
        if current == self.network.chain_id {
            return Ok(());
        }
        tracing::info!(
            current_chain = current,
            target_chain = self.network.chain_id,
            "wallet on wrong network"
        );

        self.set_phase(VerifyPhase::AddingChain);
        self.provider.add_chain(&self.network).await?;

        self.set_phase(VerifyPhase::SwitchingChain);
        self.provider.switch_chain(self.network.chain_id).await
    }
}
