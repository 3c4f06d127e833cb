//! # Wallet Provider Capability
//!
//! The five wallet/chain operations the verification lifecycle needs,
//! behind a trait so the concrete transport (an ethers signer, a browser
//! bridge, a test script) is a constructor argument rather than ambient
//! global state.

use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TxHash, U256};
use thiserror::Error;

use crate::network::NetworkDescriptor;

/// EIP-1193 error code for a user-rejected request.
pub const CODE_USER_REJECTED: i64 = 4001;
/// EIP-1193 error code for a chain the wallet does not know.
pub const CODE_CHAIN_NOT_ADDED: i64 = 4902;

/// A wallet/provider operation failure.
///
/// Carries the provider's JSON-RPC error code when one was present, so
/// the lifecycle can classify rejections and unknown-chain errors without
/// knowing the transport.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct WalletError {
    /// Provider error code, when the transport reported one.
    pub code: Option<i64>,
    /// Provider error message.
    pub message: String,
}

impl WalletError {
    /// An error with no code.
    pub fn new(message: impl Into<String>) -> Self {
        WalletError {
            code: None,
            message: message.into(),
        }
    }

    /// An error carrying a provider code.
    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        WalletError {
            code: Some(code),
            message: message.into(),
        }
    }
}

/// Execution outcome of an included-or-expired receipt wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// Included with success status.
    Success,
    /// Included but the call reverted.
    Reverted,
    /// The wait budget expired before inclusion.
    TimedOut,
}

/// Capability over a connected wallet and its chain.
///
/// One implementation per transport: [`EthersWallet`](crate::EthersWallet)
/// for JSON-RPC signers, scripted mocks in tests.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The chain the wallet is currently connected to.
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Register a network with the wallet (`wallet_addEthereumChain`).
    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), WalletError>;

    /// Ask the wallet to switch chains (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Submit the `verifyProof(proof, instances)` transaction and return
    /// its hash immediately, without waiting for inclusion.
    async fn submit_verify_proof(
        &self,
        contract: Address,
        proof: Bytes,
        instances: Vec<U256>,
    ) -> Result<TxHash, WalletError>;

    /// Await the transaction's inclusion receipt with a bounded wait.
    async fn await_receipt(
        &self,
        tx_hash: TxHash,
        wait: Duration,
        confirmations: usize,
    ) -> Result<ReceiptStatus, WalletError>;
}
