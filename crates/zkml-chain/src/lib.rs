//! # zkml-chain — On-Chain Verification Adapter
//!
//! Takes a completed proof artifact, derives the verifier contract call
//! arguments (proof bytes + public-instance integers), ensures the wallet
//! is on the expected network, submits the `verifyProof` transaction, and
//! awaits and classifies the receipt.
//!
//! The wallet is reached only through the [`WalletProvider`] capability,
//! passed in at construction rather than read from ambient state, so the
//! whole lifecycle is testable against a scripted provider.

pub mod ethereum;
pub mod network;
pub mod provider;
pub mod verify;

pub use ethereum::EthersWallet;
pub use network::{NativeCurrency, NetworkDescriptor, HALO2_VERIFIER_ADDRESS};
pub use provider::{ReceiptStatus, WalletError, WalletProvider};
pub use verify::{ChainVerifier, VerificationOutcome, VerifyOutcome, VerifyPhase};
