//! # Target Network Descriptor
//!
//! Everything a wallet needs to register and switch to the verification
//! network: chain identifier, display name, native currency metadata, RPC
//! endpoint, and block-explorer URL (EIP-3085 `wallet_addEthereumChain`
//! parameter shape).

use serde::{Deserialize, Serialize};

/// Deployed Halo2 verifier contract on Mantle Sepolia.
pub const HALO2_VERIFIER_ADDRESS: &str = "0x05471a914D01A4aF5E91Ede5CaBfC4AfE33a0c3e";

/// Native currency metadata for wallet registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
}

/// A chain the adapter can register with a wallet and verify against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// Numeric chain identifier.
    pub chain_id: u64,
    /// Human-readable chain name.
    pub name: String,
    /// Native currency metadata.
    pub native_currency: NativeCurrency,
    /// RPC endpoint.
    pub rpc_url: String,
    /// Block-explorer base URL.
    pub explorer_url: String,
}

impl NetworkDescriptor {
    /// The Mantle Sepolia testnet, where the verifier contract lives.
    pub fn mantle_sepolia() -> Self {
        NetworkDescriptor {
            chain_id: 5003,
            name: "Mantle Sepolia Testnet".to_string(),
            native_currency: NativeCurrency {
                name: "Mantle Sepolia".to_string(),
                symbol: "MNT".to_string(),
                decimals: 18,
            },
            rpc_url: "https://rpc.sepolia.mantle.xyz".to_string(),
            explorer_url: "https://explorer.sepolia.mantle.xyz".to_string(),
        }
    }

    /// The chain id in the `0x`-prefixed hex form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    /// Block-explorer URL for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}
