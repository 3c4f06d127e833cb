//! # Ethers-Backed Wallet Provider
//!
//! [`WalletProvider`] over an ethers JSON-RPC provider with a local
//! signer. Chain registration and switching are issued as raw
//! `wallet_addEthereumChain` / `wallet_switchEthereumChain` requests;
//! bare RPC nodes that do not implement them fail with an error the
//! lifecycle classifies like any other provider error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{
    Http, Middleware, MiddlewareError, PendingTransaction, Provider, ProviderError, RpcError,
};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, TxHash, U256, U64};

use crate::network::NetworkDescriptor;
use crate::provider::{ReceiptStatus, WalletError, WalletProvider};

abigen!(
    Halo2Verifier,
    r"[
        function verifyProof(bytes proof, uint256[] instances) returns (bool)
    ]"
);

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Wallet provider backed by an HTTP JSON-RPC endpoint and a local key.
#[derive(Debug, Clone)]
pub struct EthersWallet {
    provider: Provider<Http>,
    client: Arc<Client>,
}

impl EthersWallet {
    /// Connect to an RPC endpoint with a signing key bound to a chain id.
    pub fn new(rpc_url: &str, key: LocalWallet, chain_id: u64) -> Result<Self, WalletError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| WalletError::new(format!("invalid RPC url {rpc_url}: {e}")))?;
        let client = Arc::new(SignerMiddleware::new(
            provider.clone(),
            key.with_chain_id(chain_id),
        ));
        Ok(EthersWallet { provider, client })
    }

    /// The signing account's address.
    pub fn address(&self) -> Address {
        self.client.signer().address()
    }
}

fn from_provider(e: ProviderError) -> WalletError {
    match RpcError::as_error_response(&e) {
        Some(rpc) => WalletError::with_code(rpc.code, rpc.message.clone()),
        None => WalletError::new(e.to_string()),
    }
}

fn from_contract(e: ethers::contract::ContractError<Client>) -> WalletError {
    if let Some(rpc) = e.as_middleware_error().and_then(|m| m.as_error_response()) {
        return WalletError::with_code(rpc.code, rpc.message.clone());
    }
    WalletError::new(e.to_string())
}

#[async_trait]
impl WalletProvider for EthersWallet {
    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.provider
            .get_chainid()
            .await
            .map(|id| id.as_u64())
            .map_err(from_provider)
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), WalletError> {
        // EIP-3085 parameter object.
        let params = serde_json::json!([{
            "chainId": network.chain_id_hex(),
            "chainName": network.name,
            "nativeCurrency": {
                "name": network.native_currency.name,
                "symbol": network.native_currency.symbol,
                "decimals": network.native_currency.decimals,
            },
            "rpcUrls": [network.rpc_url],
            "blockExplorerUrls": [network.explorer_url],
        }]);
        self.provider
            .request::<_, serde_json::Value>("wallet_addEthereumChain", params)
            .await
            .map(|_| ())
            .map_err(from_provider)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let params = serde_json::json!([{ "chainId": format!("0x{chain_id:x}") }]);
        self.provider
            .request::<_, serde_json::Value>("wallet_switchEthereumChain", params)
            .await
            .map(|_| ())
            .map_err(from_provider)
    }

    async fn submit_verify_proof(
        &self,
        contract: Address,
        proof: Bytes,
        instances: Vec<U256>,
    ) -> Result<TxHash, WalletError> {
        let verifier = Halo2Verifier::new(contract, self.client.clone());
        let call = verifier.verify_proof(proof, instances);
        let pending = call.send().await.map_err(from_contract)?;
        Ok(pending.tx_hash())
    }

    async fn await_receipt(
        &self,
        tx_hash: TxHash,
        wait: Duration,
        confirmations: usize,
    ) -> Result<ReceiptStatus, WalletError> {
        let pending = PendingTransaction::new(tx_hash, &self.provider).confirmations(confirmations);
        match tokio::time::timeout(wait, pending).await {
            Err(_) => Ok(ReceiptStatus::TimedOut),
            Ok(Err(e)) => Err(from_provider(e)),
            Ok(Ok(None)) => Err(WalletError::new("transaction dropped from the mempool")),
            Ok(Ok(Some(receipt))) => {
                if receipt.status == Some(U64::one()) {
                    Ok(ReceiptStatus::Success)
                } else {
                    Ok(ReceiptStatus::Reverted)
                }
            }
        }
    }
}
