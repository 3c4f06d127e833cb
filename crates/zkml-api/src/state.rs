//! # Application State & Configuration
//!
//! Environment-driven configuration and the shared state handed to every
//! route handler: the proving pipeline and, when chain credentials are
//! configured, a server-side on-chain verifier.

use std::path::PathBuf;
use std::sync::Arc;

use ethers::signers::LocalWallet;
use ethers::types::Address;

use zkml_chain::{ChainVerifier, EthersWallet, NetworkDescriptor, HALO2_VERIFIER_ADDRESS};
use zkml_prover::{ArtifactStore, EzklRunner, Pipeline, StageRunner};

/// Server configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Directory holding the fixed artifacts (model, keys, settings).
    pub artifact_dir: PathBuf,
    /// Root for per-request transient workspaces.
    pub scratch_dir: PathBuf,
    /// Proving engine binary (name or path).
    pub prover_bin: PathBuf,
    /// RPC endpoint for on-chain verification, if configured.
    pub chain_rpc_url: Option<String>,
    /// Hex signing key for on-chain verification, if configured.
    pub chain_private_key: Option<String>,
    /// Verifier contract address.
    pub verifier_address: String,
}

impl AppConfig {
    /// Read configuration from the environment, with local defaults.
    pub fn from_env() -> Self {
        AppConfig {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            artifact_dir: std::env::var("ZKML_ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("zkfiles")),
            scratch_dir: std::env::var("ZKML_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("zkml-gateway")),
            prover_bin: std::env::var("ZKML_PROVER_BIN")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ezkl")),
            chain_rpc_url: std::env::var("CHAIN_RPC_URL").ok(),
            chain_private_key: std::env::var("CHAIN_PRIVATE_KEY").ok(),
            verifier_address: std::env::var("VERIFIER_ADDRESS")
                .unwrap_or_else(|_| HALO2_VERIFIER_ADDRESS.to_string()),
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The proving pipeline.
    pub pipeline: Pipeline,
    /// Server-side on-chain verifier; `None` when no chain credentials
    /// are configured, in which case the on-chain route returns 503.
    pub chain: Option<Arc<ChainVerifier<EthersWallet>>>,
    /// Network the on-chain verifier targets (also used for explorer links).
    pub network: NetworkDescriptor,
}

impl AppState {
    /// Assemble state from configuration, wiring the subprocess runner.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let runner: Arc<dyn StageRunner> = Arc::new(EzklRunner::new(&config.prover_bin));
        Self::with_runner(config, runner)
    }

    /// Assemble state with an explicit runner (tests inject a mock here).
    pub fn with_runner(config: &AppConfig, runner: Arc<dyn StageRunner>) -> anyhow::Result<Self> {
        let store = ArtifactStore::new(&config.artifact_dir, &config.scratch_dir);
        let pipeline = Pipeline::new(store, runner);
        let network = NetworkDescriptor::mantle_sepolia();

        let chain = match (&config.chain_rpc_url, &config.chain_private_key) {
            (Some(rpc), Some(key)) => {
                let wallet: LocalWallet = key
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid CHAIN_PRIVATE_KEY: {e}"))?;
                let contract: Address = config
                    .verifier_address
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid VERIFIER_ADDRESS: {e}"))?;
                let provider = EthersWallet::new(rpc, wallet, network.chain_id)
                    .map_err(|e| anyhow::anyhow!("chain provider setup failed: {e}"))?;
                tracing::info!(contract = %config.verifier_address, "on-chain verifier configured");
                Some(Arc::new(ChainVerifier::new(
                    provider,
                    network.clone(),
                    contract,
                )))
            }
            _ => {
                tracing::warn!(
                    "CHAIN_RPC_URL / CHAIN_PRIVATE_KEY not set; on-chain verification disabled"
                );
                None
            }
        };

        Ok(AppState {
            pipeline,
            chain,
            network,
        })
    }
}
