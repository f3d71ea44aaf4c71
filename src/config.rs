// src/config.rs
//! Network configuration for the ledger client.
//!
//! Settings are layered from an optional `did-zksync.toml` file and the process
//! environment (load `.env` with `dotenv` before calling [`Settings::load`]):
//!
//! - `PRIVATE_KEY`: hex-encoded secp256k1 key used to sign ledger writes (optional)
//! - `TESTNET_RPC_URL`: overrides the zkSync Era Sepolia endpoint
//! - `MAINNET_RPC_URL`: overrides the zkSync Era mainnet endpoint

use crate::error::Result;
use crate::identifier::Network;
use ::config::{Config, Environment, File};
use serde::Deserialize;

/// Default RPC endpoint for the testnet.
pub const DEFAULT_TESTNET_RPC_URL: &str = "https://sepolia.era.zksync.dev";
/// Default RPC endpoint for the mainnet.
pub const DEFAULT_MAINNET_RPC_URL: &str = "https://mainnet.era.zksync.io";

/// Name of the optional configuration file, without extension.
pub const CONFIG_FILE: &str = "did-zksync";

/// Connection parameters for one ledger network. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    pub rpc_url: String,
    pub chain_id: u64,
    pub private_key: Option<String>,
}

impl NetworkConfig {
    /// Builds a configuration, falling back to the network's default RPC URL.
    pub fn new(network: Network, rpc_url: Option<String>, private_key: Option<String>) -> Self {
        let rpc_url = rpc_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_rpc_url(network).to_string());
        NetworkConfig {
            network,
            rpc_url,
            chain_id: chain_id(network),
            private_key: private_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

/// Fixed fallback RPC URL per network.
pub fn default_rpc_url(network: Network) -> &'static str {
    match network {
        Network::Testnet => DEFAULT_TESTNET_RPC_URL,
        Network::Mainnet => DEFAULT_MAINNET_RPC_URL,
    }
}

/// EIP-155 chain id per network.
pub fn chain_id(network: Network) -> u64 {
    match network {
        Network::Testnet => 300,
        Network::Mainnet => 324,
    }
}

/// Raw settings as read from file and environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub testnet_rpc_url: Option<String>,
    #[serde(default)]
    pub mainnet_rpc_url: Option<String>,
}

impl Settings {
    /// Loads settings from `did-zksync.toml` (if present) and the environment.
    ///
    /// # Errors
    /// Returns [`crate::Error::Config`] if a source exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::default())
            .build()?;
        Self::from_config(config)
    }

    /// Deserializes settings from an already-built [`Config`].
    pub fn from_config(config: Config) -> Result<Self> {
        Ok(config.try_deserialize()?)
    }

    /// Per-network configurations, testnet first.
    pub fn network_configs(&self) -> Vec<NetworkConfig> {
        vec![
            NetworkConfig::new(
                Network::Testnet,
                self.testnet_rpc_url.clone(),
                self.private_key.clone(),
            ),
            NetworkConfig::new(
                Network::Mainnet,
                self.mainnet_rpc_url.clone(),
                self.private_key.clone(),
            ),
        ]
    }
}
