// src/blockchain/zksync_client.rs
//! zkSync JSON-RPC transport.
//!
//! [`Connector`] and [`LedgerConnection`] are the seam between the ledger client and the
//! network: a connector turns a [`NetworkConfig`] into a connection, and a connection
//! can read the chain height, `eth_call` the registry, and submit signed transactions.
//! [`ZkSyncConnector`] is the production implementation over `ethers` HTTP providers.

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, Bytes, TransactionRequest, H256, U64};
use ethers_core::utils::hex;
use k256::ecdsa::SigningKey;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Execution status of a submitted transaction.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

/// Receipt of a submitted transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: H256,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl TxReceipt {
    /// Maps the EIP-658 status field of a receipt.
    pub fn from_status(tx_hash: H256, status: Option<U64>, block_number: Option<U64>) -> Self {
        let status = match status.map(|s| s.as_u64()) {
            Some(1) => TxStatus::Success,
            Some(_) => TxStatus::Failed,
            None => TxStatus::Pending,
        };
        TxReceipt {
            tx_hash,
            status,
            block_number: block_number.map(|b| b.as_u64()),
        }
    }
}

/// Builds connections to a ledger network.
pub trait Connector: Send + Sync {
    type Connection: LedgerConnection;

    /// Creates a provider (and a signer, when a private key is configured) for `config`.
    /// Liveness is checked by the caller.
    fn connect(
        &self,
        config: &NetworkConfig,
    ) -> impl Future<Output = Result<Self::Connection>> + Send;
}

/// An established connection to one ledger network.
pub trait LedgerConnection: Send + Sync + 'static {
    /// Endpoint this connection talks to.
    fn provider_url(&self) -> &str;

    /// Current block height; used as the liveness probe.
    fn block_number(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Stateless `eth_call` of `data` against `to`.
    fn call(&self, to: Address, data: Bytes) -> impl Future<Output = Result<Bytes>> + Send;

    /// Signs and submits a transaction to `to`, waiting for its receipt.
    fn send(&self, to: Address, data: Bytes) -> impl Future<Output = Result<TxReceipt>> + Send;
}

/// Connector for zkSync Era over HTTP JSON-RPC.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZkSyncConnector;

impl Connector for ZkSyncConnector {
    type Connection = ZkSyncClient;

    async fn connect(&self, config: &NetworkConfig) -> Result<ZkSyncClient> {
        ZkSyncClient::new(config)
    }
}

/// zkSync client holding an HTTP provider and, when a private key is configured,
/// a signing middleware for transactions.
#[derive(Clone)]
pub struct ZkSyncClient {
    /// zkSync RPC provider
    provider: Provider<Http>,
    /// Signer middleware; `None` for read-only connections
    signer: Option<SignerMiddleware<Provider<Http>, LocalWallet>>,
    rpc_url: String,
    network: String,
}

impl ZkSyncClient {
    /// Creates a new zkSync client for `config`.
    ///
    /// # Errors
    /// Returns error if:
    /// - the RPC URL cannot be parsed ([`Error::Connectivity`])
    /// - the private key is not a 32-byte hex secp256k1 scalar ([`Error::InvalidPrivateKey`])
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let provider =
            Provider::<Http>::try_from(config.rpc_url.as_str()).map_err(|e| Error::Connectivity {
                url: config.rpc_url.clone(),
                reason: e.to_string(),
            })?;

        let signer = match &config.private_key {
            Some(key) => {
                let wallet = wallet_from_hex(key)?.with_chain_id(config.chain_id);
                info!(
                    "Signing {} transactions as {:?}",
                    config.network,
                    wallet.address()
                );
                Some(SignerMiddleware::new(provider.clone(), wallet))
            }
            None => None,
        };

        Ok(Self {
            provider,
            signer,
            rpc_url: config.rpc_url.clone(),
            network: config.network.to_string(),
        })
    }

    /// Address transactions are sent from, if this client can sign.
    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }
}

/// Parses a hex private key (with or without `0x`) into a wallet.
pub fn wallet_from_hex(private_key: &str) -> Result<LocalWallet> {
    let key = private_key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    let bytes = hex::decode(key).map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
    let signing_key =
        SigningKey::from_slice(&bytes).map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
    Ok(LocalWallet::from(signing_key))
}

impl LedgerConnection for ZkSyncClient {
    fn provider_url(&self) -> &str {
        &self.rpc_url
    }

    async fn block_number(&self) -> Result<u64> {
        let height = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?;
        Ok(height.as_u64())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        self.provider
            .call(&tx, None)
            .await
            .map_err(|e| Error::Rpc(e.to_string()))
    }

    async fn send(&self, to: Address, data: Bytes) -> Result<TxReceipt> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| Error::MissingSigner(self.network.clone()))?;

        let tx = TransactionRequest::new().to(to).data(data);
        let pending = signer
            .send_transaction(tx, None)
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!("Submitted transaction {tx_hash:?} to {}", self.rpc_url);

        let receipt = pending
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?
            .ok_or(Error::TransactionDropped(tx_hash))?;

        Ok(TxReceipt::from_status(
            receipt.transaction_hash,
            receipt.status,
            receipt.block_number,
        ))
    }
}
