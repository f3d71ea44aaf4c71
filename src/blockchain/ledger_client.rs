// src/blockchain/ledger_client.rs
//! Ledger client for the did:zksync registry contract.
//!
//! Owns the per-network configuration and a cache of live connections. Every registry
//! function is exposed as a typed async method:
//!
//! - reads (`get_did`, `get_schema`, `get_credential_definition`, `is_credential_revoked`)
//!   are stateless `eth_call`s and need no signer
//! - writes (`register_did`, `update_did`, `deactivate_did`, `register_schema`,
//!   `add_approved_issuer`, `register_credential_definition`, `revoke_credential`) are
//!   signed, submitted, and block until the receipt is available; a receipt whose status
//!   is not success is a [`Error::TransactionFailed`]
//!
//! Connections are probed with `eth_blockNumber` before first use and cached per network.
//! A probe failure is reported as [`Error::Connectivity`]. A cached connection that fails
//! an RPC request is evicted so the next operation reconnects, and is probed once more so
//! that a dead endpoint is still reported as [`Error::Connectivity`].

use super::zksync_client::{Connector, LedgerConnection, TxReceipt, TxStatus, ZkSyncConnector};
use crate::config::NetworkConfig;
use crate::contracts::{credential_registry, did_registry, ContractCall, REGISTRY_ADDRESS};
use crate::error::{Error, ErrorKind, Result};
use crate::identifier::{self, Network};
use crate::models::anoncreds::SchemaRecord;
use crate::models::did::{DidDocument, DidRecord};
use crate::models::resource::Resource;
use ethers_core::types::{Address, Bytes};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Client for the registry contract across the configured networks.
pub struct LedgerClient<C: Connector = ZkSyncConnector> {
    networks: Vec<NetworkConfig>,
    connector: C,
    connections: RwLock<HashMap<Network, Arc<C::Connection>>>,
}

impl LedgerClient<ZkSyncConnector> {
    /// Creates a client that talks to zkSync over HTTP.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `networks` is empty.
    pub fn new(networks: Vec<NetworkConfig>) -> Result<Self> {
        Self::with_connector(networks, ZkSyncConnector)
    }
}

impl<C: Connector> LedgerClient<C> {
    /// Creates a client with a custom connector.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `networks` is empty.
    pub fn with_connector(networks: Vec<NetworkConfig>, connector: C) -> Result<Self> {
        if networks.is_empty() {
            return Err(Error::Config("at least one network must be configured".into()));
        }
        Ok(Self {
            networks,
            connector,
            connections: RwLock::new(HashMap::new()),
        })
    }

    /// Configuration for `network`, or the first configured network if there is no
    /// exact match.
    pub fn network_config(&self, network: Network) -> &NetworkConfig {
        self.networks
            .iter()
            .find(|config| config.network == network)
            .unwrap_or(&self.networks[0])
    }

    /// Network addressed by a DID or resource id; ids that do not parse fall back to
    /// the first configured network.
    pub fn network_of(&self, id: &str) -> Network {
        identifier::parse(id)
            .map(|parsed| parsed.network)
            .unwrap_or(self.networks[0].network)
    }

    /// Returns a live connection for `network`.
    ///
    /// Reuses a cached connection when one exists; otherwise builds a provider and signer
    /// from the network's configuration and probes liveness by reading the current block
    /// height.
    ///
    /// # Errors
    /// - [`Error::Connectivity`] if the endpoint is unreachable or the probe fails
    /// - [`Error::InvalidPrivateKey`] if the configured key cannot sign
    pub async fn get_connection(&self, network: Network) -> Result<Arc<C::Connection>> {
        let config = self.network_config(network);
        if let Some(connection) = self.connections.read().await.get(&config.network) {
            debug!("Reusing {} connection to {}", config.network, config.rpc_url);
            return Ok(connection.clone());
        }

        let connection = self.connector.connect(config).await?;
        let height = connection
            .block_number()
            .await
            .map_err(|e| Error::Connectivity {
                url: config.rpc_url.clone(),
                reason: e.to_string(),
            })?;
        info!(
            "Connected to {} at {} (block {height})",
            config.network, config.rpc_url
        );

        let connection = Arc::new(connection);
        self.connections
            .write()
            .await
            .insert(config.network, connection.clone());
        Ok(connection)
    }

    /// Drops the cached connection for `network`, if any.
    pub async fn evict(&self, network: Network) {
        let network = self.network_config(network).network;
        if self.connections.write().await.remove(&network).is_some() {
            warn!("Evicted cached {network} connection");
        }
    }

    /// Classifies a request that failed on a cached connection.
    ///
    /// RPC failures evict the connection and re-run the liveness probe on it: an endpoint
    /// that no longer answers is reported as [`Error::Connectivity`], anything else keeps
    /// the original error.
    async fn request_failed(
        &self,
        network: Network,
        connection: &C::Connection,
        err: Error,
    ) -> Error {
        if err.kind() != ErrorKind::Rpc {
            return err;
        }
        self.evict(network).await;
        match connection.block_number().await {
            Ok(_) => err,
            Err(probe) => {
                warn!("{} stopped answering: {probe}", connection.provider_url());
                Error::Connectivity {
                    url: connection.provider_url().to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn read(&self, network: Network, call: ContractCall) -> Result<Bytes> {
        let connection = self.get_connection(network).await?;
        debug!("eth_call {} on {network}", call.function);
        match connection.call(REGISTRY_ADDRESS, call.data).await {
            Ok(output) => Ok(output),
            Err(err) => Err(self.request_failed(network, &connection, err).await),
        }
    }

    async fn write(&self, network: Network, call: ContractCall) -> Result<TxReceipt> {
        let connection = self.get_connection(network).await?;
        debug!("Submitting {} on {network}", call.function);
        let receipt = match connection.send(REGISTRY_ADDRESS, call.data).await {
            Ok(receipt) => receipt,
            Err(err) => return Err(self.request_failed(network, &connection, err).await),
        };

        match receipt.status {
            TxStatus::Success => {
                info!("{} confirmed in {:?}", call.function, receipt.tx_hash);
                Ok(receipt)
            }
            TxStatus::Failed | TxStatus::Pending => Err(Error::TransactionFailed {
                function: call.function,
                tx_hash: receipt.tx_hash,
            }),
        }
    }

    /// Registers `did` with its document under a new version id.
    pub async fn register_did(
        &self,
        did: &str,
        document: &DidDocument,
        version_id: &str,
    ) -> Result<TxReceipt> {
        let result = async {
            let call = did_registry::register_did(did, document, version_id)?;
            self.write(self.network_of(did), call).await
        };
        result.await.map_err(|e| e.during("register DID"))
    }

    /// Replaces the document of an existing `did`.
    pub async fn update_did(
        &self,
        did: &str,
        document: &DidDocument,
        version_id: &str,
    ) -> Result<TxReceipt> {
        let result = async {
            let call = did_registry::update_did(did, document, version_id)?;
            self.write(self.network_of(did), call).await
        };
        result.await.map_err(|e| e.during("update DID"))
    }

    /// Deactivates `did`.
    pub async fn deactivate_did(&self, did: &str) -> Result<TxReceipt> {
        let result = async {
            let call = did_registry::deactivate_did(did)?;
            self.write(self.network_of(did), call).await
        };
        result.await.map_err(|e| e.during("deactivate DID"))
    }

    /// Reads the document registered for `did`.
    ///
    /// Returns `Ok(None)` when the ledger holds nothing for `did`. A malformed stored
    /// payload is not an error: the document comes back empty.
    pub async fn get_did(&self, did: &str) -> Result<Option<DidRecord>> {
        let output = self
            .read(self.network_of(did), did_registry::get_did(did)?)
            .await?;
        did_registry::decode_get_did(did, &output)
    }

    /// Stores a schema resource under `schema_id`.
    pub async fn register_schema<T: Serialize + Clone>(
        &self,
        schema_id: &str,
        resource: &Resource<T>,
    ) -> Result<TxReceipt> {
        let result = async {
            let call = credential_registry::register_schema(schema_id, resource)?;
            self.write(self.network_of(schema_id), call).await
        };
        result.await.map_err(|e| e.during("register schema"))
    }

    /// Approves `issuer` to issue against the schema `schema_id`.
    pub async fn add_approved_issuer(&self, schema_id: &str, issuer: Address) -> Result<TxReceipt> {
        let result = async {
            let call = credential_registry::add_approved_issuer(schema_id, issuer)?;
            self.write(self.network_of(schema_id), call).await
        };
        result.await.map_err(|e| e.during("add approved issuer"))
    }

    /// Reads the schema stored under `schema_id`.
    ///
    /// Returns `Ok(None)` when nothing is stored. A malformed stored resource yields a
    /// schema with empty fields.
    pub async fn get_schema(&self, schema_id: &str) -> Result<Option<SchemaRecord>> {
        let output = self
            .read(
                self.network_of(schema_id),
                credential_registry::get_schema(schema_id)?,
            )
            .await?;
        credential_registry::decode_get_schema(&output)
    }

    /// Stores a credential definition linking `id` to its schema and issuer.
    pub async fn register_credential_definition(
        &self,
        id: &str,
        schema_id: &str,
        issuer_id: &str,
    ) -> Result<TxReceipt> {
        let result = async {
            let call =
                credential_registry::register_credential_definition(id, schema_id, issuer_id)?;
            self.write(self.network_of(id), call).await
        };
        result
            .await
            .map_err(|e| e.during("register credential definition"))
    }

    /// Reads `(schemaId, issuerId)` for the credential definition `id`. Both are empty
    /// when `id` is not registered.
    pub async fn get_credential_definition(&self, id: &str) -> Result<(String, String)> {
        let output = self
            .read(
                self.network_of(id),
                credential_registry::get_credential_definition(id)?,
            )
            .await?;
        credential_registry::decode_get_credential_definition(&output)
    }

    /// Marks `credential_id` as revoked.
    pub async fn revoke_credential(&self, credential_id: &str) -> Result<TxReceipt> {
        let result = async {
            let call = credential_registry::revoke_credential(credential_id)?;
            self.write(self.network_of(credential_id), call).await
        };
        result.await.map_err(|e| e.during("revoke credential"))
    }

    /// Whether `credential_id` has been revoked.
    pub async fn is_credential_revoked(&self, credential_id: &str) -> Result<bool> {
        let output = self
            .read(
                self.network_of(credential_id),
                credential_registry::is_credential_revoked(credential_id)?,
            )
            .await?;
        credential_registry::decode_is_credential_revoked(&output)
    }
}
