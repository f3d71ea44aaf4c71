// src/services/registrar.rs
//! DID registrar for `did:zksync`.
//!
//! Turns DID Documents and resources into ledger writes and reports each write as a
//! `didState` envelope (`finished` or `failed` with a reason). Only DID Documents can
//! be updated or deactivated; resources are immutable once created.

use crate::blockchain::ledger_client::LedgerClient;
use crate::blockchain::zksync_client::{Connector, TxReceipt, ZkSyncConnector};
use crate::error::Result;
use crate::identifier::{self, DidUrlKind, Network};
use crate::models::anoncreds::{CredentialDefinitionBody, RegistrationState};
use crate::models::did::DidDocument;
use crate::models::resource::{Resource, ResourceType};
use ethers_core::types::Address;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a registrar write.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidState {
    pub state: RegistrationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document: Option<DidDocument>,
}

/// Envelope returned by every registrar operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidOperationResult {
    pub did_state: DidState,
    pub did_registration_metadata: Map<String, Value>,
    pub did_document_metadata: Map<String, Value>,
}

impl DidOperationResult {
    fn finished(did: &str, document: Option<DidDocument>, receipt: &TxReceipt) -> Self {
        let mut registration = Map::new();
        registration.insert("transactionHash".into(), json!(receipt.tx_hash));
        DidOperationResult {
            did_state: DidState {
                state: RegistrationState::Finished,
                did: Some(did.to_string()),
                reason: None,
                did_document: document,
            },
            did_registration_metadata: registration,
            did_document_metadata: Map::new(),
        }
    }

    fn failed(did: Option<&str>, reason: impl Into<String>) -> Self {
        DidOperationResult {
            did_state: DidState {
                state: RegistrationState::Failed,
                did: did.map(str::to_string),
                reason: Some(reason.into()),
                did_document: None,
            },
            did_registration_metadata: Map::new(),
            did_document_metadata: Map::new(),
        }
    }

    fn from_write(did: &str, document: Option<DidDocument>, write: Result<TxReceipt>) -> Self {
        match write {
            Ok(receipt) => {
                info!("Registered {did}");
                Self::finished(did, document, &receipt)
            }
            Err(err) => {
                warn!("Registration of {did} failed: {err}");
                Self::failed(Some(did), err.to_string())
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.did_state.state == RegistrationState::Finished
    }
}

/// Input of [`DidRegistrar::create`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidCreateOptions {
    pub network: Network,
    /// DID to register; minted from a fresh UUID when absent
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default)]
    pub document: Option<DidDocument>,
}

/// Writes DIDs and resources to the registry contract.
pub struct DidRegistrar<C: Connector = ZkSyncConnector> {
    ledger: Arc<LedgerClient<C>>,
}

impl<C: Connector> DidRegistrar<C> {
    pub fn new(ledger: Arc<LedgerClient<C>>) -> Self {
        DidRegistrar { ledger }
    }

    /// Registers a new DID with its document.
    pub async fn create(&self, options: DidCreateOptions) -> DidOperationResult {
        let did = options
            .did
            .clone()
            .or_else(|| {
                options
                    .document
                    .as_ref()
                    .map(|doc| doc.id.clone())
                    .filter(|id| !id.is_empty())
            })
            .unwrap_or_else(|| identifier::format_did(options.network, &Uuid::new_v4().to_string()));

        if let Err(reason) = bare_did(&did) {
            return DidOperationResult::failed(Some(&did), reason);
        }

        let document = match options.document {
            Some(mut document) => {
                document.id = did.clone();
                document
            }
            None => DidDocument::new(&did),
        };
        let version_id = Uuid::new_v4().to_string();
        let write = self.ledger.register_did(&did, &document, &version_id).await;
        DidOperationResult::from_write(&did, Some(document), write)
    }

    /// Replaces the document of an existing DID.
    pub async fn update(&self, did: &str, document: DidDocument) -> DidOperationResult {
        if let Err(reason) = bare_did(did) {
            return DidOperationResult::failed(Some(did), reason);
        }
        let document = DidDocument {
            id: did.to_string(),
            ..document
        };
        let version_id = Uuid::new_v4().to_string();
        let write = self.ledger.update_did(did, &document, &version_id).await;
        DidOperationResult::from_write(did, Some(document), write)
    }

    /// Deactivates a DID.
    pub async fn deactivate(&self, did: &str) -> DidOperationResult {
        if let Err(reason) = bare_did(did) {
            return DidOperationResult::failed(Some(did), reason);
        }
        let write = self.ledger.deactivate_did(did).await;
        DidOperationResult::from_write(did, None, write)
    }

    /// Persists a resource at `resource_path` (`<issuerDid>/resources/<id>`).
    ///
    /// Schemas are stored through `registerSchema`; other resource types have a
    /// dedicated operation or no ledger support and fail here.
    pub async fn create_resource<T: Serialize + Clone>(
        &self,
        resource_path: &str,
        resource: &Resource<T>,
    ) -> DidOperationResult {
        if let Err(reason) = resource_address(resource_path) {
            return DidOperationResult::failed(Some(resource_path), reason);
        }
        match resource.resource_type {
            ResourceType::AnonCredsSchema => {
                let write = self.ledger.register_schema(resource_path, resource).await;
                DidOperationResult::from_write(resource_path, None, write)
            }
            other => DidOperationResult::failed(
                Some(resource_path),
                format!("resources of type {other} cannot be created with create_resource"),
            ),
        }
    }

    /// Persists a credential definition under `id` (`<issuerDid>/resources/<id>`).
    pub async fn create_credential_definition(
        &self,
        id: &str,
        resource: &Resource<CredentialDefinitionBody>,
    ) -> DidOperationResult {
        if let Err(reason) = resource_address(id) {
            return DidOperationResult::failed(Some(id), reason);
        }
        let write = self
            .ledger
            .register_credential_definition(id, &resource.data.schema_id, &resource.data.issuer_id)
            .await;
        DidOperationResult::from_write(id, None, write)
    }

    /// Approves `issuer` to issue credentials against `schema_id`.
    pub async fn approve_issuer(&self, schema_id: &str, issuer: Address) -> DidOperationResult {
        let write = self.ledger.add_approved_issuer(schema_id, issuer).await;
        DidOperationResult::from_write(schema_id, None, write)
    }
}

fn bare_did(did: &str) -> std::result::Result<(), String> {
    match identifier::parse(did) {
        Some(parsed) if parsed.kind() == DidUrlKind::Did && parsed.did == did => Ok(()),
        _ => Err(format!("{did} is not a valid did:zksync DID")),
    }
}

fn resource_address(path: &str) -> std::result::Result<(), String> {
    match identifier::parse(path).map(|parsed| parsed.kind()) {
        Some(DidUrlKind::Resource(_)) => Ok(()),
        _ => Err(format!("{path} is not a valid resource address")),
    }
}
