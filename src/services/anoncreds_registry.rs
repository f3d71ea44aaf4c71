// src/services/anoncreds_registry.rs
//! AnonCreds registry backed by the did:zksync resolver and registrar.
//!
//! Maps AnonCreds schema and credential-definition operations onto resource resolution
//! and resource registration. Every operation returns `Result<_, Error>`:
//!
//! - lookups always return `Ok`; a miss or a ledger failure is reported through
//!   `resolutionMetadata.error = "notFound"`
//! - registrations always return `Ok`; a failed write is reported through
//!   `state = "failed"` with a reason
//! - revocation registries and status lists have no ledger support and return
//!   [`Error::NotImplemented`]

use super::registrar::DidRegistrar;
use super::resolver::DidResolver;
use crate::blockchain::ledger_client::LedgerClient;
use crate::blockchain::zksync_client::{Connector, ZkSyncConnector};
use crate::error::{Error, Result};
use crate::identifier::{self, DidUrlKind, Network};
use crate::models::anoncreds::{
    CredentialDefinition, CredentialDefinitionBody, CredentialDefinitionState,
    CredentialDefinitionValue, GetCredentialDefinitionReturn, GetSchemaReturn,
    RegisterCredentialDefinitionOptions, RegisterCredentialDefinitionReturn,
    RegisterSchemaOptions, RegisterSchemaReturn, RegistrationState, Schema, SchemaState,
    CL_SIGNATURE_TYPE,
};
use crate::models::resolution::ResolutionMetadata;
use crate::models::resource::{Resource, ResourceType};
use log::{debug, info};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Version recorded on credential definition resources.
pub const CREDENTIAL_DEFINITION_RESOURCE_VERSION: &str = "1.0";

/// Supplies the cryptographic part of credential definitions read from the ledger.
///
/// The ledger only stores `(schemaId, issuerId)` for a credential definition; the tag
/// and public key material come from this source.
pub trait CredentialDefinitionMaterial: Send + Sync {
    fn credential_definition(
        &self,
        id: &str,
        schema_id: &str,
        issuer_id: &str,
    ) -> CredentialDefinition;
}

/// Placeholder material: `type = "CL"`, tag `default`, and a `primary` value that only
/// carries `{"name": "primary"}`. Not usable for issuance or verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderMaterial;

impl CredentialDefinitionMaterial for PlaceholderMaterial {
    fn credential_definition(
        &self,
        _id: &str,
        schema_id: &str,
        issuer_id: &str,
    ) -> CredentialDefinition {
        CredentialDefinition {
            issuer_id: issuer_id.to_string(),
            schema_id: schema_id.to_string(),
            type_: CL_SIGNATURE_TYPE.to_string(),
            tag: "default".to_string(),
            value: CredentialDefinitionValue {
                primary: json!({ "name": "primary" }),
                revocation: None,
            },
        }
    }
}

/// AnonCreds registry for `did:zksync` identifiers.
pub struct AnonCredsRegistry<C: Connector = ZkSyncConnector> {
    resolver: Arc<DidResolver<C>>,
    registrar: Arc<DidRegistrar<C>>,
    ledger: Arc<LedgerClient<C>>,
    material: Arc<dyn CredentialDefinitionMaterial>,
}

impl<C: Connector> AnonCredsRegistry<C> {
    pub fn new(
        resolver: Arc<DidResolver<C>>,
        registrar: Arc<DidRegistrar<C>>,
        ledger: Arc<LedgerClient<C>>,
    ) -> Self {
        Self::with_material(resolver, registrar, ledger, Arc::new(PlaceholderMaterial))
    }

    pub fn with_material(
        resolver: Arc<DidResolver<C>>,
        registrar: Arc<DidRegistrar<C>>,
        ledger: Arc<LedgerClient<C>>,
        material: Arc<dyn CredentialDefinitionMaterial>,
    ) -> Self {
        AnonCredsRegistry {
            resolver,
            registrar,
            ledger,
            material,
        }
    }

    /// Whether `identifier` belongs to this registry's DID method.
    pub fn supports_identifier(&self, identifier: &str) -> bool {
        identifier::parse(identifier).is_some()
    }

    /// Looks up a schema by its resource id.
    pub async fn get_schema(&self, schema_id: &str) -> Result<GetSchemaReturn> {
        let resolution = self.resolver.resolve_resource(schema_id).await;
        let envelope = match resolution.did_document {
            Some(record) => GetSchemaReturn {
                schema: Some(record.schema),
                schema_id: schema_id.to_string(),
                resolution_metadata: ResolutionMetadata::default(),
                schema_metadata: Map::new(),
            },
            None => {
                let message = resolution
                    .did_resolution_metadata
                    .message
                    .unwrap_or_else(|| format!("schema {schema_id} not found"));
                debug!("Schema {schema_id} unavailable: {message}");
                GetSchemaReturn {
                    schema: None,
                    schema_id: schema_id.to_string(),
                    resolution_metadata: ResolutionMetadata::not_found(message),
                    schema_metadata: Map::new(),
                }
            }
        };
        Ok(envelope)
    }

    /// Registers a schema as a new resource of its issuer.
    pub async fn register_schema(
        &self,
        options: RegisterSchemaOptions,
    ) -> Result<RegisterSchemaReturn> {
        let schema = options.schema;
        let network = match issuer_network(&schema.issuer_id) {
            Ok(network) => network,
            Err(reason) => return Ok(schema_failed(schema, reason)),
        };

        let resource_id = Uuid::new_v4().to_string();
        let path = identifier::resource_path(&schema.issuer_id, &resource_id);
        let resource = Resource {
            id: resource_id,
            name: schema.name.clone(),
            resource_type: ResourceType::AnonCredsSchema,
            data: schema.clone(),
            version: schema.version.clone(),
            network,
            issuer_id: schema.issuer_id.clone(),
        };

        let response = self.registrar.create_resource(&path, &resource).await;
        let state = response.did_state;
        let envelope = match state.state {
            RegistrationState::Finished => {
                let schema_id = state.did.unwrap_or(path);
                info!("Registered schema {schema_id}");
                RegisterSchemaReturn {
                    schema_state: SchemaState {
                        state: RegistrationState::Finished,
                        schema,
                        schema_id: Some(schema_id),
                        reason: None,
                    },
                    registration_metadata: Map::new(),
                    schema_metadata: Map::new(),
                }
            }
            RegistrationState::Failed => schema_failed(
                schema,
                state
                    .reason
                    .unwrap_or_else(|| "schema registration failed".to_string()),
            ),
        };
        Ok(envelope)
    }

    /// Looks up a credential definition by its resource id.
    ///
    /// An id the ledger does not know comes back with empty `schemaId`/`issuerId`.
    pub async fn get_credential_definition(
        &self,
        credential_definition_id: &str,
    ) -> Result<GetCredentialDefinitionReturn> {
        let envelope = match self
            .ledger
            .get_credential_definition(credential_definition_id)
            .await
        {
            Ok((schema_id, issuer_id)) => GetCredentialDefinitionReturn {
                credential_definition: Some(self.material.credential_definition(
                    credential_definition_id,
                    &schema_id,
                    &issuer_id,
                )),
                credential_definition_id: credential_definition_id.to_string(),
                resolution_metadata: ResolutionMetadata::default(),
                credential_definition_metadata: Map::new(),
            },
            Err(err) => {
                debug!("Credential definition {credential_definition_id} unavailable: {err}");
                GetCredentialDefinitionReturn {
                    credential_definition: None,
                    credential_definition_id: credential_definition_id.to_string(),
                    resolution_metadata: ResolutionMetadata::not_found(err.to_string()),
                    credential_definition_metadata: Map::new(),
                }
            }
        };
        Ok(envelope)
    }

    /// Registers a credential definition as a new resource of its issuer.
    pub async fn register_credential_definition(
        &self,
        options: RegisterCredentialDefinitionOptions,
    ) -> Result<RegisterCredentialDefinitionReturn> {
        let body = options.credential_definition;
        let network = match issuer_network(&body.issuer_id) {
            Ok(network) => network,
            Err(reason) => return Ok(credential_definition_failed(body, reason)),
        };

        let resource_id = Uuid::new_v4().to_string();
        let id = identifier::resource_path(&body.issuer_id, &resource_id);
        let resource = Resource {
            id: resource_id,
            name: body.tag.clone(),
            resource_type: ResourceType::AnonCredsCredentialDefinition,
            data: body.clone(),
            version: CREDENTIAL_DEFINITION_RESOURCE_VERSION.to_string(),
            network,
            issuer_id: body.issuer_id.clone(),
        };

        let response = self.registrar.create_credential_definition(&id, &resource).await;
        let state = response.did_state;
        let envelope = match state.state {
            RegistrationState::Finished => {
                let credential_definition_id = state.did.unwrap_or(id);
                info!("Registered credential definition {credential_definition_id}");
                RegisterCredentialDefinitionReturn {
                    credential_definition_state: CredentialDefinitionState {
                        state: RegistrationState::Finished,
                        credential_definition: body,
                        credential_definition_id: Some(credential_definition_id),
                        reason: None,
                    },
                    registration_metadata: Map::new(),
                    credential_definition_metadata: Map::new(),
                }
            }
            RegistrationState::Failed => credential_definition_failed(
                body,
                state
                    .reason
                    .unwrap_or_else(|| "credential definition registration failed".to_string()),
            ),
        };
        Ok(envelope)
    }

    /// Revocation registries have no ledger support.
    pub async fn get_revocation_registry_definition(&self, _id: &str) -> Result<Value> {
        Err(Error::NotImplemented("Revocation registry definition lookup"))
    }

    pub async fn register_revocation_registry_definition(
        &self,
        _options: Map<String, Value>,
    ) -> Result<Value> {
        Err(Error::NotImplemented("Revocation registry definition registration"))
    }

    /// Revocation status lists have no ledger support.
    pub async fn get_revocation_status_list(&self, _id: &str, _timestamp: u64) -> Result<Value> {
        Err(Error::NotImplemented("Revocation status list lookup"))
    }

    pub async fn register_revocation_status_list(
        &self,
        _options: Map<String, Value>,
    ) -> Result<Value> {
        Err(Error::NotImplemented("Revocation status list registration"))
    }
}

fn issuer_network(issuer_id: &str) -> std::result::Result<Network, String> {
    match identifier::parse(issuer_id) {
        Some(parsed) if parsed.kind() == DidUrlKind::Did && parsed.did == issuer_id => {
            Ok(parsed.network)
        }
        _ => Err(format!("issuer {issuer_id} is not a valid did:zksync DID")),
    }
}

fn schema_failed(schema: Schema, reason: impl Into<String>) -> RegisterSchemaReturn {
    RegisterSchemaReturn {
        schema_state: SchemaState {
            state: RegistrationState::Failed,
            schema,
            schema_id: None,
            reason: Some(reason.into()),
        },
        registration_metadata: Map::new(),
        schema_metadata: Map::new(),
    }
}

fn credential_definition_failed(
    credential_definition: CredentialDefinitionBody,
    reason: impl Into<String>,
) -> RegisterCredentialDefinitionReturn {
    RegisterCredentialDefinitionReturn {
        credential_definition_state: CredentialDefinitionState {
            state: RegistrationState::Failed,
            credential_definition,
            credential_definition_id: None,
            reason: Some(reason.into()),
        },
        registration_metadata: Map::new(),
        credential_definition_metadata: Map::new(),
    }
}
