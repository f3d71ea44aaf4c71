// src/contracts/credential_registry.rs
//! Credential half of the registry contract: schemas, credential definitions and
//! credential revocation.
//!
//! Schemas are stored as a JSON [`ResourceEnvelope`]; the attribute names sit at
//! `data.data.attrNames` and the schema's name, version and issuer at `data.*`.

use super::{
    decode_output, ContractCall, ADD_APPROVED_ISSUER, GET_CREDENTIAL_DEFINITION, GET_SCHEMA,
    IS_CREDENTIAL_REVOKED, REGISTER_CREDENTIAL_DEFINITION, REGISTER_SCHEMA, REVOKE_CREDENTIAL,
};
use crate::error::Result;
use crate::models::anoncreds::{Schema, SchemaRecord};
use crate::models::resource::{Resource, ResourceEnvelope, ResourceMetadata, ResourceType};
use ethers_core::types::{Address, Bytes};
use log::warn;
use serde::{Deserialize, Serialize};

/// Calldata for `registerSchema(schemaId, issuerId, resource)`.
pub fn register_schema<T: Serialize + Clone>(
    schema_id: &str,
    resource: &Resource<T>,
) -> Result<ContractCall> {
    let envelope = serde_json::to_string(&ResourceEnvelope {
        data: resource.clone(),
    })?;
    ContractCall::encode(
        REGISTER_SCHEMA,
        (schema_id.to_string(), resource.issuer_id.clone(), envelope),
    )
}

/// Calldata for `addApprovedIssuer(schemaId, issuer)`.
pub fn add_approved_issuer(schema_id: &str, issuer: Address) -> Result<ContractCall> {
    ContractCall::encode(ADD_APPROVED_ISSUER, (schema_id.to_string(), issuer))
}

/// Calldata for `getSchema(schemaId)`.
pub fn get_schema(schema_id: &str) -> Result<ContractCall> {
    ContractCall::encode(GET_SCHEMA, schema_id.to_string())
}

/// Calldata for `registerCredentialDefinition(id, schemaId, issuerId)`.
pub fn register_credential_definition(
    id: &str,
    schema_id: &str,
    issuer_id: &str,
) -> Result<ContractCall> {
    ContractCall::encode(
        REGISTER_CREDENTIAL_DEFINITION,
        (id.to_string(), schema_id.to_string(), issuer_id.to_string()),
    )
}

/// Calldata for `getCredentialDefinition(id)`.
pub fn get_credential_definition(id: &str) -> Result<ContractCall> {
    ContractCall::encode(GET_CREDENTIAL_DEFINITION, id.to_string())
}

/// Calldata for `revokeCredential(credentialId)`.
pub fn revoke_credential(credential_id: &str) -> Result<ContractCall> {
    ContractCall::encode(REVOKE_CREDENTIAL, credential_id.to_string())
}

/// Calldata for `isCredentialRevoked(credentialId)`.
pub fn is_credential_revoked(credential_id: &str) -> Result<ContractCall> {
    ContractCall::encode(IS_CREDENTIAL_REVOKED, credential_id.to_string())
}

/// Decodes the `getSchema` return data.
///
/// # Returns
/// - `None` if nothing is stored under the id (empty resource, no approved issuers)
/// - the decoded schema otherwise; a malformed resource yields a schema with empty
///   fields so the approved issuers stay available
pub fn decode_get_schema(output: &Bytes) -> Result<Option<SchemaRecord>> {
    let (resource, approved_issuers): (String, Vec<Address>) = decode_output(GET_SCHEMA, output)?;
    Ok(schema_record(&resource, approved_issuers))
}

/// Decodes the `getCredentialDefinition` return data as `(schemaId, issuerId)`.
/// Both fields are empty for an unregistered id.
pub fn decode_get_credential_definition(output: &Bytes) -> Result<(String, String)> {
    decode_output(GET_CREDENTIAL_DEFINITION, output)
}

/// Decodes the `isCredentialRevoked` return data.
pub fn decode_is_credential_revoked(output: &Bytes) -> Result<bool> {
    decode_output(IS_CREDENTIAL_REVOKED, output)
}

#[derive(Deserialize)]
struct StoredSchema {
    data: StoredSchemaResource,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSchemaResource {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    resource_type: Option<ResourceType>,
    #[serde(default)]
    version: String,
    #[serde(default)]
    issuer_id: String,
    data: StoredAttributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAttributes {
    attr_names: Vec<String>,
}

pub(crate) fn schema_record(resource: &str, approved_issuers: Vec<Address>) -> Option<SchemaRecord> {
    if resource.is_empty() && approved_issuers.is_empty() {
        return None;
    }
    let record = match serde_json::from_str::<StoredSchema>(resource) {
        Ok(StoredSchema { data }) => {
            let metadata = match (data.id, data.resource_type) {
                (Some(id), Some(resource_type)) => Some(ResourceMetadata {
                    id,
                    name: data.name.clone(),
                    resource_type,
                    version: data.version.clone(),
                }),
                _ => None,
            };
            SchemaRecord {
                schema: Schema {
                    attr_names: data.data.attr_names,
                    name: data.name,
                    version: data.version,
                    issuer_id: data.issuer_id,
                },
                approved_issuers,
                resource: metadata,
            }
        }
        Err(err) => {
            warn!("Malformed schema resource on ledger: {err}");
            SchemaRecord {
                schema: Schema::default(),
                approved_issuers,
                resource: None,
            }
        }
    };
    Some(record)
}
