// src/models/anoncreds.rs
//! AnonCreds objects and the result envelopes returned by the registry adapter.
//!
//! Field names serialize in camelCase to match the AnonCreds registry interface.

use super::resolution::ResolutionMetadata;
use super::resource::ResourceMetadata;
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signature type of every credential definition served by this registry.
pub const CL_SIGNATURE_TYPE: &str = "CL";

/// An AnonCreds schema. `attr_names` keeps insertion order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub attr_names: Vec<String>,
    pub name: String,
    pub version: String,
    pub issuer_id: String,
}

/// A schema as read from the ledger, with the issuers approved to use it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRecord {
    pub schema: Schema,
    pub approved_issuers: Vec<Address>,
    /// Descriptor of the resource the schema was stored in, when the payload carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceMetadata>,
}

/// Data stored for a credential definition resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDefinitionBody {
    pub schema_id: String,
    pub issuer_id: String,
    pub tag: String,
}

/// Public key material of a credential definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDefinitionValue {
    pub primary: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation: Option<Value>,
}

/// An AnonCreds credential definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDefinition {
    pub issuer_id: String,
    pub schema_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub tag: String,
    pub value: CredentialDefinitionValue,
}

/// Lifecycle of a registration request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationState {
    Finished,
    Failed,
}

/// Result of `get_schema`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetSchemaReturn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    pub schema_id: String,
    pub resolution_metadata: ResolutionMetadata,
    pub schema_metadata: Map<String, Value>,
}

/// Input of `register_schema`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchemaOptions {
    pub schema: Schema,
    #[serde(default)]
    pub options: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaState {
    pub state: RegistrationState,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of `register_schema`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchemaReturn {
    pub schema_state: SchemaState,
    pub registration_metadata: Map<String, Value>,
    pub schema_metadata: Map<String, Value>,
}

/// Result of `get_credential_definition`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetCredentialDefinitionReturn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_definition: Option<CredentialDefinition>,
    pub credential_definition_id: String,
    pub resolution_metadata: ResolutionMetadata,
    pub credential_definition_metadata: Map<String, Value>,
}

/// Input of `register_credential_definition`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCredentialDefinitionOptions {
    pub credential_definition: CredentialDefinitionBody,
    #[serde(default)]
    pub options: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDefinitionState {
    pub state: RegistrationState,
    pub credential_definition: CredentialDefinitionBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of `register_credential_definition`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCredentialDefinitionReturn {
    pub credential_definition_state: CredentialDefinitionState,
    pub registration_metadata: Map<String, Value>,
    pub credential_definition_metadata: Map<String, Value>,
}
