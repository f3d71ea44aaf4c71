// src/models/resource.rs
//! DID-linked resources.
//!
//! Resources are immutable artifacts (schemas, credential definitions) addressed as
//! `<issuerDid>/resources/<id>`. On the ledger they are stored wrapped in a
//! [`ResourceEnvelope`] so the schema body sits at `data.data`.

use crate::identifier::Network;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of artifact a resource carries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    #[serde(rename = "anonCredsSchema")]
    AnonCredsSchema,
    #[serde(rename = "anonCredsCredentialDefinition")]
    AnonCredsCredentialDefinition,
    #[serde(rename = "anonCredsRevocRegDef")]
    AnonCredsRevocRegDef,
    #[serde(rename = "anonCredsStatusList")]
    AnonCredsStatusList,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::AnonCredsSchema => "anonCredsSchema",
            ResourceType::AnonCredsCredentialDefinition => "anonCredsCredentialDefinition",
            ResourceType::AnonCredsRevocRegDef => "anonCredsRevocRegDef",
            ResourceType::AnonCredsStatusList => "anonCredsStatusList",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource descriptor carrying `data` of type `T`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource<T> {
    /// Freshly generated UUID
    pub id: String,
    pub name: String,
    pub resource_type: ResourceType,
    pub data: T,
    pub version: String,
    pub network: Network,
    pub issuer_id: String,
}

/// Wire envelope for resources stored through `registerSchema`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResourceEnvelope<T> {
    pub data: Resource<T>,
}

/// Summary of a resource, served for `/resources/<id>/metadata`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    pub id: String,
    pub name: String,
    pub resource_type: ResourceType,
    pub version: String,
}
