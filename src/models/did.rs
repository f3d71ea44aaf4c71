// src/models/did.rs
//! DID Document data model.
//!
//! Follows the shape of the [DID Core Specification](https://www.w3.org/TR/did-core/)
//! restricted to what the registry contract stores: contexts, verification methods and
//! services. The document id is not stored in the payload; it is the DID the payload is
//! registered under.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default JSON-LD context for documents written by this crate.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// A DID Document as returned by resolution.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,

    /// The DID this document describes
    pub id: String,

    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,

    #[serde(default)]
    pub service: Vec<Service>,
}

impl DidDocument {
    /// An empty document for `did` carrying only the default context.
    pub fn new(did: impl Into<String>) -> Self {
        DidDocument {
            context: vec![DID_CONTEXT.to_string()],
            id: did.into(),
            ..Default::default()
        }
    }

    /// Splits the document into the payload stored on the ledger.
    pub fn to_payload(&self) -> DidPayload {
        DidPayload {
            context: self.context.clone(),
            verification_method: self.verification_method.clone(),
            service: self.service.clone(),
        }
    }
}

/// A public key bound to the DID subject.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub controller: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Value>,
}

/// A service endpoint advertised by the DID subject.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub service_endpoint: Value,
}

/// JSON envelope stored in the first field of a `getDID` record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidPayload {
    #[serde(default)]
    pub context: Vec<String>,

    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,

    #[serde(default)]
    pub service: Vec<Service>,
}

impl DidPayload {
    /// Rebuilds the document for `did` from this payload.
    pub fn into_document(self, did: &str) -> DidDocument {
        DidDocument {
            context: self.context,
            id: did.to_string(),
            verification_method: self.verification_method,
            service: self.service,
        }
    }
}

/// A DID Document together with the version id written alongside it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DidRecord {
    pub document: DidDocument,
    pub version_id: String,
}
