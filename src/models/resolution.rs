// src/models/resolution.rs
//! DID resolution result envelope.
//!
//! Resolution never fails with an error: misses and ledger failures are reported
//! through [`ResolutionMetadata::error`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content type of a successfully resolved DID Document.
pub const DID_LD_JSON: &str = "application/did+ld+json";
/// Content type of a successfully resolved resource.
pub const APPLICATION_JSON: &str = "application/json";

/// Resolution error code for a missing document or resource.
pub const NOT_FOUND: &str = "notFound";
/// Resolution error code for a string that is not a `did:zksync` DID URL.
pub const INVALID_DID: &str = "invalidDid";

/// Outcome metadata for a resolution request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ResolutionMetadata {
    pub fn content(content_type: &str) -> Self {
        ResolutionMetadata {
            content_type: Some(content_type.to_string()),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ResolutionMetadata {
            error: Some(code.to_string()),
            message: Some(message.into()),
            content_type: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(NOT_FOUND, message)
    }
}

/// Resolution envelope returned by the resolver. `T` is the resolved content:
/// a DID Document, a resource, or metadata about either.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult<T> {
    pub did_document: Option<T>,
    pub did_document_metadata: Map<String, Value>,
    pub did_resolution_metadata: ResolutionMetadata,
}

impl<T> ResolutionResult<T> {
    pub fn found(content: T, content_type: &str) -> Self {
        ResolutionResult {
            did_document: Some(content),
            did_document_metadata: Map::new(),
            did_resolution_metadata: ResolutionMetadata::content(content_type),
        }
    }

    pub fn failed(metadata: ResolutionMetadata) -> Self {
        ResolutionResult {
            did_document: None,
            did_document_metadata: Map::new(),
            did_resolution_metadata: metadata,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::failed(ResolutionMetadata::not_found(message))
    }
}
