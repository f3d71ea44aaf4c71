// src/contracts/did_registry.rs
//! DID half of the registry contract: register, update, deactivate and read DIDs.
//!
//! A DID is stored as two strings: the JSON [`DidPayload`] and the version id written
//! with it. A registered DID whose payload does not parse still resolves, to an empty
//! document, so a corrupt payload never makes the DID unresolvable.

use super::{
    decode_output, ContractCall, DEACTIVATE_DID, GET_DID, REGISTER_DID, UPDATE_DID,
};
use crate::error::Result;
use crate::models::did::{DidDocument, DidPayload, DidRecord};
use ethers_core::types::Bytes;
use log::warn;

/// Calldata for `registerDID(did, document, versionId)`.
pub fn register_did(did: &str, document: &DidDocument, version_id: &str) -> Result<ContractCall> {
    let payload = serde_json::to_string(&document.to_payload())?;
    ContractCall::encode(
        REGISTER_DID,
        (did.to_string(), payload, version_id.to_string()),
    )
}

/// Calldata for `updateDID(did, document, versionId)`.
pub fn update_did(did: &str, document: &DidDocument, version_id: &str) -> Result<ContractCall> {
    let payload = serde_json::to_string(&document.to_payload())?;
    ContractCall::encode(UPDATE_DID, (did.to_string(), payload, version_id.to_string()))
}

/// Calldata for `deactivateDID(did)`.
pub fn deactivate_did(did: &str) -> Result<ContractCall> {
    ContractCall::encode(DEACTIVATE_DID, did.to_string())
}

/// Calldata for `getDID(did)`.
pub fn get_did(did: &str) -> Result<ContractCall> {
    ContractCall::encode(GET_DID, did.to_string())
}

/// Decodes the `getDID` return data.
///
/// # Returns
/// - `None` if the contract holds nothing for `did` (both fields empty)
/// - the stored document otherwise, or an empty document if the payload is malformed
///
/// # Errors
/// Only if the return data itself is not a `(string, string)` tuple.
pub fn decode_get_did(did: &str, output: &Bytes) -> Result<Option<DidRecord>> {
    let (payload, version_id): (String, String) = decode_output(GET_DID, output)?;
    Ok(did_record(did, &payload, version_id))
}

pub(crate) fn did_record(did: &str, payload: &str, version_id: String) -> Option<DidRecord> {
    if payload.is_empty() && version_id.is_empty() {
        return None;
    }
    let document = match serde_json::from_str::<DidPayload>(payload) {
        Ok(payload) => payload.into_document(did),
        Err(err) => {
            if !payload.is_empty() {
                warn!("Malformed DID payload stored for {did}: {err}");
            }
            DidDocument::new(did)
        }
    };
    Some(DidRecord {
        document,
        version_id,
    })
}
