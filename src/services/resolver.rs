// src/services/resolver.rs
//! DID resolver for `did:zksync`.
//!
//! Turns DIDs and DID URLs into documents and resources by querying the ledger client.
//! Resolution never returns an error: invalid identifiers, misses and ledger failures
//! all come back as a [`ResolutionResult`] whose `didResolutionMetadata.error` is set.

use crate::blockchain::ledger_client::LedgerClient;
use crate::blockchain::zksync_client::{Connector, ZkSyncConnector};
use crate::identifier::{self, DidUrlKind, ParsedDid, METHOD};
use crate::models::anoncreds::SchemaRecord;
use crate::models::did::{DidDocument, DidRecord};
use crate::models::resolution::{
    ResolutionMetadata, ResolutionResult, APPLICATION_JSON, DID_LD_JSON, INVALID_DID,
};
use log::{debug, warn};
use serde_json::{json, Value};
use std::sync::Arc;

/// Resolves `did:zksync` identifiers against the registry contract.
pub struct DidResolver<C: Connector = ZkSyncConnector> {
    ledger: Arc<LedgerClient<C>>,
}

impl<C: Connector> DidResolver<C> {
    pub fn new(ledger: Arc<LedgerClient<C>>) -> Self {
        DidResolver { ledger }
    }

    /// DID methods this resolver handles.
    pub fn supported_methods(&self) -> &'static [&'static str] {
        &[METHOD]
    }

    /// Resolution results may be cached by the caller.
    pub fn allows_caching(&self) -> bool {
        true
    }

    /// The caller may keep a local record of DIDs it created through this method.
    pub fn allows_local_did_record(&self) -> bool {
        true
    }

    /// Resolves a DID to its document.
    ///
    /// Any path, query or fragment on `did` is ignored; the bare DID is looked up.
    pub async fn resolve(&self, did: &str) -> ResolutionResult<DidDocument> {
        let parsed = match parse(did) {
            Ok(parsed) => parsed,
            Err(failure) => return ResolutionResult::failed(failure),
        };
        match self.lookup_did(&parsed.did).await {
            Ok(record) => ResolutionResult::found(record.document, DID_LD_JSON),
            Err(failure) => ResolutionResult::failed(failure),
        }
    }

    /// Resolves a resource DID (`<did>/resources/<id>`) to the schema stored there.
    pub async fn resolve_resource(&self, resource_did: &str) -> ResolutionResult<SchemaRecord> {
        let parsed = match parse(resource_did) {
            Ok(parsed) => parsed,
            Err(failure) => return ResolutionResult::failed(failure),
        };
        let resource_id = match parsed.kind() {
            DidUrlKind::Resource(id) | DidUrlKind::ResourceMetadata(id) => id,
            _ => {
                return ResolutionResult::not_found(format!(
                    "{resource_did} does not address a resource"
                ))
            }
        };
        match self.lookup_resource(&parsed, &resource_id).await {
            Ok(record) => ResolutionResult::found(record, APPLICATION_JSON),
            Err(failure) => ResolutionResult::failed(failure),
        }
    }

    /// Dereferences any member of the DID URL grammar family.
    ///
    /// - bare DID: the DID Document
    /// - `/metadata`: the document metadata (`versionId`)
    /// - `/versions`: the known versions; the ledger keeps only the current one
    /// - `/version/<id>`: the document, if `<id>` is the current version
    /// - `/resources/<id>`: the stored resource
    /// - `/resources/<id>/metadata`: the resource descriptor
    pub async fn dereference(&self, did_url: &str) -> ResolutionResult<Value> {
        let parsed = match parse(did_url) {
            Ok(parsed) => parsed,
            Err(failure) => return ResolutionResult::failed(failure),
        };

        let outcome = match parsed.kind() {
            DidUrlKind::Did => self
                .lookup_did(&parsed.did)
                .await
                .and_then(|record| to_value(record.document, DID_LD_JSON)),
            DidUrlKind::Metadata => self.lookup_did(&parsed.did).await.and_then(|record| {
                to_value(json!({ "versionId": record.version_id }), APPLICATION_JSON)
            }),
            DidUrlKind::Versions => self.lookup_did(&parsed.did).await.and_then(|record| {
                to_value(
                    json!({ "versions": [{ "versionId": record.version_id }] }),
                    APPLICATION_JSON,
                )
            }),
            DidUrlKind::Version(version_id) => {
                self.lookup_did(&parsed.did).await.and_then(|record| {
                    if record.version_id == version_id {
                        to_value(record.document, DID_LD_JSON)
                    } else {
                        Err(ResolutionMetadata::not_found(format!(
                            "version {version_id} of {} not found",
                            parsed.did
                        )))
                    }
                })
            }
            DidUrlKind::Resource(id) => self
                .lookup_resource(&parsed, &id)
                .await
                .and_then(|record| to_value(record, APPLICATION_JSON)),
            DidUrlKind::ResourceMetadata(id) => {
                self.lookup_resource(&parsed, &id).await.and_then(|record| {
                    match record.resource {
                        Some(metadata) => to_value(metadata, APPLICATION_JSON),
                        None => Err(ResolutionMetadata::not_found(format!(
                            "no metadata stored for resource {id}"
                        ))),
                    }
                })
            }
            DidUrlKind::Other => Err(ResolutionMetadata::not_found(format!(
                "{did_url} does not address anything on this ledger"
            ))),
        };

        match outcome {
            Ok((value, content_type)) => ResolutionResult::found(value, content_type),
            Err(failure) => ResolutionResult::failed(failure),
        }
    }

    async fn lookup_did(&self, did: &str) -> Result<DidRecord, ResolutionMetadata> {
        debug!("Resolving {did}");
        match self.ledger.get_did(did).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ResolutionMetadata::not_found(format!("DID {did} not found"))),
            Err(err) => {
                warn!("Ledger lookup of {did} failed: {err}");
                Err(ResolutionMetadata::not_found(err.to_string()))
            }
        }
    }

    async fn lookup_resource(
        &self,
        parsed: &ParsedDid,
        resource_id: &str,
    ) -> Result<SchemaRecord, ResolutionMetadata> {
        let address = identifier::resource_path(&parsed.did, resource_id);
        debug!("Resolving resource {address}");
        match self.ledger.get_schema(&address).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ResolutionMetadata::not_found(format!(
                "resource {address} not found"
            ))),
            Err(err) => {
                warn!("Ledger lookup of {address} failed: {err}");
                Err(ResolutionMetadata::not_found(err.to_string()))
            }
        }
    }
}

fn parse(did_url: &str) -> Result<ParsedDid, ResolutionMetadata> {
    identifier::parse(did_url).ok_or_else(|| {
        ResolutionMetadata::error(INVALID_DID, format!("{did_url} is not a valid did:{METHOD} DID"))
    })
}

fn to_value<T: serde::Serialize>(
    content: T,
    content_type: &'static str,
) -> Result<(Value, &'static str), ResolutionMetadata> {
    serde_json::to_value(content)
        .map(|value| (value, content_type))
        .map_err(|e| ResolutionMetadata::not_found(e.to_string()))
}
