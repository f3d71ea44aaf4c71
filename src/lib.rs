// src/lib.rs

//! # did:zksync
//!
//! A DID method and verifiable-credential resource registry backed by a registry smart
//! contract on zkSync Era.
//!
//! ## Architecture Overview
//! 1. **Identifier Layer**: [`identifier`] parses and validates `did:zksync` DID URLs
//! 2. **Contract Layer**: [`contracts`] encodes registry calls and decodes ledger payloads
//! 3. **Blockchain Layer**: [`LedgerClient`] manages connections and the transaction lifecycle
//! 4. **Services Layer**: [`DidResolver`], [`DidRegistrar`] and [`AnonCredsRegistry`]
//!
//! ## Example
//! ```no_run
//! use did_zksync::{DidResolver, LedgerClient, Settings};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), did_zksync::Error> {
//! let settings = Settings::load()?;
//! let ledger = Arc::new(LedgerClient::new(settings.network_configs())?);
//! let resolver = DidResolver::new(ledger);
//!
//! let result = resolver
//!     .resolve("did:zksync:testnet:0b1c5e6f-3f1a-4e0b-9a7c-2d4e5f607182")
//!     .await;
//! println!("{:?}", result.did_resolution_metadata);
//! # Ok(())
//! # }
//! ```

pub mod blockchain;   // Ledger transport and client
pub mod config;       // Network configuration
pub mod contracts;    // Registry contract ABI and payload codecs
pub mod error;
pub mod identifier;   // DID grammar
pub mod models;       // Data structures
pub mod services;     // Resolver, registrar, AnonCreds registry

pub use blockchain::ledger_client::LedgerClient;
pub use blockchain::zksync_client::{
    Connector, LedgerConnection, TxReceipt, TxStatus, ZkSyncClient, ZkSyncConnector,
};
pub use self::config::{NetworkConfig, Settings};
pub use error::{Error, ErrorKind, Result};
pub use identifier::{parse, DidUrlKind, Network, ParsedDid};
pub use services::anoncreds_registry::{
    AnonCredsRegistry, CredentialDefinitionMaterial, PlaceholderMaterial,
};
pub use services::registrar::{DidCreateOptions, DidOperationResult, DidRegistrar, DidState};
pub use services::resolver::DidResolver;
