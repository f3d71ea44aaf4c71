// src/error.rs
//! Error types shared by every layer of the did:zksync stack.
//!
//! Ledger failures are split by where they happen:
//! - [`Error::Connectivity`] when the RPC endpoint cannot be reached or fails the liveness probe
//! - [`Error::TransactionFailed`] when a transaction was accepted but reverted on execution
//! - [`Error::TransactionDropped`] when a submitted transaction never made it into a block
//! - [`Error::Rpc`] for any other transport failure after a connection was established
//!
//! Write operations wrap their failures in [`Error::Operation`] so messages read like
//! `Failed to register schema: ...`. Use [`Error::kind`] to classify an error regardless
//! of how many times it was wrapped.

use ethers_core::abi::AbiError;
use ethers_core::types::H256;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the ledger client, registrar and registry adapter.
#[derive(Debug, Error)]
pub enum Error {
    /// The string is not a valid `did:zksync` identifier.
    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    /// Configuration could not be loaded or is incomplete.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The configured private key cannot be turned into a signer.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A write was requested on a connection built without a private key.
    #[error("No private key configured for network {0}; ledger writes are unavailable")]
    MissingSigner(String),

    /// The RPC endpoint is unreachable or failed the liveness probe.
    #[error("Could not connect to ledger at {url}: {reason}")]
    Connectivity { url: String, reason: String },

    /// The transaction was mined but its receipt reports a failed execution.
    #[error("Transaction {tx_hash:?} calling {function} was reverted")]
    TransactionFailed { function: &'static str, tx_hash: H256 },

    /// The transaction disappeared from the mempool before inclusion.
    #[error("Transaction {0:?} was dropped before inclusion")]
    TransactionDropped(H256),

    /// Any other JSON-RPC or signing failure.
    #[error("RPC request failed: {0}")]
    Rpc(String),

    /// Calldata could not be encoded, or return data could not be decoded.
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// A JSON payload could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The operation is deliberately absent from the ledger surface.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// A failure wrapped with the operation that was being performed.
    #[error("Failed to {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of an [`Error`], stable across wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDid,
    Config,
    InvalidPrivateKey,
    MissingSigner,
    Connectivity,
    TransactionFailure,
    TransactionDropped,
    Rpc,
    Encoding,
    NotImplemented,
}

impl Error {
    /// Wraps the error with a human readable operation name (e.g. `"register schema"`).
    pub fn during(self, operation: &'static str) -> Self {
        Error::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// Classifies the error, looking through any [`Error::Operation`] wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidDid(_) => ErrorKind::InvalidDid,
            Error::Config(_) => ErrorKind::Config,
            Error::InvalidPrivateKey(_) => ErrorKind::InvalidPrivateKey,
            Error::MissingSigner(_) => ErrorKind::MissingSigner,
            Error::Connectivity { .. } => ErrorKind::Connectivity,
            Error::TransactionFailed { .. } => ErrorKind::TransactionFailure,
            Error::TransactionDropped(_) => ErrorKind::TransactionDropped,
            Error::Rpc(_) => ErrorKind::Rpc,
            Error::Abi(_) | Error::Json(_) => ErrorKind::Encoding,
            Error::NotImplemented(_) => ErrorKind::NotImplemented,
            Error::Operation { source, .. } => source.kind(),
        }
    }

    /// Whether the failure happened before anything reached the ledger.
    pub fn is_connectivity(&self) -> bool {
        self.kind() == ErrorKind::Connectivity
    }

    /// Whether a submitted transaction failed to execute.
    pub fn is_transaction_failure(&self) -> bool {
        self.kind() == ErrorKind::TransactionFailure
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
