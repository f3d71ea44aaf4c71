// src/contracts/mod.rs
//! Registry smart contract surface.
//!
//! The registry is deployed at a single fixed address on every network and exposes a
//! fixed set of functions. This module owns their human-readable ABI; the submodules
//! build calldata for each function and decode what the contract returns, so JSON
//! embedded in ledger strings is turned into typed values exactly once, here.

pub mod credential_registry;
pub mod did_registry;

use crate::error::Result;
use ethers_contract::BaseContract;
use ethers_core::abi::{parse_abi, Detokenize, Tokenize};
use ethers_core::types::{Address, Bytes, H160};
use once_cell::sync::Lazy;

/// Address of the deployed registry contract.
pub const REGISTRY_ADDRESS: Address = H160([
    0x3a, 0x6f, 0x1e, 0x8b, 0x52, 0xc4, 0x09, 0xd7, 0x7e, 0x2b, 0x90, 0x1c, 0x46, 0xf5, 0x3d, 0xa8,
    0x0e, 0x71, 0xb9, 0x24,
]);

pub const REGISTER_DID: &str = "registerDID";
pub const UPDATE_DID: &str = "updateDID";
pub const DEACTIVATE_DID: &str = "deactivateDID";
pub const GET_DID: &str = "getDID";
pub const REGISTER_SCHEMA: &str = "registerSchema";
pub const ADD_APPROVED_ISSUER: &str = "addApprovedIssuer";
pub const GET_SCHEMA: &str = "getSchema";
pub const REGISTER_CREDENTIAL_DEFINITION: &str = "registerCredentialDefinition";
pub const GET_CREDENTIAL_DEFINITION: &str = "getCredentialDefinition";
pub const REVOKE_CREDENTIAL: &str = "revokeCredential";
pub const IS_CREDENTIAL_REVOKED: &str = "isCredentialRevoked";

/// Human-readable ABI of the registry. Signatures must stay byte-compatible with the
/// deployed contract.
pub const REGISTRY_ABI: [&str; 11] = [
    "function registerDID(string did, string document, string versionId)",
    "function updateDID(string did, string document, string versionId)",
    "function deactivateDID(string did)",
    "function getDID(string did) view returns (string document, string versionId)",
    "function registerSchema(string schemaId, string issuerId, string resource)",
    "function addApprovedIssuer(string schemaId, address issuer)",
    "function getSchema(string schemaId) view returns (string resource, address[] approvedIssuers)",
    "function registerCredentialDefinition(string id, string schemaId, string issuerId)",
    "function getCredentialDefinition(string id) view returns (string schemaId, string issuerId)",
    "function revokeCredential(string credentialId)",
    "function isCredentialRevoked(string credentialId) view returns (bool)",
];

static REGISTRY: Lazy<BaseContract> = Lazy::new(|| {
    let abi = parse_abi(&REGISTRY_ABI).expect("Failed to load registry ABI");
    BaseContract::from(abi)
});

/// The registry contract ABI.
pub fn registry() -> &'static BaseContract {
    &REGISTRY
}

/// Encoded calldata for one registry function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract function name, e.g. `registerSchema`
    pub function: &'static str,
    pub data: Bytes,
}

impl ContractCall {
    /// ABI-encodes `args` for `function`, selector included.
    pub fn encode(function: &'static str, args: impl Tokenize) -> Result<Self> {
        let data = registry().encode(function, args)?;
        Ok(ContractCall { function, data })
    }
}

/// ABI-decodes the return data of `function`.
pub fn decode_output<D: Detokenize>(function: &str, output: &Bytes) -> Result<D> {
    Ok(registry().decode_output(function, output)?)
}
