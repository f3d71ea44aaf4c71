// src/main.rs

//! # did:zksync - Command Line Entry Point
//!
//! Resolves and registers `did:zksync` DIDs, schemas and credential definitions against
//! the registry contract. Results are printed to stdout as JSON.
//!
//! ## Environment Variables
//! - `PRIVATE_KEY`: (Optional) wallet private key; required for every write command
//! - `TESTNET_RPC_URL`: (Optional) zkSync Era Sepolia endpoint (default: https://sepolia.era.zksync.dev)
//! - `MAINNET_RPC_URL`: (Optional) zkSync Era mainnet endpoint (default: https://mainnet.era.zksync.io)
//! - `RUST_LOG`: (Optional) log filter, e.g. `did_zksync=debug`

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use did_zksync::models::anoncreds::{
    CredentialDefinitionBody, RegisterCredentialDefinitionOptions, RegisterSchemaOptions, Schema,
};
use did_zksync::{
    AnonCredsRegistry, DidCreateOptions, DidRegistrar, DidResolver, LedgerClient, Network,
    Settings,
};
use dotenv::dotenv;
use ethers_core::types::Address;
use log::info;
use serde::Serialize;
use serde_json::Map;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "did-zksync", version, about = "did:zksync resolver and registrar")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a DID or dereference a DID URL (versions, metadata, resources)
    Resolve { did_url: String },
    /// Register a new DID with an empty document
    CreateDid {
        #[arg(long, default_value = "testnet")]
        network: Network,
        /// DID to register; a fresh UUID-based DID is minted when omitted
        #[arg(long)]
        did: Option<String>,
    },
    /// Deactivate a DID
    DeactivateDid { did: String },
    /// Look up a schema by resource id
    GetSchema { schema_id: String },
    /// Register a schema under an issuer DID
    RegisterSchema {
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        version: String,
        /// Attribute name; repeat for each attribute, order is kept
        #[arg(long = "attr", required = true)]
        attrs: Vec<String>,
    },
    /// Approve an issuer address for a schema
    ApproveIssuer { schema_id: String, issuer: Address },
    /// Look up a credential definition by resource id
    GetCredDef { id: String },
    /// Register a credential definition under an issuer DID
    RegisterCredDef {
        #[arg(long)]
        issuer: String,
        #[arg(long)]
        schema_id: String,
        #[arg(long, default_value = "default")]
        tag: String,
    },
    /// Revoke a credential
    Revoke { credential_id: String },
    /// Check whether a credential is revoked
    IsRevoked { credential_id: String },
}

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Build the ledger client for the configured networks
/// 3. Wire resolver, registrar and registry
/// 4. Run the requested command
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let settings = Settings::load().context("Failed to load configuration")?;
    let ledger = Arc::new(LedgerClient::new(settings.network_configs())?);
    let resolver = Arc::new(DidResolver::new(ledger.clone()));
    let registrar = Arc::new(DidRegistrar::new(ledger.clone()));
    let registry = AnonCredsRegistry::new(resolver.clone(), registrar.clone(), ledger.clone());

    match cli.command {
        Command::Resolve { did_url } => print(&resolver.dereference(&did_url).await),
        Command::CreateDid { network, did } => {
            let result = registrar
                .create(DidCreateOptions {
                    network,
                    did,
                    document: None,
                })
                .await;
            print(&result)?;
            if !result.is_finished() {
                bail!("DID registration failed");
            }
            Ok(())
        }
        Command::DeactivateDid { did } => {
            let result = registrar.deactivate(&did).await;
            print(&result)?;
            if !result.is_finished() {
                bail!("DID deactivation failed");
            }
            Ok(())
        }
        Command::GetSchema { schema_id } => print(&registry.get_schema(&schema_id).await?),
        Command::RegisterSchema {
            issuer,
            name,
            version,
            attrs,
        } => {
            let schema = Schema {
                attr_names: attrs,
                name,
                version,
                issuer_id: issuer,
            };
            let result = registry
                .register_schema(RegisterSchemaOptions {
                    schema,
                    options: Map::new(),
                })
                .await?;
            print(&result)
        }
        Command::ApproveIssuer { schema_id, issuer } => {
            print(&registrar.approve_issuer(&schema_id, issuer).await)
        }
        Command::GetCredDef { id } => print(&registry.get_credential_definition(&id).await?),
        Command::RegisterCredDef {
            issuer,
            schema_id,
            tag,
        } => {
            let result = registry
                .register_credential_definition(RegisterCredentialDefinitionOptions {
                    credential_definition: CredentialDefinitionBody {
                        schema_id,
                        issuer_id: issuer,
                        tag,
                    },
                    options: Map::new(),
                })
                .await?;
            print(&result)
        }
        Command::Revoke { credential_id } => {
            let receipt = ledger.revoke_credential(&credential_id).await?;
            info!("Revoked {credential_id}");
            print(&receipt)
        }
        Command::IsRevoked { credential_id } => {
            let revoked = ledger.is_credential_revoked(&credential_id).await?;
            print(&serde_json::json!({ "credentialId": credential_id, "revoked": revoked }))
        }
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
