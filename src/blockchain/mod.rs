// src/blockchain/mod.rs
//! Ledger access: the zkSync transport and the registry ledger client built on it.

pub mod ledger_client;
pub mod zksync_client;
