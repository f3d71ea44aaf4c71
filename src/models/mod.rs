// src/models/mod.rs
//! Data structures shared by the ledger client, resolver, registrar and registry adapter.

pub mod anoncreds;
pub mod did;
pub mod resolution;
pub mod resource;
