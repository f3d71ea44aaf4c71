// src/services/mod.rs
//! DID resolution, registration, and the AnonCreds registry built on them.

pub mod anoncreds_registry;
pub mod registrar;
pub mod resolver;
