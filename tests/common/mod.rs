//! In-memory registry contract used by the integration tests.
//!
//! `FakeConnector` hands out connections that decode registry calldata with the
//! crate's own ABI and answer the way the deployed contract does: unknown keys read
//! back as empty strings, an empty issuer list, or `false`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use did_zksync::contracts::{self, registry};
use did_zksync::{
    AnonCredsRegistry, Connector, DidRegistrar, DidResolver, Error, LedgerClient,
    LedgerConnection, Network, NetworkConfig, Result, TxReceipt,
};
use ethers_core::abi::{encode, Token};
use ethers_core::types::{Address, Bytes, H256};

pub const ISSUER: &str = "did:zksync:testnet:0b1c5e6f-3f1a-4e0b-9a7c-2d4e5f607182";

#[derive(Default)]
struct Registry {
    dids: HashMap<String, (String, String)>,
    schemas: HashMap<String, (String, Vec<Address>)>,
    credential_definitions: HashMap<String, (String, String)>,
    revoked: HashSet<String>,
}

/// Shared ledger state plus fault switches.
#[derive(Default)]
pub struct FakeLedger {
    registry: Mutex<Registry>,
    connects: AtomicUsize,
    transactions: AtomicU64,
    probe_fails: AtomicBool,
    calls_fail: AtomicBool,
    revert_writes: AtomicBool,
}

impl FakeLedger {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Make the liveness probe fail, as an unreachable endpoint would.
    pub fn fail_probe(&self, fail: bool) {
        self.probe_fails.store(fail, Ordering::SeqCst);
    }

    /// Make every `eth_call` and transaction submission fail at the transport.
    pub fn fail_calls(&self, fail: bool) {
        self.calls_fail.store(fail, Ordering::SeqCst);
    }

    /// Make every mined transaction report a reverted status.
    pub fn revert_writes(&self, revert: bool) {
        self.revert_writes.store(revert, Ordering::SeqCst);
    }

    /// Stores a raw `getDID` record, bypassing the registrar.
    pub fn put_did(&self, did: &str, payload: &str, version_id: &str) {
        self.registry
            .lock()
            .unwrap()
            .dids
            .insert(did.to_string(), (payload.to_string(), version_id.to_string()));
    }

    /// Stores a raw `getSchema` record, bypassing the registrar.
    pub fn put_schema(&self, schema_id: &str, resource: &str) {
        self.registry
            .lock()
            .unwrap()
            .schemas
            .insert(schema_id.to_string(), (resource.to_string(), vec![]));
    }

    pub fn approved_issuers(&self, schema_id: &str) -> Vec<Address> {
        self.registry
            .lock()
            .unwrap()
            .schemas
            .get(schema_id)
            .map(|(_, issuers)| issuers.clone())
            .unwrap_or_default()
    }

    fn function(data: &Bytes) -> &'static str {
        let selector = &data[..4];
        [
            contracts::REGISTER_DID,
            contracts::UPDATE_DID,
            contracts::DEACTIVATE_DID,
            contracts::GET_DID,
            contracts::REGISTER_SCHEMA,
            contracts::ADD_APPROVED_ISSUER,
            contracts::GET_SCHEMA,
            contracts::REGISTER_CREDENTIAL_DEFINITION,
            contracts::GET_CREDENTIAL_DEFINITION,
            contracts::REVOKE_CREDENTIAL,
            contracts::IS_CREDENTIAL_REVOKED,
        ]
        .into_iter()
        .find(|name| {
            registry().abi().function(name).expect("should be in ABI").short_signature()
                == selector
        })
        .expect("should match a registry selector")
    }

    fn read(&self, data: &Bytes) -> Bytes {
        let contract = registry();
        let state = self.registry.lock().unwrap();
        let tokens = match Self::function(data) {
            contracts::GET_DID => {
                let did: String = contract.decode(contracts::GET_DID, data).expect("should decode");
                let (payload, version) = state.dids.get(&did).cloned().unwrap_or_default();
                vec![Token::String(payload), Token::String(version)]
            }
            contracts::GET_SCHEMA => {
                let id: String =
                    contract.decode(contracts::GET_SCHEMA, data).expect("should decode");
                let (resource, issuers) = state.schemas.get(&id).cloned().unwrap_or_default();
                vec![
                    Token::String(resource),
                    Token::Array(issuers.into_iter().map(Token::Address).collect()),
                ]
            }
            contracts::GET_CREDENTIAL_DEFINITION => {
                let id: String = contract
                    .decode(contracts::GET_CREDENTIAL_DEFINITION, data)
                    .expect("should decode");
                let (schema_id, issuer_id) =
                    state.credential_definitions.get(&id).cloned().unwrap_or_default();
                vec![Token::String(schema_id), Token::String(issuer_id)]
            }
            contracts::IS_CREDENTIAL_REVOKED => {
                let id: String = contract
                    .decode(contracts::IS_CREDENTIAL_REVOKED, data)
                    .expect("should decode");
                vec![Token::Bool(state.revoked.contains(&id))]
            }
            other => panic!("{other} is not a view function"),
        };
        Bytes::from(encode(&tokens))
    }

    fn write(&self, data: &Bytes) {
        let contract = registry();
        let mut state = self.registry.lock().unwrap();
        match Self::function(data) {
            name @ (contracts::REGISTER_DID | contracts::UPDATE_DID) => {
                let (did, payload, version): (String, String, String) =
                    contract.decode(name, data).expect("should decode");
                state.dids.insert(did, (payload, version));
            }
            contracts::DEACTIVATE_DID => {
                let did: String =
                    contract.decode(contracts::DEACTIVATE_DID, data).expect("should decode");
                state.dids.remove(&did);
            }
            contracts::REGISTER_SCHEMA => {
                let (id, _issuer, resource): (String, String, String) =
                    contract.decode(contracts::REGISTER_SCHEMA, data).expect("should decode");
                state.schemas.entry(id).or_default().0 = resource;
            }
            contracts::ADD_APPROVED_ISSUER => {
                let (id, issuer): (String, Address) = contract
                    .decode(contracts::ADD_APPROVED_ISSUER, data)
                    .expect("should decode");
                state.schemas.entry(id).or_default().1.push(issuer);
            }
            contracts::REGISTER_CREDENTIAL_DEFINITION => {
                let (id, schema_id, issuer_id): (String, String, String) = contract
                    .decode(contracts::REGISTER_CREDENTIAL_DEFINITION, data)
                    .expect("should decode");
                state.credential_definitions.insert(id, (schema_id, issuer_id));
            }
            contracts::REVOKE_CREDENTIAL => {
                let id: String =
                    contract.decode(contracts::REVOKE_CREDENTIAL, data).expect("should decode");
                state.revoked.insert(id);
            }
            other => panic!("{other} is a view function"),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub ledger: Arc<FakeLedger>,
}

pub struct FakeConnection {
    ledger: Arc<FakeLedger>,
    rpc_url: String,
}

impl Connector for FakeConnector {
    type Connection = FakeConnection;

    async fn connect(&self, config: &NetworkConfig) -> Result<FakeConnection> {
        self.ledger.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            ledger: self.ledger.clone(),
            rpc_url: config.rpc_url.clone(),
        })
    }
}

impl LedgerConnection for FakeConnection {
    fn provider_url(&self) -> &str {
        &self.rpc_url
    }

    async fn block_number(&self) -> Result<u64> {
        if self.ledger.probe_fails.load(Ordering::SeqCst) {
            return Err(Error::Rpc("connection refused".into()));
        }
        Ok(self.ledger.transactions.load(Ordering::SeqCst))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        assert_eq!(to, contracts::REGISTRY_ADDRESS);
        if self.ledger.calls_fail.load(Ordering::SeqCst) {
            return Err(Error::Rpc("error sending request".into()));
        }
        Ok(self.ledger.read(&data))
    }

    async fn send(&self, to: Address, data: Bytes) -> Result<TxReceipt> {
        assert_eq!(to, contracts::REGISTRY_ADDRESS);
        if self.ledger.calls_fail.load(Ordering::SeqCst) {
            return Err(Error::Rpc("error sending request".into()));
        }
        let block = self.ledger.transactions.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = H256::from_low_u64_be(block);
        if self.ledger.revert_writes.load(Ordering::SeqCst) {
            return Ok(TxReceipt::from_status(tx_hash, Some(0.into()), Some(block.into())));
        }
        self.ledger.write(&data);
        Ok(TxReceipt::from_status(tx_hash, Some(1.into()), Some(block.into())))
    }
}

/// Resolver, registrar and registry wired to one fake ledger.
pub struct Harness {
    pub ledger: Arc<FakeLedger>,
    pub client: Arc<LedgerClient<FakeConnector>>,
    pub resolver: Arc<DidResolver<FakeConnector>>,
    pub registrar: Arc<DidRegistrar<FakeConnector>>,
    pub registry: AnonCredsRegistry<FakeConnector>,
}

pub fn harness() -> Harness {
    let connector = FakeConnector::default();
    let ledger = connector.ledger.clone();
    let networks = vec![
        NetworkConfig::new(Network::Testnet, Some("http://testnet.local".into()), None),
        NetworkConfig::new(Network::Mainnet, Some("http://mainnet.local".into()), None),
    ];
    let client = Arc::new(
        LedgerClient::with_connector(networks, connector).expect("should build ledger client"),
    );
    let resolver = Arc::new(DidResolver::new(client.clone()));
    let registrar = Arc::new(DidRegistrar::new(client.clone()));
    let registry = AnonCredsRegistry::new(resolver.clone(), registrar.clone(), client.clone());
    Harness {
        ledger,
        client,
        resolver,
        registrar,
        registry,
    }
}
