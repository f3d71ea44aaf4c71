//! Tests for the AnonCreds registry adapter over an in-memory registry contract.

mod common;

use common::{harness, ISSUER};
use did_zksync::models::anoncreds::{
    CredentialDefinitionBody, RegisterCredentialDefinitionOptions, RegisterSchemaOptions,
    RegistrationState, Schema,
};
use did_zksync::models::resolution::NOT_FOUND;
use did_zksync::ErrorKind;
use serde_json::Map;

fn degree_schema(issuer: &str) -> RegisterSchemaOptions {
    RegisterSchemaOptions {
        schema: Schema {
            attr_names: vec!["name".into(), "date".into()],
            name: "Degree".into(),
            version: "1.0".into(),
            issuer_id: issuer.into(),
        },
        options: Map::new(),
    }
}

// A registered schema reads back with the same name, version and attribute order.
#[tokio::test]
async fn register_then_get_schema() {
    let h = harness();

    let registered =
        h.registry.register_schema(degree_schema(ISSUER)).await.expect("should not error");
    let state = registered.schema_state;
    assert_eq!(state.state, RegistrationState::Finished);
    let schema_id = state.schema_id.expect("should return schema id");
    assert!(schema_id.starts_with(&format!("{ISSUER}/resources/")));

    let fetched = h.registry.get_schema(&schema_id).await.expect("should not error");
    assert_eq!(fetched.schema_id, schema_id);
    assert!(fetched.resolution_metadata.error.is_none());
    let schema = fetched.schema.expect("should return schema");
    assert_eq!(schema.name, "Degree");
    assert_eq!(schema.version, "1.0");
    assert_eq!(schema.attr_names, vec!["name", "date"]);
    assert_eq!(schema.issuer_id, ISSUER);
}

// Reading a schema twice without writes in between gives the same envelope.
#[tokio::test]
async fn get_schema_is_idempotent() {
    let h = harness();
    let registered =
        h.registry.register_schema(degree_schema(ISSUER)).await.expect("should not error");
    let schema_id = registered.schema_state.schema_id.expect("should return schema id");

    let first = h.registry.get_schema(&schema_id).await.expect("should not error");
    let second = h.registry.get_schema(&schema_id).await.expect("should not error");
    assert_eq!(first, second);
}

#[tokio::test]
async fn unregistered_schema_is_not_found() {
    let h = harness();
    let schema_id = format!("{ISSUER}/resources/9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a");

    let fetched = h.registry.get_schema(&schema_id).await.expect("should not error");
    assert!(fetched.schema.is_none());
    assert_eq!(fetched.resolution_metadata.error.as_deref(), Some(NOT_FOUND));
}

#[tokio::test]
async fn schema_id_that_is_not_a_resource_is_not_found() {
    let h = harness();

    let fetched = h.registry.get_schema(ISSUER).await.expect("should not error");
    assert!(fetched.schema.is_none());
    assert_eq!(fetched.resolution_metadata.error.as_deref(), Some(NOT_FOUND));
}

// A corrupt stored resource still resolves, to a schema with empty fields.
#[tokio::test]
async fn malformed_schema_payload_yields_empty_schema() {
    let h = harness();
    let schema_id = format!("{ISSUER}/resources/9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a");
    h.ledger.put_schema(&schema_id, "{not json");

    let fetched = h.registry.get_schema(&schema_id).await.expect("should not error");
    let schema = fetched.schema.expect("should return schema");
    assert!(schema.name.is_empty());
    assert!(schema.attr_names.is_empty());
}

#[tokio::test]
async fn schema_with_invalid_issuer_fails_without_writing() {
    let h = harness();

    let registered = h
        .registry
        .register_schema(degree_schema("did:web:example.com"))
        .await
        .expect("should not error");
    assert_eq!(registered.schema_state.state, RegistrationState::Failed);
    assert!(registered.schema_state.schema_id.is_none());
    assert!(registered.schema_state.reason.is_some());
    assert_eq!(h.ledger.connects(), 0);
}

// Ledger failures during registration come back as a failed envelope, not an error.
#[tokio::test]
async fn reverted_schema_registration_reports_failed_state() {
    let h = harness();
    h.ledger.revert_writes(true);

    let registered =
        h.registry.register_schema(degree_schema(ISSUER)).await.expect("should not error");
    assert_eq!(registered.schema_state.state, RegistrationState::Failed);
    let reason = registered.schema_state.reason.expect("should give reason");
    assert!(reason.starts_with("Failed to register schema"), "{reason}");
}

#[tokio::test]
async fn register_then_get_credential_definition() {
    let h = harness();
    let schema_id = h
        .registry
        .register_schema(degree_schema(ISSUER))
        .await
        .expect("should not error")
        .schema_state
        .schema_id
        .expect("should return schema id");

    let registered = h
        .registry
        .register_credential_definition(RegisterCredentialDefinitionOptions {
            credential_definition: CredentialDefinitionBody {
                schema_id: schema_id.clone(),
                issuer_id: ISSUER.into(),
                tag: "default".into(),
            },
            options: Map::new(),
        })
        .await
        .expect("should not error");
    let state = registered.credential_definition_state;
    assert_eq!(state.state, RegistrationState::Finished);
    let id = state.credential_definition_id.expect("should return id");

    let fetched = h.registry.get_credential_definition(&id).await.expect("should not error");
    assert!(fetched.resolution_metadata.error.is_none());
    let definition = fetched.credential_definition.expect("should return definition");
    assert_eq!(definition.schema_id, schema_id);
    assert_eq!(definition.issuer_id, ISSUER);
    assert_eq!(definition.type_, "CL");
    assert_eq!(definition.tag, "default");
}

// The contract answers unknown ids with empty strings; that must not crash the adapter.
#[tokio::test]
async fn unregistered_credential_definition_has_empty_fields() {
    let h = harness();
    let id = format!("{ISSUER}/resources/1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d");

    let fetched = h.registry.get_credential_definition(&id).await.expect("should not error");
    let definition = fetched.credential_definition.expect("should return definition");
    assert!(definition.schema_id.is_empty());
    assert!(definition.issuer_id.is_empty());
}

#[tokio::test]
async fn credential_definition_lookup_failure_is_not_found() {
    let h = harness();
    h.ledger.fail_probe(true);
    let id = format!("{ISSUER}/resources/1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d");

    let fetched = h.registry.get_credential_definition(&id).await.expect("should not error");
    assert!(fetched.credential_definition.is_none());
    assert_eq!(fetched.resolution_metadata.error.as_deref(), Some(NOT_FOUND));
}

#[tokio::test]
async fn revocation_operations_are_not_implemented() {
    let h = harness();
    let id = format!("{ISSUER}/resources/1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d");

    let errors = [
        h.registry.get_revocation_registry_definition(&id).await.unwrap_err(),
        h.registry.register_revocation_registry_definition(Map::new()).await.unwrap_err(),
        h.registry.get_revocation_status_list(&id, 0).await.unwrap_err(),
        h.registry.register_revocation_status_list(Map::new()).await.unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }
}

#[test]
fn supports_only_zksync_identifiers() {
    let h = harness();
    assert!(h.registry.supports_identifier(ISSUER));
    assert!(h
        .registry
        .supports_identifier(&format!("{ISSUER}/resources/1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d")));
    assert!(!h.registry.supports_identifier("did:cheqd:testnet:abc"));
}
