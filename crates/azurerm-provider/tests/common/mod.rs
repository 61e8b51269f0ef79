//! Shared setup for the provider's wiremock-backed tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use azurerm_provider::state::{ResourceState, ResourceStatus};
use azurerm_provider::{Clients, Manifest, ProviderState, ResourceAddr, StatePersistence, UserFeatures};
use azurerm_sdk::{ArmClient, ClientOptions, StaticTokenCredential};
use serde_json::Value;
use tempfile::TempDir;

pub const SUB: &str = "00000000-0000-0000-0000-000000000001";
pub const TENANT: &str = "00000000-0000-0000-0000-0000000000aa";

/// Clients pointed at the mock server, polling every 10ms.
pub fn clients(server: &wiremock::MockServer, features: UserFeatures) -> Clients {
    let options = ClientOptions {
        retry_delay: Duration::from_millis(10),
        poll_interval: Duration::from_millis(10),
        register_providers: false,
        ..ClientOptions::default()
    };
    let credential = Arc::new(StaticTokenCredential::new("test-token"));
    let arm = ArmClient::new(&server.uri(), credential, options).unwrap();
    Clients::from_arm_client(Arc::new(arm), SUB, features)
}

pub fn persistence() -> (TempDir, StatePersistence) {
    let dir = tempfile::tempdir().unwrap();
    let persistence = StatePersistence::new(dir.path().join("state.json"));
    (dir, persistence)
}

pub fn manifest(resources: Value) -> Manifest {
    serde_json::json!({"resources": resources}).to_string().parse().unwrap()
}

/// Record one resource in otherwise empty state.
pub async fn seed(persistence: &StatePersistence, addr: ResourceAddr, resource_type: &str, id: &str, attributes: Value) {
    let Value::Object(attributes) = attributes else {
        panic!("attributes must be an object");
    };
    let mut state = ProviderState::default();
    state
        .resources
        .insert(addr, ResourceState::new(resource_type, id, ResourceStatus::Created, attributes));
    persistence.flush(&state).await.unwrap();
}
