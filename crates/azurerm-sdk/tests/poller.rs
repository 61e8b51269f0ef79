use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use azurerm_resourceids::ids::appconfiguration::{ConfigurationStoreId, DeletedConfigurationStoreId};
use azurerm_resourceids::ids::keyvault::VaultId;
use azurerm_resourceids::ids::storage::StorageAccountId;
use azurerm_sdk::resource_manager::appconfiguration::v2024_05_01::configuration_stores::{
    ConfigurationStore, ConfigurationStoresClient, Sku,
};
use azurerm_sdk::resource_manager::keyvault::v2023_07_01::vaults::{
    self, VaultCreateOrUpdateParameters, VaultProperties, VaultProvisioningState, VaultsClient,
};
use azurerm_sdk::resource_manager::storage::v2023_01_01::storage_accounts::{
    self, Kind, SkuName, StorageAccountCreateParameters, StorageAccountsClient,
};
use azurerm_sdk::{ArmClient, ArmError, ArmResponse, ClientOptions, Poller, PollingStrategy, StaticTokenCredential};
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STORE_PATH: &str =
    "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.AppConfiguration/configurationStores/store1";

fn client(server: &MockServer) -> Arc<ArmClient> {
    let options = ClientOptions {
        retry_delay: Duration::from_millis(10),
        poll_interval: Duration::from_millis(10),
        ..ClientOptions::default()
    };
    Arc::new(ArmClient::new(&server.uri(), Arc::new(StaticTokenCredential::new("t")), options).unwrap())
}

fn store_input() -> ConfigurationStore {
    ConfigurationStore {
        id: None,
        name: None,
        kind: None,
        location: "westeurope".to_string(),
        identity: None,
        sku: Sku { name: "standard".to_string() },
        properties: None,
        system_data: None,
        tags: None,
    }
}

fn store_body(state: &str) -> serde_json::Value {
    json!({
        "id": STORE_PATH,
        "name": "store1",
        "location": "westeurope",
        "sku": {"name": "standard"},
        "properties": {"provisioningState": state, "endpoint": "https://store1.azconfig.io"}
    })
}

fn response(status: u16, headers: &[(&'static str, &str)], body: serde_json::Value) -> ArmResponse {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(*name, value.parse().unwrap());
    }
    ArmResponse {
        status,
        headers: map,
        body: serde_json::to_vec(&body).unwrap(),
    }
}

#[tokio::test]
async fn strategy_is_picked_from_the_initial_response() {
    let server = MockServer::start().await;
    let client = client(&server);
    let url = client.url_for("op", STORE_PATH).unwrap();
    let status_url = format!("{}/operations/1", server.uri());

    let poller = Poller::new(
        &client,
        "op",
        Method::PUT,
        url.clone(),
        response(201, &[("Azure-AsyncOperation", &status_url), ("Location", "/ignored")], json!({})),
    )
    .unwrap();
    assert!(matches!(poller.strategy(), PollingStrategy::AsyncOperation { .. }));

    let poller = Poller::new(&client, "op", Method::PUT, url.clone(), response(202, &[("Location", "/operations/2")], json!({}))).unwrap();
    assert!(matches!(poller.strategy(), PollingStrategy::Location { .. }));

    let poller = Poller::new(&client, "op", Method::PUT, url.clone(), response(200, &[], store_body("Creating"))).unwrap();
    assert_eq!(poller.strategy(), &PollingStrategy::ProvisioningState);

    let poller = Poller::new(&client, "op", Method::PUT, url.clone(), response(200, &[], store_body("Succeeded"))).unwrap();
    assert_eq!(poller.strategy(), &PollingStrategy::Done);

    let poller = Poller::new(&client, "op", Method::DELETE, url, response(200, &[], store_body("Deleting"))).unwrap();
    assert_eq!(poller.strategy(), &PollingStrategy::Done);
}

#[tokio::test]
async fn async_operation_header_is_polled_until_succeeded() {
    let server = MockServer::start().await;
    let status_url = format!("{}/operations/op1", server.uri());

    Mock::given(method("PUT"))
        .and(path(STORE_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Azure-AsyncOperation", status_url.as_str())
                .set_body_json(store_body("Creating")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/op1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "InProgress"})))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/op1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body("Succeeded")))
        .expect(1)
        .mount(&server)
        .await;

    let stores = ConfigurationStoresClient::new(client(&server));
    let store = stores
        .create_then_poll(&ConfigurationStoreId::new("sub", "rg", "store1"), &store_input())
        .await
        .unwrap()
        .unwrap();

    let properties = store.properties.unwrap();
    assert_eq!(properties.endpoint.as_deref(), Some("https://store1.azconfig.io"));
}

#[tokio::test]
async fn failed_async_operation_surfaces_the_error() {
    let server = MockServer::start().await;
    let status_url = format!("{}/operations/op2", server.uri());

    Mock::given(method("PUT"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(201).insert_header("Azure-AsyncOperation", status_url.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/op2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Failed",
            "error": {"code": "QuotaExceeded", "message": "too many stores"}
        })))
        .mount(&server)
        .await;

    let stores = ConfigurationStoresClient::new(client(&server));
    let err = stores
        .create_then_poll(&ConfigurationStoreId::new("sub", "rg", "store1"), &store_input())
        .await
        .unwrap_err();

    match &err {
        ArmError::LongRunningOperation { status, code, message, .. } => {
            assert_eq!(status, "Failed");
            assert_eq!(code, "QuotaExceeded");
            assert_eq!(message, "too many stores");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.code(), Some("QuotaExceeded"));
}

#[tokio::test]
async fn location_header_is_polled_until_not_accepted() {
    let server = MockServer::start().await;
    let account_path = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct1";
    let location = format!("{}/operations/storage1", server.uri());

    Mock::given(method("PUT"))
        .and(path(account_path))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Location", location.as_str())
                .insert_header("Retry-After", "0"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/storage1"))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/storage1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(account_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": account_path,
            "name": "acct1",
            "kind": "StorageV2",
            "location": "westeurope",
            "sku": {"name": "Standard_LRS", "tier": "Standard"},
            "properties": {
                "provisioningState": "Succeeded",
                "primaryEndpoints": {"blob": "https://acct1.blob.core.windows.net/"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let accounts = StorageAccountsClient::new(client(&server));
    let input = StorageAccountCreateParameters {
        kind: Kind::StorageV2,
        location: "westeurope".to_string(),
        sku: storage_accounts::Sku {
            name: SkuName::StandardLrs,
            tier: None,
        },
        identity: None,
        properties: None,
        tags: None,
    };
    let account = accounts
        .create_then_poll(&StorageAccountId::new("sub", "rg", "acct1"), &input)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(account.sku.unwrap().name, SkuName::StandardLrs);
    let endpoints = account.properties.unwrap().primary_endpoints.unwrap();
    assert_eq!(endpoints.blob.as_deref(), Some("https://acct1.blob.core.windows.net/"));
}

#[tokio::test]
async fn created_with_location_header_is_polled() {
    let server = MockServer::start().await;
    let location = format!("{}/operations/store-create", server.uri());

    let client = client(&server);
    let url = client.url_for("op", STORE_PATH).unwrap();
    let poller = Poller::new(&client, "op", Method::PUT, url, response(201, &[("Location", &location)], json!({}))).unwrap();
    assert!(matches!(poller.strategy(), PollingStrategy::Location { .. }));

    Mock::given(method("PUT"))
        .and(path(STORE_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", location.as_str())
                .set_body_json(json!({})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/store-create"))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/store-create"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body("Succeeded")))
        .expect(1)
        .mount(&server)
        .await;

    let stores = ConfigurationStoresClient::new(client.clone());
    let store = stores
        .create_then_poll(&ConfigurationStoreId::new("sub", "rg", "store1"), &store_input())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        store.properties.unwrap().endpoint.as_deref(),
        Some("https://store1.azconfig.io")
    );
}

#[tokio::test]
async fn provisioning_state_is_polled_on_the_resource() {
    let server = MockServer::start().await;
    let vault_path = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/vault1";
    let vault_body = |state: &str| {
        json!({
            "id": vault_path,
            "name": "vault1",
            "location": "westeurope",
            "properties": {
                "tenantId": "00000000-0000-0000-0000-000000000000",
                "sku": {"family": "A", "name": "Standard"},
                "accessPolicies": [],
                "provisioningState": state,
                "vaultUri": "https://vault1.vault.azure.net/"
            }
        })
    };

    Mock::given(method("PUT"))
        .and(path(vault_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(vault_body("RegisteringDns")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(vault_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(vault_body("RegisteringDns")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(vault_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(vault_body("Succeeded")))
        .expect(1)
        .mount(&server)
        .await;

    let vaults = VaultsClient::new(client(&server));
    let input = VaultCreateOrUpdateParameters {
        location: "westeurope".to_string(),
        properties: VaultProperties {
            tenant_id: "00000000-0000-0000-0000-000000000000".to_string(),
            sku: vaults::Sku {
                family: vaults::SkuFamily::A,
                name: vaults::SkuName::Standard,
            },
            access_policies: Vec::new(),
            create_mode: None,
            enable_purge_protection: None,
            enable_rbac_authorization: None,
            enable_soft_delete: None,
            enabled_for_deployment: None,
            enabled_for_disk_encryption: None,
            enabled_for_template_deployment: None,
            provisioning_state: None,
            public_network_access: None,
            soft_delete_retention_in_days: None,
            vault_uri: None,
        },
        tags: Some(HashMap::from([("env".to_string(), "test".to_string())])),
    };
    let vault = vaults
        .create_or_update_then_poll(&VaultId::new("sub", "rg", "vault1"), &input)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(vault.properties.provisioning_state, Some(VaultProvisioningState::Succeeded));
    // "Standard" in the response still parses to the lower-case constant
    assert_eq!(vault.properties.sku.name, vaults::SkuName::Standard);
}

#[tokio::test]
async fn delete_location_accepts_not_found() {
    let server = MockServer::start().await;
    let location = format!("{}/operations/delete1", server.uri());

    Mock::given(method("DELETE"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(202).insert_header("Location", location.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/delete1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let stores = ConfigurationStoresClient::new(client(&server));
    stores
        .delete_then_poll(&ConfigurationStoreId::new("sub", "rg", "store1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn purge_waits_for_the_operation() {
    let server = MockServer::start().await;
    let purge_path = "/subscriptions/sub/providers/Microsoft.AppConfiguration/locations/westeurope/deletedConfigurationStores/store1/purge";
    let status_url = format!("{}/operations/purge1", server.uri());

    Mock::given(method("POST"))
        .and(path(purge_path))
        .respond_with(ResponseTemplate::new(202).insert_header("Azure-AsyncOperation", status_url.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operations/purge1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
        .expect(1)
        .mount(&server)
        .await;

    let stores = ConfigurationStoresClient::new(client(&server));
    stores
        .purge_deleted_then_poll(&DeletedConfigurationStoreId::new("sub", "westeurope", "store1"))
        .await
        .unwrap();
}
