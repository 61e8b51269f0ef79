use std::sync::Arc;
use std::time::Duration;

use azurerm_resourceids::ids::appconfiguration::ConfigurationStoreId;
use azurerm_resourceids::ids::commonids::ResourceGroupId;
use azurerm_sdk::resource_manager::appconfiguration::v2024_05_01::configuration_stores::{
    ConfigurationStore, ConfigurationStoresClient, PublicNetworkAccess, Sku,
};
use azurerm_sdk::resource_manager::resources::v2022_09_01::resource_groups::{
    ResourceGroup, ResourceGroupsClient,
};
use azurerm_sdk::{ArmClient, ArmError, ClientOptions, StaticTokenCredential};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RG_PATH: &str = "/subscriptions/sub/resourceGroups/rg";

fn client(server: &MockServer) -> Arc<ArmClient> {
    let options = ClientOptions {
        retry_delay: Duration::from_millis(10),
        poll_interval: Duration::from_millis(10),
        ..ClientOptions::default()
    };
    let credential = Arc::new(StaticTokenCredential::new("test-token"));
    Arc::new(ArmClient::new(&server.uri(), credential, options).unwrap())
}

#[tokio::test]
async fn get_sends_token_and_api_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RG_PATH))
        .and(query_param("api-version", "2022-09-01"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": RG_PATH,
            "name": "rg",
            "location": "westeurope",
            "tags": {"env": "test"},
            "properties": {"provisioningState": "Succeeded"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = ResourceGroupsClient::new(client(&server));
    let response = groups.get(&ResourceGroupId::new("sub", "rg")).await.unwrap();

    assert_eq!(response.status, 200);
    let model = response.model.unwrap();
    assert_eq!(model.location, "westeurope");
    assert_eq!(model.tags.unwrap().get("env").map(String::as_str), Some("test"));
}

#[tokio::test]
async fn unexpected_status_carries_the_arm_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ResourceGroupNotFound", "message": "Resource group 'rg' could not be found."}
        })))
        .mount(&server)
        .await;

    let groups = ResourceGroupsClient::new(client(&server));
    let err = groups.get(&ResourceGroupId::new("sub", "rg")).await.unwrap_err();

    assert!(err.was_not_found());
    assert_eq!(err.code(), Some("ResourceGroupNotFound"));
    let message = err.to_string();
    assert!(message.starts_with("ResourceGroupsClient.Get: responding to request"), "{message}");
    assert!(message.contains("could not be found"), "{message}");
}

#[tokio::test]
async fn non_json_error_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let groups = ResourceGroupsClient::new(client(&server));
    let err = groups.get(&ResourceGroupId::new("sub", "rg")).await.unwrap_err();

    match err {
        ArmError::Response { status, code, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(code, "Unknown");
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_an_unmarshal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let groups = ResourceGroupsClient::new(client(&server));
    let err = groups.get(&ResourceGroupId::new("sub", "rg")).await.unwrap_err();
    assert!(matches!(err, ArmError::Unmarshal { .. }), "{err:?}");
}

#[tokio::test]
async fn throttled_requests_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(RG_PATH))
        .and(body_partial_json(json!({"location": "westeurope"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": RG_PATH,
            "name": "rg",
            "location": "westeurope"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = ResourceGroupsClient::new(client(&server));
    let input = ResourceGroup {
        location: "westeurope".to_string(),
        ..ResourceGroup::default()
    };
    let response = groups
        .create_or_update(&ResourceGroupId::new("sub", "rg"), &input)
        .await
        .unwrap();
    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn throttling_gives_up_after_max_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RG_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": "TooManyRequests", "message": "slow down"}
        })))
        .expect(4)
        .mount(&server)
        .await;

    let groups = ResourceGroupsClient::new(client(&server));
    let err = groups.get(&ResourceGroupId::new("sub", "rg")).await.unwrap_err();
    assert!(err.was_status(429));
}

#[tokio::test]
async fn missing_provider_registration_is_handled() {
    let server = MockServer::start().await;
    let store_path = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.AppConfiguration/configurationStores/store1";

    Mock::given(method("PUT"))
        .and(path(store_path))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": "MissingSubscriptionRegistration", "message": "not registered"}
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/subscriptions/sub/providers/Microsoft.AppConfiguration/register"))
        .and(query_param("api-version", "2016-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"registrationState": "Registering"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub/providers/Microsoft.AppConfiguration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"registrationState": "Registered"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(store_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": store_path,
            "name": "store1",
            "location": "westeurope",
            "sku": {"name": "standard"},
            "properties": {"provisioningState": "Succeeded", "publicNetworkAccess": "enabled"}
        })))
        .mount(&server)
        .await;

    let stores = ConfigurationStoresClient::new(client(&server));
    let input = ConfigurationStore {
        id: None,
        name: None,
        kind: None,
        location: "westeurope".to_string(),
        identity: None,
        sku: Sku { name: "standard".to_string() },
        properties: None,
        system_data: None,
        tags: None,
    };
    let store = stores
        .create_then_poll(&ConfigurationStoreId::new("sub", "rg", "store1"), &input)
        .await
        .unwrap()
        .unwrap();

    // enum values parse whatever the casing ARM returns
    let properties = store.properties.unwrap();
    assert_eq!(properties.public_network_access, Some(PublicNetworkAccess::Enabled));
}
