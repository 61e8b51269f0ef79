use std::sync::Arc;
use std::time::Duration;

use azurerm_resourceids::ids::appconfiguration::ConfigurationStoreId;
use azurerm_resourceids::ids::commonids::ResourceGroupId;
use azurerm_sdk::resource_manager::appconfiguration::v2024_05_01::configuration_stores::ConfigurationStoresClient;
use azurerm_sdk::resource_manager::resources::v2022_09_01::resource_groups::ResourceGroupsClient;
use azurerm_sdk::{ArmClient, ClientOptions, Page, StaticTokenCredential};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Arc<ArmClient> {
    let options = ClientOptions {
        retry_delay: Duration::from_millis(10),
        poll_interval: Duration::from_millis(10),
        ..ClientOptions::default()
    };
    Arc::new(ArmClient::new(&server.uri(), Arc::new(StaticTokenCredential::new("t")), options).unwrap())
}

#[test]
fn page_tolerates_missing_fields() {
    let page: Page<serde_json::Value> = serde_json::from_value(json!({})).unwrap();
    assert!(page.value.is_empty());
    assert!(page.next_link.is_none());
}

#[tokio::test]
async fn list_follows_next_link() {
    let server = MockServer::start().await;
    let next = format!("{}/subscriptions/sub/resourceGroups/rg/resources?api-version=2022-09-01&%24skiptoken=abc", server.uri());

    Mock::given(method("GET"))
        .and(path("/subscriptions/sub/resourceGroups/rg/resources"))
        .and(query_param("$skiptoken", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "/r/3", "name": "three", "type": "Microsoft.Storage/storageAccounts"}]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub/resourceGroups/rg/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "/r/1", "name": "one"}, {"id": "/r/2", "name": "two"}],
            "nextLink": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = ResourceGroupsClient::new(client(&server));
    let resources = groups.list_resources(&ResourceGroupId::new("sub", "rg")).await.unwrap();

    let names: Vec<_> = resources.iter().filter_map(|r| r.name.as_deref()).collect();
    assert_eq!(names, ["one", "two", "three"]);
    assert_eq!(resources[2].kind.as_deref(), Some("Microsoft.Storage/storageAccounts"));
}

#[tokio::test]
async fn post_lists_page_with_post() {
    let server = MockServer::start().await;
    let keys_path = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.AppConfiguration/configurationStores/store1/listKeys";

    Mock::given(method("POST"))
        .and(path(keys_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"id": "k1", "name": "Primary", "value": "secret", "connectionString": "Endpoint=...", "readOnly": false},
                {"id": "k2", "name": "Primary Read Only", "value": "secret2", "readOnly": true}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stores = ConfigurationStoresClient::new(client(&server));
    let keys = stores
        .list_keys(&ConfigurationStoreId::new("sub", "rg", "store1"))
        .await
        .unwrap();

    assert_eq!(keys.len(), 2);
    assert_eq!(keys[1].read_only, Some(true));
}
