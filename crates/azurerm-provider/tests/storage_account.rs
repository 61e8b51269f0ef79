mod common;

use azurerm_provider::{Action, Manifest, Provider, ProviderError, ResourceAddr, UserFeatures};
use common::{clients, manifest, persistence};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT_PATH: &str =
    "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/example-rg/providers/Microsoft.Storage/storageAccounts/acct1";
const NAME_CHECK_PATH: &str =
    "/subscriptions/00000000-0000-0000-0000-000000000001/providers/Microsoft.Storage/checkNameAvailability";

fn addr() -> ResourceAddr {
    ResourceAddr::new("azurerm_storage_account", "main")
}

fn account_manifest(tags: Value) -> Manifest {
    manifest(json!([{
        "type": "azurerm_storage_account",
        "name": "main",
        "config": {
            "name": "acct1",
            "resource_group_name": "example-rg",
            "location": "West Europe",
            "account_tier": "Standard",
            "account_replication_type": "LRS",
            "tags": tags
        }
    }]))
}

fn account_body(tags: Value) -> Value {
    json!({
        "id": ACCOUNT_PATH,
        "name": "acct1",
        "kind": "StorageV2",
        "location": "westeurope",
        "sku": {"name": "Standard_LRS", "tier": "Standard"},
        "tags": tags,
        "properties": {
            "provisioningState": "Succeeded",
            "accessTier": "Hot",
            "minimumTlsVersion": "TLS1_2",
            "supportsHttpsTrafficOnly": true,
            "primaryLocation": "westeurope",
            "primaryEndpoints": {
                "blob": "https://acct1.blob.core.windows.net/",
                "queue": "https://acct1.queue.core.windows.net/"
            }
        }
    })
}

/// The account read plus its keys.
async fn mount_read(server: &MockServer, tags: Value) {
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body(tags)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNT_PATH}/listKeys")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"keys": [
            {"keyName": "key1", "permissions": "FULL", "value": "primary-secret"},
            {"keyName": "key2", "permissions": "FULL", "value": "secondary-secret"}
        ]})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn unavailable_name_fails_the_create() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NAME_CHECK_PATH))
        .and(body_partial_json(json!({"name": "acct1", "type": "Microsoft.Storage/storageAccounts"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nameAvailable": false,
            "reason": "AlreadyExists",
            "message": "The storage account named acct1 is already taken."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, persistence) = persistence();
    let err = azurerm_provider::apply(
        &Provider::new(),
        &clients(&server, UserFeatures::default()),
        &account_manifest(json!({})),
        &persistence,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ProviderError::CreateFailed(_)), "{err}");
    assert!(err.to_string().contains("already taken"), "{err}");
    assert!(persistence.load().await.unwrap().resources.is_empty());
}

#[tokio::test]
async fn create_update_and_delete() {
    let server = MockServer::start().await;
    let provider = Provider::new();
    let clients = clients(&server, UserFeatures::default());
    let (_dir, persistence) = persistence();

    // Create
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NAME_CHECK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nameAvailable": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(ACCOUNT_PATH))
        .and(body_partial_json(json!({
            "kind": "StorageV2",
            "location": "westeurope",
            "sku": {"name": "Standard_LRS"},
            "tags": {"env": "test"},
            "properties": {"accessTier": "Hot", "minimumTlsVersion": "TLS1_2", "supportsHttpsTrafficOnly": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body(json!({"env": "test"}))))
        .expect(1)
        .mount(&server)
        .await;
    mount_read(&server, json!({"env": "test"})).await;

    let plan = azurerm_provider::apply(&provider, &clients, &account_manifest(json!({"env": "test"})), &persistence)
        .await
        .unwrap();
    assert_eq!(plan.count(Action::Create), 1);

    let state = persistence.load().await.unwrap();
    let attributes = &state.get(&addr()).unwrap().attributes;
    assert_eq!(attributes.get("account_kind"), Some(&json!("StorageV2")));
    assert_eq!(attributes.get("access_tier"), Some(&json!("Hot")));
    assert_eq!(attributes.get("primary_blob_endpoint"), Some(&json!("https://acct1.blob.core.windows.net/")));
    assert_eq!(attributes.get("primary_access_key"), Some(&json!("primary-secret")));
    assert_eq!(attributes.get("secondary_access_key"), Some(&json!("secondary-secret")));
    server.verify().await;
    server.reset().await;

    // Update: only the tags changed, so only the tags are sent
    Mock::given(method("PATCH"))
        .and(path(ACCOUNT_PATH))
        .and(body_partial_json(json!({"tags": {"env": "prod"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body(json!({"env": "prod"}))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body(json!({"env": "test"}))))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_read(&server, json!({"env": "prod"})).await;

    let plan = azurerm_provider::apply(&provider, &clients, &account_manifest(json!({"env": "prod"})), &persistence)
        .await
        .unwrap();
    let entry = plan.entry(&addr()).unwrap();
    assert_eq!(entry.action, Action::Update);
    assert_eq!(entry.changes.len(), 1, "{plan}");
    assert_eq!(entry.changes[0].attribute, "tags");

    let state = persistence.load().await.unwrap();
    assert_eq!(state.get(&addr()).unwrap().attributes.get("tags"), Some(&json!({"env": "prod"})));
    let requests = server.received_requests().await.unwrap_or_default();
    let patch = requests.iter().find(|r| r.method.as_str() == "PATCH").unwrap();
    let body: Value = serde_json::from_slice(&patch.body).unwrap();
    assert!(body.get("sku").is_none() && body.get("kind").is_none(), "{body}");
    server.verify().await;
    server.reset().await;

    // Delete
    Mock::given(method("DELETE"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    azurerm_provider::destroy(&provider, &clients, &account_manifest(json!({"env": "prod"})), &persistence)
        .await
        .unwrap();
    assert!(persistence.load().await.unwrap().resources.is_empty());
}
