mod common;

use azurerm_provider::{orchestrate, Action, Manifest, Provider, ProviderError, ResourceAddr, UserFeatures};
use common::{clients, manifest, persistence, seed, TENANT};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STORE_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/example-rg/providers/Microsoft.AppConfiguration/configurationStores/appconf1";
const DELETED_STORE_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000001/providers/Microsoft.AppConfiguration/locations/westeurope/deletedConfigurationStores/appconf1";
const NAME_CHECK_PATH: &str =
    "/subscriptions/00000000-0000-0000-0000-000000000001/providers/Microsoft.AppConfiguration/checkNameAvailability";
const IDENTITY_ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/example-rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/uai1";
const CLIENT_ID: &str = "11111111-2222-3333-4444-555555555555";
const KEY_ID: &str = "https://kv1.vault.azure.net/keys/appconf/0123456789abcdef";

fn addr() -> ResourceAddr {
    ResourceAddr::new("azurerm_app_configuration", "main")
}

fn store_manifest(extra: Value) -> Manifest {
    let mut config = json!({
        "name": "appconf1",
        "resource_group_name": "example-rg",
        "location": "West Europe",
        "sku": "standard"
    });
    if let (Some(config), Value::Object(extra)) = (config.as_object_mut(), extra) {
        config.extend(extra);
    }
    manifest(json!([{"type": "azurerm_app_configuration", "name": "main", "config": config}]))
}

/// `{IDENTITY_ID: {}}`, as sent for a user-assigned identity.
fn user_assigned() -> Value {
    let mut map = serde_json::Map::new();
    map.insert(IDENTITY_ID.to_string(), json!({}));
    Value::Object(map)
}

fn store_body(purge_protection: bool) -> Value {
    json!({
        "id": STORE_PATH,
        "name": "appconf1",
        "location": "westeurope",
        "sku": {"name": "standard"},
        "properties": {
            "provisioningState": "Succeeded",
            "endpoint": "https://appconf1.azconfig.io",
            "disableLocalAuth": false,
            "enablePurgeProtection": purge_protection,
            "softDeleteRetentionInDays": 7,
            "dataPlaneProxy": {"authenticationMode": "Local", "privateLinkDelegation": "Disabled"}
        }
    })
}

fn keys_body() -> Value {
    let key = |id: &str, name: &str, read_only: bool| {
        json!({
            "id": id,
            "name": name,
            "value": format!("secret-{id}"),
            "connectionString": format!("Endpoint=https://appconf1.azconfig.io;Id={id};Secret=secret-{id}"),
            "readOnly": read_only
        })
    };
    json!({"value": [
        key("k1", "Primary", false),
        key("k2", "Primary Read Only", true),
        key("k3", "Secondary", false),
        key("k4", "Secondary Read Only", true)
    ]})
}

/// The GETs a refresh makes once the store exists: the store, its keys
/// and its replicas.
async fn mount_read(server: &MockServer, store: Value, replicas: Value) {
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(store))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{STORE_PATH}/listKeys")))
        .respond_with(ResponseTemplate::new(200).set_body_json(keys_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{STORE_PATH}/replicas")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": replicas})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_recovers_a_soft_deleted_store_and_flattens_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DELETED_STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": DELETED_STORE_PATH,
            "name": "appconf1",
            "properties": {"location": "westeurope", "configurationStoreId": STORE_PATH}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(STORE_PATH))
        .and(body_partial_json(json!({
            "location": "westeurope",
            "sku": {"name": "standard"},
            "properties": {"createMode": "Recover", "disableLocalAuth": false, "enablePurgeProtection": false}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body(false)))
        .expect(1)
        .mount(&server)
        .await;
    mount_read(&server, store_body(false), json!([])).await;

    let provider = Provider::new();
    let clients = clients(&server, UserFeatures::default());
    let (_dir, persistence) = persistence();
    let manifest = store_manifest(json!({}));

    let plan = azurerm_provider::apply(&provider, &clients, &manifest, &persistence).await.unwrap();
    assert_eq!(plan.count(Action::Create), 1);

    let mut state = persistence.load().await.unwrap();
    let attributes = &state.get(&addr()).unwrap().attributes;
    assert_eq!(attributes.get("endpoint"), Some(&json!("https://appconf1.azconfig.io")));
    assert_eq!(attributes["primary_write_key"]["id"], json!("k1"));
    assert_eq!(attributes["primary_write_key"]["secret"], json!("secret-k1"));
    assert_eq!(attributes["primary_read_key"]["secret"], json!("secret-k2"));
    assert_eq!(attributes["secondary_write_key"]["id"], json!("k3"));
    assert_eq!(
        attributes["secondary_read_key"]["connection_string"],
        json!("Endpoint=https://appconf1.azconfig.io;Id=k4;Secret=secret-k4")
    );

    let plan = orchestrate::plan(&provider, &clients, &manifest, &mut state).await.unwrap();
    assert!(!plan.has_changes(), "{plan}");
}

#[tokio::test]
async fn missing_permission_to_check_deleted_stores_fails_the_create() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DELETED_STORE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": "AuthorizationFailed", "message": "no read access"}
        })))
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
        &store_manifest(json!({})),
        &persistence,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("recover_soft_deleted = false"), "{err}");
}

#[tokio::test]
async fn identity_and_encryption_are_sent_and_read_back() {
    let server = MockServer::start().await;
    // The API hands identity IDs back with a lower-cased `resourcegroups`.
    let mut assigned = serde_json::Map::new();
    assigned.insert(
        IDENTITY_ID.replace("resourceGroups", "resourcegroups"),
        json!({"clientId": CLIENT_ID, "principalId": "99999999-0000-0000-0000-000000000000"}),
    );
    let mut created = store_body(false);
    created["identity"] = json!({"type": "UserAssigned", "userAssignedIdentities": assigned});
    created["properties"]["encryption"] = json!({
        "keyVaultProperties": {"keyIdentifier": KEY_ID, "identityClientId": CLIENT_ID}
    });

    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DELETED_STORE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(STORE_PATH))
        .and(body_partial_json(json!({
            "identity": {"type": "UserAssigned", "userAssignedIdentities": user_assigned()},
            "properties": {
                "encryption": {"keyVaultProperties": {"keyIdentifier": KEY_ID, "identityClientId": CLIENT_ID}}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&server)
        .await;
    mount_read(&server, created, json!([])).await;

    let provider = Provider::new();
    let clients = clients(&server, UserFeatures::default());
    let (_dir, persistence) = persistence();
    let manifest = store_manifest(json!({
        "identity": [{"type": "UserAssigned", "identity_ids": [IDENTITY_ID]}],
        "encryption": [{"key_vault_key_identifier": KEY_ID, "identity_client_id": CLIENT_ID}]
    }));

    azurerm_provider::apply(&provider, &clients, &manifest, &persistence).await.unwrap();

    let mut state = persistence.load().await.unwrap();
    let attributes = &state.get(&addr()).unwrap().attributes;
    assert_eq!(attributes["identity"][0]["type"], json!("UserAssigned"));
    assert_eq!(attributes["identity"][0]["identity_ids"], json!([IDENTITY_ID]));
    assert_eq!(attributes["encryption"][0]["key_vault_key_identifier"], json!(KEY_ID));
    assert_eq!(attributes["encryption"][0]["identity_client_id"], json!(CLIENT_ID));

    let plan = orchestrate::plan(&provider, &clients, &manifest, &mut state).await.unwrap();
    assert!(!plan.has_changes(), "{plan}");
}

#[tokio::test]
async fn changed_identity_is_patched() {
    let server = MockServer::start().await;
    let mut existing = store_body(false);
    existing["identity"] = json!({
        "type": "SystemAssigned",
        "principalId": "99999999-0000-0000-0000-000000000000",
        "tenantId": TENANT
    });
    mount_read(&server, existing, json!([])).await;
    Mock::given(method("PATCH"))
        .and(path(STORE_PATH))
        .and(body_partial_json(json!({
            "identity": {"type": "SystemAssigned, UserAssigned", "userAssignedIdentities": user_assigned()}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body(false)))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, persistence) = persistence();
    seed(&persistence, addr(), "azurerm_app_configuration", STORE_PATH, json!({"name": "appconf1"})).await;

    let manifest = store_manifest(json!({
        "identity": [{"type": "SystemAssigned, UserAssigned", "identity_ids": [IDENTITY_ID]}]
    }));
    let plan = azurerm_provider::apply(
        &Provider::new(),
        &clients(&server, UserFeatures::default()),
        &manifest,
        &persistence,
    )
    .await
    .unwrap();
    assert_eq!(plan.entry(&addr()).unwrap().action, Action::Update);
}

#[tokio::test]
async fn identity_ids_require_a_user_assigned_type() {
    let server = MockServer::start().await;
    let manifest = store_manifest(json!({
        "identity": [{"type": "SystemAssigned", "identity_ids": [IDENTITY_ID]}],
        "encryption": [{"identity_client_id": "not-a-uuid"}]
    }));

    let err = orchestrate::plan(
        &Provider::new(),
        &clients(&server, UserFeatures::default()),
        &manifest,
        &mut Default::default(),
    )
    .await
    .unwrap_err();
    let ProviderError::Validation(errors) = err else {
        panic!("expected a validation error, got {err}");
    };
    assert!(errors.iter().any(|e| e.contains("identity.0.identity_ids")), "{errors:#?}");
    assert!(errors.iter().any(|e| e.contains("encryption.0.identity_client_id")), "{errors:#?}");
}

#[tokio::test]
async fn replicas_are_added_and_removed_on_update() {
    let server = MockServer::start().await;
    let replica = |name: &str, location: &str| {
        json!({
            "id": format!("{STORE_PATH}/replicas/{name}"),
            "name": name,
            "location": location,
            "properties": {"provisioningState": "Succeeded", "endpoint": format!("https://appconf1-{name}.azconfig.io")}
        })
    };

    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body(false)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{STORE_PATH}/listKeys")))
        .respond_with(ResponseTemplate::new(200).set_body_json(keys_body()))
        .mount(&server)
        .await;
    // The refresh sees the old replica, the read after the update the new one.
    Mock::given(method("GET"))
        .and(path(format!("{STORE_PATH}/replicas")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [replica("replica1", "northeurope")]})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{STORE_PATH}/replicas")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [replica("replica2", "eastus")]})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{STORE_PATH}/replicas/replica1")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{STORE_PATH}/replicas/replica2")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{STORE_PATH}/replicas/replica2")))
        .and(body_partial_json(json!({"location": "eastus"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(replica("replica2", "eastus")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, persistence) = persistence();
    seed(&persistence, addr(), "azurerm_app_configuration", STORE_PATH, json!({"name": "appconf1"})).await;

    let manifest = store_manifest(json!({"replica": [{"name": "replica2", "location": "East US"}]}));
    let plan = azurerm_provider::apply(
        &Provider::new(),
        &clients(&server, UserFeatures::default()),
        &manifest,
        &persistence,
    )
    .await
    .unwrap();
    assert_eq!(plan.entry(&addr()).unwrap().action, Action::Update);

    let state = persistence.load().await.unwrap();
    assert_eq!(
        state.get(&addr()).unwrap().attributes.get("replica"),
        Some(&json!([{"name": "replica2", "location": "eastus"}]))
    );
}

#[tokio::test]
async fn destroy_purges_and_waits_for_the_name_to_be_released() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body(false)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DELETED_STORE_PATH}/purge")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DELETED_STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "appconf1"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DELETED_STORE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NAME_CHECK_PATH))
        .and(body_partial_json(json!({
            "name": "appconf1",
            "type": "Microsoft.AppConfiguration/configurationStores"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nameAvailable": false,
            "reason": "AlreadyExists",
            "message": "The specified name is already in use."
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NAME_CHECK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nameAvailable": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, persistence) = persistence();
    seed(&persistence, addr(), "azurerm_app_configuration", STORE_PATH, json!({"name": "appconf1"})).await;

    azurerm_provider::destroy(
        &Provider::new(),
        &clients(&server, UserFeatures::default()),
        &store_manifest(json!({})),
        &persistence,
    )
    .await
    .unwrap();
    assert!(persistence.load().await.unwrap().resources.is_empty());
}

#[tokio::test]
async fn destroy_gives_up_when_the_name_is_never_released() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body(false)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DELETED_STORE_PATH}/purge")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DELETED_STORE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NAME_CHECK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nameAvailable": false})))
        .mount(&server)
        .await;

    let (_dir, persistence) = persistence();
    seed(&persistence, addr(), "azurerm_app_configuration", STORE_PATH, json!({"name": "appconf1"})).await;

    let err = azurerm_provider::destroy(
        &Provider::new(),
        &clients(&server, UserFeatures::default()),
        &store_manifest(json!({})),
        &persistence,
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("still unavailable"), "{err}");
    assert!(persistence.load().await.unwrap().contains(&addr()));
}

#[tokio::test]
async fn purge_is_skipped_when_purge_protection_is_on() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(store_body(true)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(STORE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DELETED_STORE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": DELETED_STORE_PATH,
            "name": "appconf1",
            "properties": {
                "deletionDate": "2026-10-01T10:00:00Z",
                "scheduledPurgeDate": "2026-10-08T10:00:00Z",
                "purgeProtectionEnabled": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, persistence) = persistence();
    seed(&persistence, addr(), "azurerm_app_configuration", STORE_PATH, json!({"name": "appconf1"})).await;

    azurerm_provider::destroy(
        &Provider::new(),
        &clients(&server, UserFeatures::default()),
        &store_manifest(json!({})),
        &persistence,
    )
    .await
    .unwrap();
    assert!(persistence.load().await.unwrap().resources.is_empty());
}
