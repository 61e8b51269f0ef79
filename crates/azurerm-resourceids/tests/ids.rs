use azurerm_resourceids::ids::appconfiguration::{
    ConfigurationStoreId, DeletedConfigurationStoreId, PrivateLinkResourceId, ReplicaId,
};
use azurerm_resourceids::ids::authorization::ScopedLockId;
use azurerm_resourceids::ids::commonids::{ResourceGroupId, SubscriptionId};
use azurerm_resourceids::ids::keyvault::{DeletedVaultId, KeyId, VaultId};
use azurerm_resourceids::ids::managedidentity::UserAssignedIdentityId;
use azurerm_resourceids::ids::postgres::ServerGroupsv2Id;
use azurerm_resourceids::ids::storage::{StorageAccountId, TableId};
use azurerm_resourceids::{ParseError, ResourceId};

const PRIVATE_LINK: &str = "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/example-resource-group/providers/Microsoft.AppConfiguration/configurationStores/store1/privateLinkResources/configurationStores";

#[test]
fn private_link_resource_id_parses_into_fields() {
    let id = PrivateLinkResourceId::parse(PRIVATE_LINK).unwrap();
    assert_eq!(id.subscription_id, "12345678-1234-9876-4563-123456789012");
    assert_eq!(id.resource_group_name, "example-resource-group");
    assert_eq!(id.configuration_store_name, "store1");
    assert_eq!(id.private_link_resource_name, "configurationStores");
    assert_eq!(id.id(), PRIVATE_LINK);
}

#[test]
fn private_link_resource_id_from_parent() {
    let store = ConfigurationStoreId::new("12345678-1234-9876-4563-123456789012", "example-resource-group", "store1");
    assert_eq!(store.private_link_resource("configurationStores").id(), PRIVATE_LINK);
}

/// Round-trips an ID, then checks that every strict prefix and an extended
/// form of it fail to parse.
fn assert_codec<T>(id: T)
where
    T: ResourceId + PartialEq + std::fmt::Debug,
{
    let formatted = id.id();
    let parsed = azurerm_resourceids::parse_id::<T>(&formatted).unwrap();
    assert_eq!(parsed, id);

    let components: Vec<&str> = formatted.trim_start_matches('/').split('/').collect();
    for len in 1..components.len() {
        let truncated = format!("/{}", components[..len].join("/"));
        assert!(
            azurerm_resourceids::parse_id::<T>(&truncated).is_err(),
            "{truncated} should not parse as {}",
            T::ID_TYPE
        );
    }

    let extended = format!("{formatted}/extra");
    assert!(azurerm_resourceids::parse_id::<T>(&extended).is_err());
}

#[test]
fn typed_ids_round_trip_and_reject_truncation() {
    assert_codec(SubscriptionId::new("sub"));
    assert_codec(ResourceGroupId::new("sub", "rg"));
    assert_codec(ConfigurationStoreId::new("sub", "rg", "store"));
    assert_codec(DeletedConfigurationStoreId::new("sub", "westeurope", "store"));
    assert_codec(PrivateLinkResourceId::new("sub", "rg", "store", "group"));
    assert_codec(ReplicaId::new("sub", "rg", "store", "replica1"));
    assert_codec(StorageAccountId::new("sub", "rg", "acct"));
    assert_codec(TableId::new("sub", "rg", "acct", "table1"));
    assert_codec(VaultId::new("sub", "rg", "vault"));
    assert_codec(DeletedVaultId::new("sub", "westeurope", "vault"));
    assert_codec(KeyId::new("sub", "rg", "vault", "key1"));
    assert_codec(ServerGroupsv2Id::new("sub", "rg", "cluster"));
    assert_codec(UserAssignedIdentityId::new("sub", "rg", "identity1"));
}

#[test]
fn insensitive_parse_preserves_user_values() {
    let input = "/Subscriptions/SUB/resourcegroups/My-Group/providers/microsoft.keyvault/VAULTS/Vault-One/Keys/Key-A";
    assert!(KeyId::parse(input).is_err());

    let id = KeyId::parse_insensitively(input).unwrap();
    assert_eq!(id, KeyId::new("SUB", "My-Group", "Vault-One", "Key-A"));
    assert_eq!(
        id.id(),
        "/subscriptions/SUB/resourceGroups/My-Group/providers/Microsoft.KeyVault/vaults/Vault-One/keys/Key-A"
    );
}

#[test]
fn user_assigned_identity_id_normalizes_casing() {
    let input = "/subscriptions/sub/resourcegroups/rg/providers/Microsoft.ManagedIdentity/UserAssignedIdentities/Identity1";
    assert!(UserAssignedIdentityId::parse(input).is_err());

    let id = UserAssignedIdentityId::parse_insensitively(input).unwrap();
    assert_eq!(id.user_assigned_identity_name, "Identity1");
    assert_eq!(
        id.id(),
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/Identity1"
    );
}

#[test]
fn table_id_requires_the_default_table_service() {
    let bad = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct/tableServices/other/tables/t1";
    let err = TableId::parse(bad).unwrap_err();
    assert_eq!(err.segment(), Some("staticDefault"));
}

#[test]
fn scoped_lock_round_trips_with_nested_scope() {
    let id = ScopedLockId::new(
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct",
        "no-delete",
    );
    let formatted = id.id();
    assert_eq!(
        formatted,
        "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct/providers/Microsoft.Authorization/locks/no-delete"
    );
    assert_eq!(ScopedLockId::parse(&formatted).unwrap(), id);
}

#[test]
fn wrong_provider_is_reported() {
    let input = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Web/storageAccounts/acct";
    let err = StorageAccountId::parse(input).unwrap_err();
    match err {
        ParseError::SegmentMismatch { segment, value, .. } => {
            assert_eq!(segment, "staticMicrosoftStorage");
            assert_eq!(value, "Microsoft.Web");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn display_describes_the_id() {
    let id = ConfigurationStoreId::new("sub", "rg", "store");
    assert_eq!(
        id.to_string(),
        r#"Configuration Store (Subscription: "sub" / Resource Group Name: "rg" / Configuration Store Name: "store")"#
    );
}

#[test]
fn ids_serialize_as_arm_uris() {
    let id = VaultId::new("sub", "rg", "vault");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(
        json,
        r#""/subscriptions/sub/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/vault""#
    );
    let back: VaultId = serde_json::from_str(&json.to_lowercase()).unwrap();
    assert_eq!(back.vault_name, "vault");
}

#[test]
fn from_str_uses_the_strict_parser() {
    let id: ResourceGroupId = "/subscriptions/sub/resourceGroups/rg".parse().unwrap();
    assert_eq!(id.resource_group_name, "rg");
    assert!("/subscriptions/sub/resourcegroups/rg".parse::<ResourceGroupId>().is_err());
}

#[test]
fn validate_names_the_attribute() {
    assert!(VaultId::validate("/subscriptions/s/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/v", "key_vault_id").is_ok());

    let err = VaultId::validate("/subscriptions/s/resourceGroups/rg", "key_vault_id").unwrap_err();
    assert!(err.starts_with("parsing \"key_vault_id\""), "{err}");
    assert!(err.contains("vaultName"), "{err}");
}
