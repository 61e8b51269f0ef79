crate::resource_id! {
    pub struct VaultId("Key Vault") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftKeyVault", "Microsoft.KeyVault"),
            static_segment("staticVaults", "vaults"),
            user_specified("vaultName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            vault_name: "vaultName" => "Vault Name",
        },
    }
}

crate::resource_id! {
    pub struct DeletedVaultId("Deleted Vault") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftKeyVault", "Microsoft.KeyVault"),
            static_segment("staticLocations", "locations"),
            user_specified("locationName"),
            static_segment("staticDeletedVaults", "deletedVaults"),
            user_specified("deletedVaultName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            location_name: "locationName" => "Location Name",
            deleted_vault_name: "deletedVaultName" => "Deleted Vault Name",
        },
    }
}

crate::resource_id! {
    pub struct KeyId("Key") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftKeyVault", "Microsoft.KeyVault"),
            static_segment("staticVaults", "vaults"),
            user_specified("vaultName"),
            static_segment("staticKeys", "keys"),
            user_specified("keyName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            vault_name: "vaultName" => "Vault Name",
            key_name: "keyName" => "Key Name",
        },
    }
}
