crate::resource_id! {
    pub struct StorageAccountId("Storage Account") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftStorage", "Microsoft.Storage"),
            static_segment("staticStorageAccounts", "storageAccounts"),
            user_specified("storageAccountName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            storage_account_name: "storageAccountName" => "Storage Account Name",
        },
    }
}

crate::resource_id! {
    /// A table in the account's (single) table service.
    pub struct TableId("Table") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftStorage", "Microsoft.Storage"),
            static_segment("staticStorageAccounts", "storageAccounts"),
            user_specified("storageAccountName"),
            static_segment("staticTableServices", "tableServices"),
            static_segment("staticDefault", "default"),
            static_segment("staticTables", "tables"),
            user_specified("tableName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            storage_account_name: "storageAccountName" => "Storage Account Name",
            table_name: "tableName" => "Table Name",
        },
    }
}
