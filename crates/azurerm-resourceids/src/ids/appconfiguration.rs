crate::resource_id! {
    pub struct ConfigurationStoreId("Configuration Store") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftAppConfiguration", "Microsoft.AppConfiguration"),
            static_segment("staticConfigurationStores", "configurationStores"),
            user_specified("configurationStoreName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            configuration_store_name: "configurationStoreName" => "Configuration Store Name",
        },
    }
}

crate::resource_id! {
    /// A soft-deleted store, addressed by the location it was deleted from.
    pub struct DeletedConfigurationStoreId("Deleted Configuration Store") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftAppConfiguration", "Microsoft.AppConfiguration"),
            static_segment("staticLocations", "locations"),
            user_specified("locationName"),
            static_segment("staticDeletedConfigurationStores", "deletedConfigurationStores"),
            user_specified("deletedConfigurationStoreName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            location_name: "locationName" => "Location Name",
            deleted_configuration_store_name: "deletedConfigurationStoreName" => "Deleted Configuration Store Name",
        },
    }
}

crate::resource_id! {
    pub struct PrivateLinkResourceId("Private Link Resource") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftAppConfiguration", "Microsoft.AppConfiguration"),
            static_segment("staticConfigurationStores", "configurationStores"),
            user_specified("configurationStoreName"),
            static_segment("staticPrivateLinkResources", "privateLinkResources"),
            user_specified("privateLinkResourceName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            configuration_store_name: "configurationStoreName" => "Configuration Store Name",
            private_link_resource_name: "privateLinkResourceName" => "Private Link Resource Name",
        },
    }
}

crate::resource_id! {
    pub struct ReplicaId("Replica") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftAppConfiguration", "Microsoft.AppConfiguration"),
            static_segment("staticConfigurationStores", "configurationStores"),
            user_specified("configurationStoreName"),
            static_segment("staticReplicas", "replicas"),
            user_specified("replicaName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            configuration_store_name: "configurationStoreName" => "Configuration Store Name",
            replica_name: "replicaName" => "Replica Name",
        },
    }
}

impl ConfigurationStoreId {
    pub fn private_link_resource(&self, name: impl Into<String>) -> PrivateLinkResourceId {
        PrivateLinkResourceId::new(
            &self.subscription_id,
            &self.resource_group_name,
            &self.configuration_store_name,
            name,
        )
    }

    pub fn replica(&self, name: impl Into<String>) -> ReplicaId {
        ReplicaId::new(
            &self.subscription_id,
            &self.resource_group_name,
            &self.configuration_store_name,
            name,
        )
    }
}
