crate::resource_id! {
    /// A Cosmos DB for PostgreSQL cluster.
    pub struct ServerGroupsv2Id("Server Groupsv 2") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftDBforPostgreSQL", "Microsoft.DBforPostgreSQL"),
            static_segment("staticServerGroupsv2", "serverGroupsv2"),
            user_specified("serverGroupsv2Name"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            server_groupsv2_name: "serverGroupsv2Name" => "Server Groupsv 2 Name",
        },
    }
}
