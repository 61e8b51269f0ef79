crate::resource_id! {
    /// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.ManagedIdentity/userAssignedIdentities/{userAssignedIdentityName}`
    pub struct UserAssignedIdentityId("User Assigned Identity") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftManagedIdentity", "Microsoft.ManagedIdentity"),
            static_segment("staticUserAssignedIdentities", "userAssignedIdentities"),
            user_specified("userAssignedIdentityName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
            user_assigned_identity_name: "userAssignedIdentityName" => "User Assigned Identity Name",
        },
    }
}
