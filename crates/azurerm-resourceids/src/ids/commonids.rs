crate::resource_id! {
    /// `/subscriptions/{subscriptionId}`
    pub struct SubscriptionId("Subscription") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
        },
    }
}

crate::resource_id! {
    /// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}`
    pub struct ResourceGroupId("Resource Group") {
        segments: [
            static_segment("staticSubscriptions", "subscriptions"),
            subscription_id("subscriptionId"),
            static_segment("staticResourceGroups", "resourceGroups"),
            resource_group("resourceGroupName"),
        ],
        fields: {
            subscription_id: "subscriptionId" => "Subscription",
            resource_group_name: "resourceGroupName" => "Resource Group Name",
        },
    }
}
