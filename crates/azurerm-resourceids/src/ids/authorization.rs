crate::resource_id! {
    /// A management lock on any scope, e.g. a resource group or a single resource.
    pub struct ScopedLockId("Scoped Lock") {
        segments: [
            scope("scope"),
            static_segment("staticProviders", "providers"),
            resource_provider("staticMicrosoftAuthorization", "Microsoft.Authorization"),
            static_segment("staticLocks", "locks"),
            user_specified("lockName"),
        ],
        fields: {
            scope: "scope" => "Scope",
            lock_name: "lockName" => "Lock Name",
        },
    }
}
