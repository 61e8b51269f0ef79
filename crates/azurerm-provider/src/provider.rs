use crate::clients::Clients;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resource::Resource;
use crate::resources;

/// Registry of the resource types this provider manages.
pub struct Provider {
    resources: Vec<Box<dyn Resource>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        Self::with_resources(resources::all())
    }

    pub fn with_resources(resources: Vec<Box<dyn Resource>>) -> Self {
        Self { resources }
    }

    pub fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .iter()
            .find(|r| r.resource_type() == resource_type)
            .map(Box::as_ref)
            .ok_or_else(|| ProviderError::UnknownResourceType(resource_type.to_string()))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.iter().map(|r| r.resource_type())
    }

    /// Build the clients every resource operation shares.
    pub fn configure(&self, config: &ProviderConfig) -> Result<Clients, ProviderError> {
        tracing::info!(
            subscription_id = %config.subscription_id,
            environment = ?config.environment,
            endpoint = %config.resource_manager_endpoint,
            "configuring provider"
        );
        Clients::build(config)
    }
}
