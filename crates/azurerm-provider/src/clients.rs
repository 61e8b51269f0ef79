use std::sync::Arc;

use azurerm_sdk::resource_manager::{appconfiguration, keyvault, resources, storage};
use azurerm_sdk::{ArmClient, ClientOptions, Environment};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::features::UserFeatures;

/// Everything a resource needs to talk to Azure, built once by
/// [`Provider::configure`](crate::provider::Provider::configure).
#[derive(Debug, Clone)]
pub struct Clients {
    pub subscription_id: String,
    pub tenant_id: Option<String>,
    pub environment: Environment,
    pub features: UserFeatures,
    pub arm: Arc<ArmClient>,
    pub resources: resources::v2022_09_01::Client,
    pub app_configuration: appconfiguration::v2024_05_01::Client,
    pub storage: storage::v2023_01_01::Client,
    pub key_vault: keyvault::v2023_07_01::Client,
}

impl Clients {
    pub fn build(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let options = ClientOptions {
            register_providers: !config.skip_provider_registration,
            ..ClientOptions::default()
        };
        let arm = ArmClient::new(&config.resource_manager_endpoint, config.token_credential(), options)?;
        let mut clients = Self::from_arm_client(Arc::new(arm), &config.subscription_id, config.features.clone());
        clients.tenant_id = config.tenant_id.clone();
        clients.environment = config.environment;
        Ok(clients)
    }

    pub fn from_arm_client(arm: Arc<ArmClient>, subscription_id: &str, features: UserFeatures) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            tenant_id: None,
            environment: Environment::Public,
            features,
            resources: resources::v2022_09_01::Client::new(arm.clone()),
            app_configuration: appconfiguration::v2024_05_01::Client::new(arm.clone()),
            storage: storage::v2023_01_01::Client::new(arm.clone()),
            key_vault: keyvault::v2023_07_01::Client::new(arm.clone()),
            arm,
        }
    }

    /// Interval between the provider's own status checks, e.g. waiting for
    /// a purge to finish.
    pub fn poll_interval(&self) -> std::time::Duration {
        self.arm.options().poll_interval
    }
}
