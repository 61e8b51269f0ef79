//! Provider configuration: the `provider` block merged over `ARM_*`
//! environment variables.

use std::fmt;
use std::sync::Arc;

use azurerm_sdk::{ClientSecretCredential, Environment, StaticTokenCredential, TokenCredential};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;
use crate::features::UserFeatures;

pub const ENV_SUBSCRIPTION_ID: &str = "ARM_SUBSCRIPTION_ID";
pub const ENV_TENANT_ID: &str = "ARM_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "ARM_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "ARM_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "ARM_ACCESS_TOKEN";
pub const ENV_ENVIRONMENT: &str = "ARM_ENVIRONMENT";
pub const ENV_RESOURCE_MANAGER_ENDPOINT: &str = "ARM_RESOURCE_MANAGER_ENDPOINT";
pub const ENV_SKIP_PROVIDER_REGISTRATION: &str = "ARM_SKIP_PROVIDER_REGISTRATION";

/// The `provider` block as written in a manifest. Every field is optional
/// because the environment can supply it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderBlock {
    pub subscription_id: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub environment: Option<String>,
    pub resource_manager_endpoint: Option<String>,
    pub skip_provider_registration: Option<bool>,
    pub features: Option<Value>,
}

#[derive(Clone)]
pub enum Credentials {
    AccessToken(String),
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::ClientSecret {
                tenant_id, client_id, ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

/// Fully resolved provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub subscription_id: String,
    pub tenant_id: Option<String>,
    pub credentials: Credentials,
    pub environment: Environment,
    pub resource_manager_endpoint: String,
    pub skip_provider_registration: bool,
    pub features: UserFeatures,
}

impl ProviderConfig {
    /// Resolve against the process environment.
    pub fn load(block: &ProviderBlock) -> Result<Self, ProviderError> {
        Self::resolve(block, |key| std::env::var(key).ok())
    }

    /// Resolve `block`, falling back to `env` for anything it leaves out.
    /// Values from the block always win.
    pub fn resolve(block: &ProviderBlock, env: impl Fn(&str) -> Option<String>) -> Result<Self, ProviderError> {
        let pick = |value: &Option<String>, key: &str| {
            value
                .clone()
                .or_else(|| env(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let subscription_id = pick(&block.subscription_id, ENV_SUBSCRIPTION_ID).ok_or_else(|| {
            ProviderError::Config(format!(
                "`subscription_id` is a required provider property; set it in the provider block or via {ENV_SUBSCRIPTION_ID}"
            ))
        })?;
        if uuid::Uuid::parse_str(&subscription_id).is_err() {
            return Err(ProviderError::Config(format!(
                "`subscription_id` {subscription_id:?} is not a valid UUID"
            )));
        }

        let environment = match pick(&block.environment, ENV_ENVIRONMENT) {
            Some(name) => name
                .parse::<Environment>()
                .map_err(|e| ProviderError::Config(format!("`environment`: {e}")))?,
            None => Environment::Public,
        };

        let resource_manager_endpoint = pick(&block.resource_manager_endpoint, ENV_RESOURCE_MANAGER_ENDPOINT)
            .unwrap_or_else(|| environment.resource_manager_endpoint().to_string());

        let tenant_id = pick(&block.tenant_id, ENV_TENANT_ID);
        let credentials = match pick(&block.access_token, ENV_ACCESS_TOKEN) {
            Some(token) => Credentials::AccessToken(token),
            None => {
                let client_id = pick(&block.client_id, ENV_CLIENT_ID);
                let client_secret = pick(&block.client_secret, ENV_CLIENT_SECRET);
                match (tenant_id.clone(), client_id, client_secret) {
                    (Some(tenant_id), Some(client_id), Some(client_secret)) => Credentials::ClientSecret {
                        tenant_id,
                        client_id,
                        client_secret,
                    },
                    (tenant, client, secret) => {
                        let missing: Vec<&str> = [
                            ("tenant_id", tenant.is_none()),
                            ("client_id", client.is_none()),
                            ("client_secret", secret.is_none()),
                        ]
                        .iter()
                        .filter(|(_, missing)| *missing)
                        .map(|(name, _)| *name)
                        .collect();
                        return Err(ProviderError::Config(format!(
                            "no usable credentials: set `access_token` ({ENV_ACCESS_TOKEN}), or all of \
                             `tenant_id`, `client_id` and `client_secret` (missing: {})",
                            missing.join(", ")
                        )));
                    }
                }
            }
        };

        let skip_provider_registration = match block.skip_provider_registration {
            Some(skip) => skip,
            None => env(ENV_SKIP_PROVIDER_REGISTRATION)
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        };

        let features = UserFeatures::expand(block.features.as_ref())?;

        Ok(Self {
            subscription_id,
            tenant_id,
            credentials,
            environment,
            resource_manager_endpoint,
            skip_provider_registration,
            features,
        })
    }

    pub fn token_credential(&self) -> Arc<dyn TokenCredential> {
        match &self.credentials {
            Credentials::AccessToken(token) => Arc::new(StaticTokenCredential::new(token.clone())),
            Credentials::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => Arc::new(ClientSecretCredential::new(
                self.environment,
                tenant_id.clone(),
                client_id.clone(),
                client_secret.clone(),
            )),
        }
    }
}
