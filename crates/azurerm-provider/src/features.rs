//! Opt-in and opt-out behaviours, set through the provider's `features` block.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserFeatures {
    pub app_configuration: AppConfigurationFeatures,
    pub key_vault: KeyVaultFeatures,
    pub resource_group: ResourceGroupFeatures,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfigurationFeatures {
    pub purge_soft_delete_on_destroy: bool,
    pub recover_soft_deleted: bool,
}

impl Default for AppConfigurationFeatures {
    fn default() -> Self {
        Self {
            purge_soft_delete_on_destroy: true,
            recover_soft_deleted: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyVaultFeatures {
    pub purge_soft_delete_on_destroy: bool,
    pub recover_soft_deleted_key_vaults: bool,
}

impl Default for KeyVaultFeatures {
    fn default() -> Self {
        Self {
            purge_soft_delete_on_destroy: true,
            recover_soft_deleted_key_vaults: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceGroupFeatures {
    pub prevent_deletion_if_contains_resources: bool,
}

impl Default for ResourceGroupFeatures {
    fn default() -> Self {
        Self {
            prevent_deletion_if_contains_resources: true,
        }
    }
}

impl UserFeatures {
    /// Expand a `features` block. Blocks and keys that are left out keep
    /// their defaults; `null` means "all defaults".
    pub fn expand(block: Option<&Value>) -> Result<Self, ProviderError> {
        match block {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ProviderError::Config(format!("expanding `features`: {e}"))),
        }
    }
}
