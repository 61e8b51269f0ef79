use std::sync::Arc;

use azurerm_resourceids::ids::appconfiguration::{ConfigurationStoreId, DeletedConfigurationStoreId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::API_VERSION;
use crate::client::{ArmClient, OperationResponse, RequestOptions};
use crate::constants::arm_enum;
use crate::error::ArmResult;
use crate::models::{Identity, SystemData, Tags};
use crate::pager::list_all;
use crate::poller::{execute_then_poll, execute_with_body_then_poll};

arm_enum! {
    pub enum AuthenticationMode {
        Local => "Local",
        PassThrough => "Pass-through",
    }
}

arm_enum! {
    pub enum PrivateLinkDelegation {
        Disabled => "Disabled",
        Enabled => "Enabled",
    }
}

arm_enum! {
    pub enum PublicNetworkAccess {
        Disabled => "Disabled",
        Enabled => "Enabled",
    }
}

arm_enum! {
    pub enum CreateMode {
        Default => "Default",
        Recover => "Recover",
    }
}

arm_enum! {
    pub enum ProvisioningState {
        Canceled => "Canceled",
        Creating => "Creating",
        Deleting => "Deleting",
        Failed => "Failed",
        Succeeded => "Succeeded",
        Updating => "Updating",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPlaneProxyProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_mode: Option<AuthenticationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_link_delegation: Option<PrivateLinkDelegation>,
}

/// Customer-managed key for the store's data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVaultProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_identifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_properties: Option<KeyVaultProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStoreProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_mode: Option<CreateMode>,
    #[serde(default, skip_serializing)]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_plane_proxy: Option<DataPlaneProxyProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_local_auth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_purge_protection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionProperties>,
    #[serde(default, skip_serializing)]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<PublicNetworkAccess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_delete_retention_in_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStore {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing)]
    pub kind: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub sku: Sku,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ConfigurationStoreProperties>,
    #[serde(default, skip_serializing)]
    pub system_data: Option<SystemData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStorePropertiesUpdateParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_plane_proxy: Option<DataPlaneProxyProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_local_auth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_purge_protection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<PublicNetworkAccess>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStoreUpdateParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ConfigurationStorePropertiesUpdateParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// An access key for the store's data plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub read_only: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedConfigurationStoreProperties {
    #[serde(default)]
    pub configuration_store_id: Option<String>,
    #[serde(default)]
    pub deletion_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub purge_protection_enabled: Option<bool>,
    #[serde(default)]
    pub scheduled_purge_date: Option<String>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedConfigurationStore {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: Option<DeletedConfigurationStoreProperties>,
}

#[derive(Debug, Clone)]
pub struct ConfigurationStoresClient {
    client: Arc<ArmClient>,
}

impl ConfigurationStoresClient {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn create_then_poll(
        &self,
        id: &ConfigurationStoreId,
        input: &ConfigurationStore,
    ) -> ArmResult<Option<ConfigurationStore>> {
        let operation = "ConfigurationStoresClient.Create";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PUT, &path, API_VERSION, &[200, 201]);
        let response = execute_with_body_then_poll(&self.client, request, input).await?;
        response.model(operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn get(&self, id: &ConfigurationStoreId) -> ArmResult<OperationResponse<ConfigurationStore>> {
        let operation = "ConfigurationStoresClient.Get";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::GET, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn update_then_poll(
        &self,
        id: &ConfigurationStoreId,
        input: &ConfigurationStoreUpdateParameters,
    ) -> ArmResult<Option<ConfigurationStore>> {
        let operation = "ConfigurationStoresClient.Update";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PATCH, &path, API_VERSION, &[200, 201]);
        let response = execute_with_body_then_poll(&self.client, request, input).await?;
        response.model(operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn delete_then_poll(&self, id: &ConfigurationStoreId) -> ArmResult<()> {
        let path = id.id();
        let request = RequestOptions::new(
            "ConfigurationStoresClient.Delete",
            Method::DELETE,
            &path,
            API_VERSION,
            &[200, 202, 204],
        );
        execute_then_poll(&self.client, request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn list_keys(&self, id: &ConfigurationStoreId) -> ArmResult<Vec<ApiKey>> {
        let path = format!("{}/listKeys", id.id());
        let request = RequestOptions::new(
            "ConfigurationStoresClient.ListKeys",
            Method::POST,
            &path,
            API_VERSION,
            &[200],
        );
        list_all(&self.client, request).await
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn get_deleted(
        &self,
        id: &DeletedConfigurationStoreId,
    ) -> ArmResult<OperationResponse<DeletedConfigurationStore>> {
        let operation = "ConfigurationStoresClient.GetDeleted";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::GET, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn purge_deleted_then_poll(&self, id: &DeletedConfigurationStoreId) -> ArmResult<()> {
        let path = format!("{}/purge", id.id());
        let request = RequestOptions::new(
            "ConfigurationStoresClient.PurgeDeleted",
            Method::POST,
            &path,
            API_VERSION,
            &[200, 202],
        );
        execute_then_poll(&self.client, request).await?;
        Ok(())
    }
}
