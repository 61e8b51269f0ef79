use std::sync::Arc;

use azurerm_resourceids::ids::keyvault::{DeletedVaultId, VaultId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::API_VERSION;
use crate::client::{ArmClient, OperationResponse, RequestOptions};
use crate::constants::arm_enum;
use crate::error::ArmResult;
use crate::models::Tags;
use crate::poller::{execute_then_poll, execute_with_body_then_poll};

arm_enum! {
    pub enum SkuFamily {
        A => "A",
    }
}

arm_enum! {
    pub enum SkuName {
        Premium => "premium",
        Standard => "standard",
    }
}

arm_enum! {
    pub enum CreateMode {
        Default => "default",
        Recover => "recover",
    }
}

arm_enum! {
    pub enum VaultProvisioningState {
        RegisteringDns => "RegisteringDns",
        Succeeded => "Succeeded",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub family: SkuFamily,
    pub name: SkuName,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storage: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicyEntry {
    pub tenant_id: String,
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultProperties {
    pub tenant_id: String,
    pub sku: Sku,
    #[serde(default)]
    pub access_policies: Vec<AccessPolicyEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_mode: Option<CreateMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_purge_protection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_rbac_authorization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_soft_delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_for_deployment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_for_disk_encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_for_template_deployment: Option<bool>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<VaultProvisioningState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_delete_retention_in_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultCreateOrUpdateParameters {
    pub location: String,
    pub properties: VaultProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Vault {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub properties: VaultProperties,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultPatchProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_purge_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_for_deployment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VaultPatchParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<VaultPatchProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedVaultProperties {
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
    #[serde(default)]
    pub vault_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeletedVault {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: Option<DeletedVaultProperties>,
}

#[derive(Debug, Clone)]
pub struct VaultsClient {
    client: Arc<ArmClient>,
}

impl VaultsClient {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn create_or_update_then_poll(
        &self,
        id: &VaultId,
        input: &VaultCreateOrUpdateParameters,
    ) -> ArmResult<Option<Vault>> {
        let operation = "VaultsClient.CreateOrUpdate";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PUT, &path, API_VERSION, &[200, 201]);
        let response = execute_with_body_then_poll(&self.client, request, input).await?;
        response.model(operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn get(&self, id: &VaultId) -> ArmResult<OperationResponse<Vault>> {
        let operation = "VaultsClient.Get";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::GET, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn update(&self, id: &VaultId, input: &VaultPatchParameters) -> ArmResult<OperationResponse<Vault>> {
        let operation = "VaultsClient.Update";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PATCH, &path, API_VERSION, &[200, 201]);
        let response = self.client.execute_with_body(request, input).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn delete(&self, id: &VaultId) -> ArmResult<()> {
        let path = id.id();
        let request = RequestOptions::new("VaultsClient.Delete", Method::DELETE, &path, API_VERSION, &[200, 204]);
        self.client.execute(request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn get_deleted(&self, id: &DeletedVaultId) -> ArmResult<OperationResponse<DeletedVault>> {
        let operation = "VaultsClient.GetDeleted";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::GET, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn purge_deleted_then_poll(&self, id: &DeletedVaultId) -> ArmResult<()> {
        let path = format!("{}/purge", id.id());
        let request = RequestOptions::new("VaultsClient.PurgeDeleted", Method::POST, &path, API_VERSION, &[200, 202]);
        execute_then_poll(&self.client, request).await?;
        Ok(())
    }
}
