use std::sync::Arc;

use azurerm_resourceids::ids::commonids::SubscriptionId;
use azurerm_resourceids::ids::storage::StorageAccountId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::API_VERSION;
use crate::client::{ArmClient, OperationResponse, RequestOptions};
use crate::constants::arm_enum;
use crate::error::ArmResult;
use crate::models::{Identity, Tags};
use crate::poller::execute_with_body_then_poll;

arm_enum! {
    pub enum Kind {
        BlobStorage => "BlobStorage",
        BlockBlobStorage => "BlockBlobStorage",
        FileStorage => "FileStorage",
        Storage => "Storage",
        StorageV2 => "StorageV2",
    }
}

arm_enum! {
    pub enum SkuName {
        PremiumLrs => "Premium_LRS",
        PremiumZrs => "Premium_ZRS",
        StandardGrs => "Standard_GRS",
        StandardGzrs => "Standard_GZRS",
        StandardLrs => "Standard_LRS",
        StandardRagrs => "Standard_RAGRS",
        StandardRagzrs => "Standard_RAGZRS",
        StandardZrs => "Standard_ZRS",
    }
}

arm_enum! {
    pub enum SkuTier {
        Premium => "Premium",
        Standard => "Standard",
    }
}

arm_enum! {
    pub enum AccessTier {
        Cool => "Cool",
        Hot => "Hot",
        Premium => "Premium",
    }
}

arm_enum! {
    pub enum MinimumTlsVersion {
        Tls1_0 => "TLS1_0",
        Tls1_1 => "TLS1_1",
        Tls1_2 => "TLS1_2",
    }
}

arm_enum! {
    pub enum Reason {
        AccountNameInvalid => "AccountNameInvalid",
        AlreadyExists => "AlreadyExists",
    }
}

arm_enum! {
    pub enum ProvisioningState {
        Creating => "Creating",
        ResolvingDns => "ResolvingDNS",
        Succeeded => "Succeeded",
    }
}

impl SkuName {
    /// Split into the `account_tier` / `account_replication_type` pair.
    pub fn tier_and_replication(&self) -> (&'static str, &'static str) {
        let (tier, replication) = self.as_str().split_once('_').unwrap_or((self.as_str(), ""));
        (tier, replication)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: SkuName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<SkuTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageAccountCheckNameAvailabilityParameters {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl StorageAccountCheckNameAvailabilityParameters {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "Microsoft.Storage/storageAccounts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckNameAvailabilityResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name_available: Option<bool>,
    #[serde(default)]
    pub reason: Option<Reason>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    #[serde(default)]
    pub blob: Option<String>,
    #[serde(default)]
    pub dfs: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
}

/// Properties accepted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountPropertiesCreateParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_tier: Option<AccessTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_blob_public_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hns_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_tls_version: Option<MinimumTlsVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_https_traffic_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountCreateParameters {
    pub kind: Kind,
    pub location: String,
    pub sku: Sku,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<StorageAccountPropertiesCreateParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountUpdateParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<StorageAccountPropertiesCreateParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    #[serde(default)]
    pub access_tier: Option<AccessTier>,
    #[serde(default)]
    pub allow_blob_public_access: Option<bool>,
    #[serde(default)]
    pub is_hns_enabled: Option<bool>,
    #[serde(default)]
    pub minimum_tls_version: Option<MinimumTlsVersion>,
    #[serde(default)]
    pub primary_endpoints: Option<Endpoints>,
    #[serde(default)]
    pub primary_location: Option<String>,
    #[serde(default)]
    pub provisioning_state: Option<ProvisioningState>,
    #[serde(default)]
    pub secondary_location: Option<String>,
    #[serde(default)]
    pub supports_https_traffic_only: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind_type: Option<String>,
    #[serde(default)]
    pub kind: Option<Kind>,
    pub location: String,
    #[serde(default)]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub properties: Option<StorageAccountProperties>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountKey {
    #[serde(default)]
    pub key_name: Option<String>,
    #[serde(default)]
    pub permissions: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageAccountListKeysResult {
    #[serde(default)]
    pub keys: Vec<StorageAccountKey>,
}

#[derive(Debug, Clone)]
pub struct StorageAccountsClient {
    client: Arc<ArmClient>,
}

impl StorageAccountsClient {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn check_name_availability(
        &self,
        id: &SubscriptionId,
        input: &StorageAccountCheckNameAvailabilityParameters,
    ) -> ArmResult<OperationResponse<CheckNameAvailabilityResult>> {
        let operation = "StorageAccountsClient.CheckNameAvailability";
        let path = format!("{}/providers/Microsoft.Storage/checkNameAvailability", id.id());
        let request = RequestOptions::new(operation, Method::POST, &path, API_VERSION, &[200]);
        let response = self.client.execute_with_body(request, input).await?;
        OperationResponse::from_response(&response, operation)
    }

    /// Storage creates answer 202 with a `Location` to poll.
    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn create_then_poll(
        &self,
        id: &StorageAccountId,
        input: &StorageAccountCreateParameters,
    ) -> ArmResult<Option<StorageAccount>> {
        let operation = "StorageAccountsClient.Create";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PUT, &path, API_VERSION, &[200, 202]);
        let response = execute_with_body_then_poll(&self.client, request, input).await?;
        response.model(operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn get_properties(&self, id: &StorageAccountId) -> ArmResult<OperationResponse<StorageAccount>> {
        let operation = "StorageAccountsClient.GetProperties";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::GET, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn update(
        &self,
        id: &StorageAccountId,
        input: &StorageAccountUpdateParameters,
    ) -> ArmResult<OperationResponse<StorageAccount>> {
        let operation = "StorageAccountsClient.Update";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PATCH, &path, API_VERSION, &[200]);
        let response = self.client.execute_with_body(request, input).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn delete(&self, id: &StorageAccountId) -> ArmResult<()> {
        let path = id.id();
        let request = RequestOptions::new("StorageAccountsClient.Delete", Method::DELETE, &path, API_VERSION, &[200, 204]);
        self.client.execute(request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn list_keys(&self, id: &StorageAccountId) -> ArmResult<OperationResponse<StorageAccountListKeysResult>> {
        let operation = "StorageAccountsClient.ListKeys";
        let path = format!("{}/listKeys", id.id());
        let request = RequestOptions::new(operation, Method::POST, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }
}
