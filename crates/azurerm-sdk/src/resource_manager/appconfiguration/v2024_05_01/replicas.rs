use std::sync::Arc;

use azurerm_resourceids::ids::appconfiguration::{ConfigurationStoreId, ReplicaId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::API_VERSION;
use super::configuration_stores::ProvisioningState;
use crate::client::{ArmClient, OperationResponse, RequestOptions};
use crate::error::ArmResult;
use crate::models::SystemData;
use crate::pager::list_all;
use crate::poller::{execute_then_poll, execute_with_body_then_poll};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaProperties {
    #[serde(default, skip_serializing)]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<ProvisioningState>,
}

/// A geo-replica of a configuration store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replica {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing)]
    pub properties: Option<ReplicaProperties>,
    #[serde(default, skip_serializing)]
    pub system_data: Option<SystemData>,
}

#[derive(Debug, Clone)]
pub struct ReplicasClient {
    client: Arc<ArmClient>,
}

impl ReplicasClient {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn create_then_poll(&self, id: &ReplicaId, input: &Replica) -> ArmResult<Option<Replica>> {
        let operation = "ReplicasClient.Create";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PUT, &path, API_VERSION, &[200, 201]);
        let response = execute_with_body_then_poll(&self.client, request, input).await?;
        response.model(operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn get(&self, id: &ReplicaId) -> ArmResult<OperationResponse<Replica>> {
        let operation = "ReplicasClient.Get";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::GET, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn delete_then_poll(&self, id: &ReplicaId) -> ArmResult<()> {
        let path = id.id();
        let request = RequestOptions::new("ReplicasClient.Delete", Method::DELETE, &path, API_VERSION, &[200, 202, 204]);
        execute_then_poll(&self.client, request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn list_by_configuration_store(&self, id: &ConfigurationStoreId) -> ArmResult<Vec<Replica>> {
        let path = format!("{}/replicas", id.id());
        let request = RequestOptions::new(
            "ReplicasClient.ListByConfigurationStore",
            Method::GET,
            &path,
            API_VERSION,
            &[200],
        );
        list_all(&self.client, request).await
    }
}
