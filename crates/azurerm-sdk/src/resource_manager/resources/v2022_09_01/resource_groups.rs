use std::sync::Arc;

use azurerm_resourceids::ids::commonids::ResourceGroupId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::API_VERSION;
use crate::client::{ArmClient, OperationResponse, RequestOptions};
use crate::error::ArmResult;
use crate::models::Tags;
use crate::pager::list_all;
use crate::poller::execute_then_poll;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing)]
    pub kind: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupPatchable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// A resource inside a group, as returned by the group's `resources` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericResourceExpanded {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResourceGroupsClient {
    client: Arc<ArmClient>,
}

impl ResourceGroupsClient {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn create_or_update(
        &self,
        id: &ResourceGroupId,
        input: &ResourceGroup,
    ) -> ArmResult<OperationResponse<ResourceGroup>> {
        let operation = "ResourceGroupsClient.CreateOrUpdate";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PUT, &path, API_VERSION, &[200, 201]);
        let response = self.client.execute_with_body(request, input).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn get(&self, id: &ResourceGroupId) -> ArmResult<OperationResponse<ResourceGroup>> {
        let operation = "ResourceGroupsClient.Get";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::GET, &path, API_VERSION, &[200]);
        let response = self.client.execute(request).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self, input), fields(id = %id.id()))]
    pub async fn update(
        &self,
        id: &ResourceGroupId,
        input: &ResourceGroupPatchable,
    ) -> ArmResult<OperationResponse<ResourceGroup>> {
        let operation = "ResourceGroupsClient.Update";
        let path = id.id();
        let request = RequestOptions::new(operation, Method::PATCH, &path, API_VERSION, &[200]);
        let response = self.client.execute_with_body(request, input).await?;
        OperationResponse::from_response(&response, operation)
    }

    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn delete_then_poll(&self, id: &ResourceGroupId) -> ArmResult<()> {
        let path = id.id();
        let request = RequestOptions::new(
            "ResourceGroupsClient.Delete",
            Method::DELETE,
            &path,
            API_VERSION,
            &[200, 202],
        );
        execute_then_poll(&self.client, request).await?;
        Ok(())
    }

    /// Every resource contained in the group.
    #[instrument(skip(self), fields(id = %id.id()))]
    pub async fn list_resources(&self, id: &ResourceGroupId) -> ArmResult<Vec<GenericResourceExpanded>> {
        let path = format!("{}/resources", id.id());
        let request = RequestOptions::new(
            "ResourceGroupsClient.ListResources",
            Method::GET,
            &path,
            API_VERSION,
            &[200],
        );
        list_all(&self.client, request).await
    }
}
