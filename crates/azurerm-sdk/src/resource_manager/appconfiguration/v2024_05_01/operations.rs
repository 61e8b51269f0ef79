use std::sync::Arc;

use azurerm_resourceids::ids::commonids::SubscriptionId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::API_VERSION;
use crate::client::{ArmClient, OperationResponse, RequestOptions};
use crate::error::ArmResult;

pub const CONFIGURATION_STORE_RESOURCE_TYPE: &str = "Microsoft.AppConfiguration/configurationStores";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckNameAvailabilityParameters {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CheckNameAvailabilityParameters {
    /// Availability of a configuration store name.
    pub fn configuration_store(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CONFIGURATION_STORE_RESOURCE_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameAvailabilityStatus {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name_available: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OperationsClient {
    client: Arc<ArmClient>,
}

impl OperationsClient {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    /// Store names are global, and a purged name stays taken for a while
    /// after the deleted store disappears.
    #[instrument(skip(self, input), fields(id = %id.id(), name = %input.name))]
    pub async fn check_name_availability(
        &self,
        id: &SubscriptionId,
        input: &CheckNameAvailabilityParameters,
    ) -> ArmResult<OperationResponse<NameAvailabilityStatus>> {
        let operation = "OperationsClient.CheckNameAvailability";
        let path = format!("{}/providers/Microsoft.AppConfiguration/checkNameAvailability", id.id());
        let request = RequestOptions::new(operation, Method::POST, &path, API_VERSION, &[200]);
        let response = self.client.execute_with_body(request, input).await?;
        OperationResponse::from_response(&response, operation)
    }
}
