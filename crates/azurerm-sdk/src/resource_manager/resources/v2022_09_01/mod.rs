use std::sync::Arc;

use crate::client::ArmClient;

pub mod resource_groups;

pub const API_VERSION: &str = "2022-09-01";

#[derive(Debug, Clone)]
pub struct Client {
    pub resource_groups: resource_groups::ResourceGroupsClient,
}

impl Client {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self {
            resource_groups: resource_groups::ResourceGroupsClient::new(client),
        }
    }
}
