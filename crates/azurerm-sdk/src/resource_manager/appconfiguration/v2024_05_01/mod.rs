use std::sync::Arc;

use crate::client::ArmClient;

pub mod configuration_stores;
pub mod operations;
pub mod replicas;

pub const API_VERSION: &str = "2024-05-01";

#[derive(Debug, Clone)]
pub struct Client {
    pub configuration_stores: configuration_stores::ConfigurationStoresClient,
    pub operations: operations::OperationsClient,
    pub replicas: replicas::ReplicasClient,
}

impl Client {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self {
            configuration_stores: configuration_stores::ConfigurationStoresClient::new(client.clone()),
            operations: operations::OperationsClient::new(client.clone()),
            replicas: replicas::ReplicasClient::new(client),
        }
    }
}
