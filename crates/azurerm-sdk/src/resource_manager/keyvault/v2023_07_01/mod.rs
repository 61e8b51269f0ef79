use std::sync::Arc;

use crate::client::ArmClient;

pub mod vaults;

pub const API_VERSION: &str = "2023-07-01";

#[derive(Debug, Clone)]
pub struct Client {
    pub vaults: vaults::VaultsClient,
}

impl Client {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self {
            vaults: vaults::VaultsClient::new(client),
        }
    }
}
