use std::sync::Arc;

use crate::client::ArmClient;

pub mod storage_accounts;

pub const API_VERSION: &str = "2023-01-01";

#[derive(Debug, Clone)]
pub struct Client {
    pub storage_accounts: storage_accounts::StorageAccountsClient,
}

impl Client {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self {
            storage_accounts: storage_accounts::StorageAccountsClient::new(client),
        }
    }
}
