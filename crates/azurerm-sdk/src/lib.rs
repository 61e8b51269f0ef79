//! azurerm-sdk
//!
//! A small Azure Resource Manager client: bearer-token auth, request
//! sending with throttling retries, `nextLink` paging and long-running
//! operation polling, plus typed clients for the services the provider
//! manages.

pub mod auth;
pub mod client;
pub(crate) mod constants;
pub mod environment;
pub mod error;
pub mod models;
pub mod pager;
pub mod poller;
pub mod registration;
pub mod resource_manager;

pub use crate::auth::{AccessToken, ClientSecretCredential, StaticTokenCredential, TokenCredential};
pub use crate::client::{ArmClient, ArmResponse, ClientOptions, OperationResponse, RequestOptions};
pub use crate::environment::Environment;
pub use crate::error::{ArmError, ArmResult, UnknownValueError};
pub use crate::pager::{list_all, Page};
pub use crate::poller::{Poller, PollingStrategy};
