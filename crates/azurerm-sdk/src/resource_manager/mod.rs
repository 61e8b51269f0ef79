//! Service clients, one module per resource provider and API version.

pub mod appconfiguration;
pub mod keyvault;
pub mod resources;
pub mod storage;
