//! Typed IDs for the resource types this workspace knows about.

pub mod appconfiguration;
pub mod authorization;
pub mod commonids;
pub mod keyvault;
pub mod managedidentity;
pub mod postgres;
pub mod storage;
