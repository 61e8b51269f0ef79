use std::time::Duration;

use azurerm_resourceids::ParseError;
use azurerm_sdk::{ArmError, UnknownValueError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("configuring the provider: {0}")]
    Config(String),

    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),

    #[error("unknown resource type {0:?}")]
    UnknownResourceType(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error(
        "a resource with the ID {id:?} already exists - to be managed via this tool it needs to be \
         imported into the State. Please see the `import` command for {resource_type:?} for more information"
    )]
    RequiresImport { resource_type: String, id: String },

    #[error("resource creation failed: {0}")]
    CreateFailed(String),

    #[error("resource read failed: {0}")]
    ReadFailed(String),

    #[error("resource update failed: {0}")]
    UpdateFailed(String),

    #[error("resource deletion failed: {0}")]
    DeleteFailed(String),

    #[error("import failed: {0}")]
    Import(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("state error: {0}")]
    State(String),

    #[error(transparent)]
    Arm(#[from] ArmError),

    #[error(transparent)]
    ResourceId(#[from] ParseError),

    #[error(transparent)]
    UnknownValue(#[from] UnknownValueError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// Prepend resource identity to the error message.
    pub fn with_resource(self, label: &str, name: &str) -> Self {
        match self {
            Self::CreateFailed(msg) => Self::CreateFailed(format!("{label} ({name}): {msg}")),
            Self::ReadFailed(msg) => Self::ReadFailed(format!("{label} ({name}): {msg}")),
            Self::UpdateFailed(msg) => Self::UpdateFailed(format!("{label} ({name}): {msg}")),
            Self::DeleteFailed(msg) => Self::DeleteFailed(format!("{label} ({name}): {msg}")),
            Self::Import(msg) => Self::Import(format!("{label} ({name}): {msg}")),
            other => other,
        }
    }

    /// Wrap an SDK error with the action and the resource it was for,
    /// e.g. `creating Configuration Store (...): <chain>`.
    pub fn create(id: impl std::fmt::Display, err: ArmError) -> Self {
        Self::CreateFailed(format!("creating {id}: {}", format_err_chain(&err)))
    }

    pub fn read(id: impl std::fmt::Display, err: ArmError) -> Self {
        Self::ReadFailed(format!("retrieving {id}: {}", format_err_chain(&err)))
    }

    pub fn update(id: impl std::fmt::Display, err: ArmError) -> Self {
        Self::UpdateFailed(format!("updating {id}: {}", format_err_chain(&err)))
    }

    pub fn delete(id: impl std::fmt::Display, err: ArmError) -> Self {
        Self::DeleteFailed(format!("deleting {id}: {}", format_err_chain(&err)))
    }
}

/// Walk the full error chain and join all causes into one string.
///
/// Transport errors from reqwest keep the useful detail (DNS, TLS, refused
/// connection) in the source chain, not in `Display`.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
