//! Models shared across services.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::arm_enum;

arm_enum! {
    pub enum IdentityType {
        None => "None",
        SystemAssigned => "SystemAssigned",
        UserAssigned => "UserAssigned",
        SystemAndUserAssigned => "SystemAssigned, UserAssigned",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentityDetails {
    #[serde(default, skip_serializing)]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub principal_id: Option<String>,
}

/// Managed identity block used by most ARM resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "type")]
    pub kind: IdentityType,
    #[serde(default, skip_serializing)]
    pub principal_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_assigned_identities: HashMap<String, UserAssignedIdentityDetails>,
}

/// `systemData` as returned on most resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default)]
    pub last_modified_at: Option<String>,
}

pub type Tags = HashMap<String, String>;
