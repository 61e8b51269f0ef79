use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::addr::ResourceAddr;
use crate::error::ProviderError;

/// Schema version written by this build. Missing or 0 = pre-versioned state.
pub const CURRENT_VERSION: u32 = 1;

/// Everything the driver knows about the resources it manages, keyed by
/// address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderState {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub resources: BTreeMap<ResourceAddr, ResourceState>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            resources: BTreeMap::new(),
        }
    }
}

/// State for a single managed resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    pub resource_type: String,
    /// ARM resource ID.
    pub id: String,
    pub status: ResourceStatus,
    pub attributes: Map<String, Value>,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Created,
    Updated,
    Imported,
}

impl ResourceState {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        status: ResourceStatus,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            status,
            attributes,
            updated_at: jiff::Timestamp::now(),
        }
    }
}

impl ProviderState {
    /// Parse a state document, migrating older versions first.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProviderError> {
        let json: Value = serde_json::from_slice(bytes)?;
        let raw_version = json.get("version").and_then(Value::as_u64).unwrap_or(0);
        let on_disk_version = u32::try_from(raw_version)
            .map_err(|_| ProviderError::State(format!("state version {raw_version} is out of range")))?;
        let migrated = migrate(json, on_disk_version)?;
        Ok(serde_json::from_value(migrated)?)
    }

    pub fn get(&self, addr: &ResourceAddr) -> Option<&ResourceState> {
        self.resources.get(addr)
    }

    pub fn contains(&self, addr: &ResourceAddr) -> bool {
        self.resources.contains_key(addr)
    }
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: Value, from_version: u32) -> Result<Value, ProviderError> {
    if from_version > CURRENT_VERSION {
        return Err(ProviderError::State(format!(
            "state version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }

    // v0 -> v1: entries gained `status` and `updated_at`.
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ProviderError::State("state is not a JSON object".to_string()))?;
        if let Some(resources) = obj.get_mut("resources").and_then(Value::as_object_mut) {
            let now = jiff::Timestamp::now().to_string();
            for entry in resources.values_mut().filter_map(Value::as_object_mut) {
                entry
                    .entry("status")
                    .or_insert_with(|| Value::String("created".to_string()));
                entry
                    .entry("updated_at")
                    .or_insert_with(|| Value::String(now.clone()));
            }
        }
        obj.insert("version".to_string(), Value::from(1));
        tracing::info!("migrated state v0 -> v1 (added status and updated_at)");
    }

    Ok(json)
}
