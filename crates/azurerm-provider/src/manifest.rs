use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::addr::ResourceAddr;
use crate::config::ProviderBlock;
use crate::error::ProviderError;

/// The desired configuration: one provider block and the resource blocks
/// to manage, in dependency order.
///
/// ```json
/// {
///   "provider": { "subscription_id": "...", "features": {} },
///   "resources": [
///     { "type": "azurerm_resource_group", "name": "example",
///       "config": { "name": "example-rg", "location": "West Europe" } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub provider: ProviderBlock,
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceBlock {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ResourceBlock {
    pub fn addr(&self) -> ResourceAddr {
        ResourceAddr::new(&self.resource_type, &self.name)
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::Config(format!("reading manifest {}: {e}", path.display())))?;
        contents.parse()
    }

    pub fn resource(&self, addr: &ResourceAddr) -> Option<&ResourceBlock> {
        self.resources.iter().find(|r| &r.addr() == addr)
    }

    fn check(&self) -> Result<(), ProviderError> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();
        for block in &self.resources {
            let addr = block.addr();
            if block.resource_type.is_empty() || block.name.is_empty() || block.name.contains('.') {
                errors.push(format!("{addr}: `type` and `name` must be non-empty and `name` cannot contain `.`"));
            } else if !seen.insert(addr.clone()) {
                errors.push(format!("{addr}: declared more than once"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Validation(errors))
        }
    }
}

impl FromStr for Manifest {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let manifest: Manifest =
            serde_json::from_str(s).map_err(|e| ProviderError::Config(format!("parsing manifest: {e}")))?;
        manifest.check()?;
        Ok(manifest)
    }
}
