use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProviderError;

/// Composite key for addressing a resource in state.
///
/// Two resources of the same type but different names (e.g. two
/// `azurerm_resource_group` blocks) have distinct addresses. Written as
/// `type.name`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ResourceAddr {
    pub resource_type: String,
    pub resource_name: String,
}

impl ResourceAddr {
    pub fn new(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_name: resource_name.into(),
        }
    }
}

impl fmt::Display for ResourceAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.resource_name)
    }
}

impl FromStr for ResourceAddr {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((ty, name)) if !ty.is_empty() && !name.is_empty() => Ok(Self::new(ty, name)),
            _ => Err(ProviderError::Config(format!(
                "invalid resource address {s:?}: expected `<type>.<name>`"
            ))),
        }
    }
}

impl Serialize for ResourceAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
