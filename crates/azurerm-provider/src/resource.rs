use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::clients::Clients;
use crate::data::ResourceData;
use crate::error::ProviderError;
use crate::plan::AttributeChange;
use crate::schema::Schema;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Upper bounds for each operation, enforced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

impl Timeouts {
    /// Same bound for create, update and delete; reads keep the default.
    pub fn writes(minutes: u64) -> Self {
        let d = Duration::from_secs(minutes * 60);
        Self {
            create: d,
            update: d,
            delete: d,
            ..Self::default()
        }
    }
}

/// Outcome of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    /// Removed outside of this tool; drop it from state.
    Gone,
}

/// A proposed change to one resource, open to resource-specific rules
/// before it is turned into a plan entry.
#[derive(Debug)]
pub struct DiffContext<'a> {
    config: &'a Map<String, Value>,
    state: Option<&'a Map<String, Value>>,
    changes: &'a mut Vec<AttributeChange>,
}

impl<'a> DiffContext<'a> {
    pub fn new(
        config: &'a Map<String, Value>,
        state: Option<&'a Map<String, Value>>,
        changes: &'a mut Vec<AttributeChange>,
    ) -> Self {
        Self { config, state, changes }
    }

    pub fn is_new_resource(&self) -> bool {
        self.state.is_none()
    }

    /// Desired value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Recorded value of `key`, if the resource exists.
    pub fn old(&self, key: &str) -> Option<&Value> {
        self.state.and_then(|s| s.get(key)).filter(|v| !v.is_null())
    }

    pub fn has_change(&self, key: &str) -> bool {
        self.changes.iter().any(|c| c.attribute == key)
    }

    /// Mark an existing change to `key` as requiring replacement.
    pub fn force_new(&mut self, key: &str) {
        for change in self.changes.iter_mut().filter(|c| c.attribute == key) {
            change.force_new = true;
        }
    }
}

/// Trait implemented by each managed Azure resource type.
///
/// Methods return boxed futures for dyn compatibility. `create`, `read`
/// and `update` leave the resource's attributes in `data`; the driver
/// records them once the call returns.
pub trait Resource: Send + Sync {
    /// e.g. "azurerm_resource_group".
    fn resource_type(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Reject import IDs that are not IDs of this resource type.
    fn validate_import_id(&self, id: &str) -> Result<(), ProviderError>;

    /// Resource-specific plan rules: conditional replacement and
    /// cross-attribute validation.
    fn customize_diff(&self, _diff: &mut DiffContext<'_>) -> Result<(), ProviderError> {
        Ok(())
    }

    fn create<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData)
    -> BoxFuture<'a, Result<(), ProviderError>>;

    fn read<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData)
    -> BoxFuture<'a, Result<Presence, ProviderError>>;

    fn update<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData)
    -> BoxFuture<'a, Result<(), ProviderError>>;

    fn delete<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData)
    -> BoxFuture<'a, Result<(), ProviderError>>;
}

/// Read after a write; the resource vanishing in between is an error.
pub(crate) async fn read_after_write(
    resource: &dyn Resource,
    clients: &Clients,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    match resource.read(clients, data).await? {
        Presence::Present => Ok(()),
        Presence::Gone => Err(ProviderError::ReadFailed(format!(
            "{} {} disappeared straight after being written",
            resource.resource_type(),
            data.id().unwrap_or_default()
        ))),
    }
}
