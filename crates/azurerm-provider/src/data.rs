use std::collections::HashMap;

use serde_json::{Map, Value};

/// The working copy of one resource during an operation.
///
/// `config` is the desired block with defaults applied, `state` the
/// attributes recorded after the last successful operation. Reads prefer
/// `config`; `set` writes into `state`, which becomes the new recorded
/// attributes once the operation completes.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: Option<String>,
    config: Map<String, Value>,
    prior: Map<String, Value>,
    state: Map<String, Value>,
}

impl ResourceData {
    /// A resource that does not exist yet.
    pub fn new(config: Map<String, Value>) -> Self {
        Self {
            id: None,
            config,
            prior: Map::new(),
            state: Map::new(),
        }
    }

    /// An existing resource: `state` is what was recorded for `id`.
    pub fn existing(id: impl Into<String>, config: Map<String, Value>, state: Map<String, Value>) -> Self {
        Self {
            id: Some(id.into()),
            config,
            prior: state.clone(),
            state,
        }
    }

    /// A resource known only by its ID, as during import.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn is_new_resource(&self) -> bool {
        self.prior.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config
            .get(key)
            .or_else(|| self.state.get(key))
            .filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Like `get_str`, but an unset attribute reads as `""`.
    pub fn get_string(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_list(&self, key: &str) -> Vec<Value> {
        self.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
    }

    pub fn get_string_map(&self, key: &str) -> HashMap<String, String> {
        self.get(key)
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the desired value differs from the one last recorded. An
    /// empty list or map counts as unset.
    pub fn has_change(&self, key: &str) -> bool {
        let (old, new) = self.get_change(key);
        let unset = |v: &Value| match v {
            Value::Null => true,
            Value::Array(a) => a.is_empty(),
            Value::Object(m) => m.is_empty(),
            _ => false,
        };
        old != new && !(unset(&old) && unset(&new))
    }

    pub fn has_changes(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.has_change(k))
    }

    /// `(recorded, desired)` for `key`, with `Null` standing in for unset.
    pub fn get_change(&self, key: &str) -> (Value, Value) {
        let old = self.prior.get(key).cloned().unwrap_or(Value::Null);
        let new = self.config.get(key).cloned().unwrap_or(Value::Null);
        (old, new)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.state.insert(key.to_string(), value.into());
    }

    /// Record an optional value, writing `null` when it is absent.
    pub fn set_opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) {
        self.state.insert(key.to_string(), value.map_or(Value::Null, Into::into));
    }

    /// The attributes to record for this resource.
    pub fn into_state(self) -> Map<String, Value> {
        self.state
    }

    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }
}
