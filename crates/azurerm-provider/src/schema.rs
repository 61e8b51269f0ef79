//! Attribute schemas: what a resource block may contain, and how a block
//! compares against the attributes recorded in state.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::plan::AttributeChange;

/// Returns one message per problem found; empty means valid.
pub type ValidateFn = Arc<dyn Fn(&Value, &str) -> Vec<String> + Send + Sync>;

/// `true` when `old` and `new` should be treated as equal for `key`.
pub type DiffSuppressFn = fn(key: &str, old: &Value, new: &Value) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// Map of string to string.
    Map,
    List,
}

impl AttributeType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64(),
            Self::Map => value
                .as_object()
                .is_some_and(|m| m.values().all(Value::is_string)),
            Self::List => value.is_array(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "number",
            Self::Map => "map of string",
            Self::List => "list",
        }
    }
}

#[derive(Clone)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
    pub validate: Option<ValidateFn>,
    pub diff_suppress: Option<DiffSuppressFn>,
}

impl Attribute {
    fn new(name: &'static str, kind: AttributeType) -> Self {
        Self {
            name,
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            validate: None,
            diff_suppress: None,
        }
    }

    pub fn required(name: &'static str, kind: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::new(name, kind)
        }
    }

    pub fn optional(name: &'static str, kind: AttributeType) -> Self {
        Self {
            optional: true,
            ..Self::new(name, kind)
        }
    }

    /// Read-only: set by the provider, never by configuration.
    pub fn computed(name: &'static str, kind: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::new(name, kind)
        }
    }

    /// Optional, with the provider filling in the value when unset.
    pub fn also_computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate_with(mut self, f: impl Fn(&Value, &str) -> Vec<String> + Send + Sync + 'static) -> Self {
        self.validate = Some(Arc::new(f));
        self
    }

    pub fn suppress_diff(mut self, f: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(f);
        self
    }

    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("force_new", &self.force_new)
            .field("sensitive", &self.sensitive)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Empty maps and lists count as unset, as do nulls.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        _ => true,
    })
}

#[derive(Debug, Clone)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a resource block, reporting every problem rather than the first.
    pub fn validate_config(&self, config: &Map<String, Value>) -> Result<(), ProviderError> {
        let mut errors = Vec::new();

        for key in config.keys() {
            match self.attribute(key) {
                None => errors.push(format!("{key:?}: an argument named {key:?} is not expected here")),
                Some(attr) if !attr.is_configurable() => {
                    errors.push(format!("{key:?}: cannot set a value for the computed attribute {key:?}"))
                }
                Some(_) => {}
            }
        }

        for attr in &self.attributes {
            let value = config.get(attr.name).filter(|v| !v.is_null());
            let Some(value) = value else {
                if attr.required {
                    errors.push(format!("{:?}: the argument {:?} is required, but no definition was found", attr.name, attr.name));
                }
                continue;
            };
            if !attr.is_configurable() {
                continue;
            }
            if !attr.kind.matches(value) {
                errors.push(format!("{:?}: expected {}, got {value}", attr.name, attr.kind.name()));
                continue;
            }
            if let Some(validate) = &attr.validate {
                errors.extend(validate(value, attr.name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Validation(errors))
        }
    }

    /// `config` with defaults filled in for unset optional attributes.
    pub fn with_defaults(&self, config: &Map<String, Value>) -> Map<String, Value> {
        let mut out = config.clone();
        out.retain(|_, v| !v.is_null());
        for attr in &self.attributes {
            if let Some(default) = &attr.default {
                out.entry(attr.name).or_insert_with(|| default.clone());
            }
        }
        out
    }

    /// Attribute-level differences between the desired block (defaults
    /// applied) and the attributes recorded in state.
    pub fn diff(&self, config: &Map<String, Value>, state: &Map<String, Value>) -> Vec<AttributeChange> {
        let mut changes = Vec::new();
        for attr in self.attributes.iter().filter(|a| a.is_configurable()) {
            let new = present(config.get(attr.name));
            let old = present(state.get(attr.name));

            let changed = match (old, new) {
                (_, None) if attr.computed => false,
                (None, None) => false,
                (Some(old), Some(new)) => {
                    old != new && !attr.diff_suppress.is_some_and(|suppress| suppress(attr.name, old, new))
                }
                _ => true,
            };

            if changed {
                changes.push(AttributeChange {
                    attribute: attr.name.to_string(),
                    old: old.cloned(),
                    new: new.cloned(),
                    force_new: attr.force_new,
                    sensitive: attr.sensitive,
                });
            }
        }
        changes
    }
}
