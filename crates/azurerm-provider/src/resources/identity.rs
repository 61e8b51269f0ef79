//! The `identity` block shared by resources that accept a managed identity.
//!
//! Recorded as a list holding at most one object:
//! `{type, identity_ids, principal_id, tenant_id}`, where the last two are
//! filled in from the API.

use std::collections::{BTreeSet, HashMap};

use azurerm_resourceids::ids::managedidentity::UserAssignedIdentityId;
use azurerm_sdk::models::{Identity, IdentityType, UserAssignedIdentityDetails};
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeType};
use crate::validate;

const CONFIGURABLE_KEYS: &[&str] = &["type", "identity_ids"];

const IDENTITY_TYPES: &[&str] = &[
    IdentityType::SystemAssigned.as_str(),
    IdentityType::UserAssigned.as_str(),
    IdentityType::SystemAndUserAssigned.as_str(),
];

pub(crate) fn identity_attribute() -> Attribute {
    Attribute::optional("identity", AttributeType::List)
        .validate_with(validate_identity)
        .suppress_diff(suppress_identity_diff)
}

fn includes_user_assigned(kind: IdentityType) -> bool {
    matches!(kind, IdentityType::UserAssigned | IdentityType::SystemAndUserAssigned)
}

fn validate_identity(value: &Value, key: &str) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec![];
    };
    if items.len() > 1 {
        return vec![format!("{key}: at most one `identity` block is allowed, got {}", items.len())];
    }

    let mut errors = Vec::new();
    for item in items {
        let Some(obj) = item.as_object() else {
            errors.push(format!("{key}.0: expected an object with `type` and optional `identity_ids`"));
            continue;
        };
        for unexpected in obj.keys().filter(|k| !CONFIGURABLE_KEYS.contains(&k.as_str())) {
            errors.push(format!("{key}.0: an argument named {unexpected:?} is not expected here"));
        }

        let kind = match obj.get("type") {
            Some(Value::String(kind)) => {
                let found = validate::string_in_slice(IDENTITY_TYPES, false)(&json!(kind), &format!("{key}.0.type"));
                if !found.is_empty() {
                    errors.extend(found);
                    continue;
                }
                kind.parse::<IdentityType>().ok()
            }
            Some(other) => {
                errors.push(format!("{key}.0.type: expected string, got {other}"));
                continue;
            }
            None => {
                errors.push(format!("{key}.0.type: is required"));
                continue;
            }
        };

        let ids = obj.get("identity_ids").and_then(Value::as_array).cloned().unwrap_or_default();
        match kind {
            Some(kind) if includes_user_assigned(kind) && ids.is_empty() => errors.push(format!(
                "{key}.0.identity_ids: is required when `type` is {:?}",
                kind.as_str()
            )),
            Some(kind) if !includes_user_assigned(kind) && !ids.is_empty() => errors.push(format!(
                "{key}.0.identity_ids: can only be set when `type` includes `UserAssigned`, got {:?}",
                kind.as_str()
            )),
            _ => {}
        }
        for (index, id) in ids.iter().enumerate() {
            let id_key = format!("{key}.0.identity_ids.{index}");
            if id.is_string() {
                errors.extend(validate::resource_id::<UserAssignedIdentityId>(id, &id_key));
            } else {
                errors.push(format!("{id_key}: expected string, got {id}"));
            }
        }
    }
    errors
}

/// `(type, identity IDs)` with the IDs in canonical casing, ignoring the
/// computed principal and tenant.
fn configured_identity(value: &Value) -> Option<(String, BTreeSet<String>)> {
    let obj = value.as_array()?.first()?.as_object()?;
    let kind = obj.get("type").and_then(Value::as_str)?.to_string();
    let ids = obj
        .get("identity_ids")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(canonical_identity_id)
        .collect();
    Some((kind, ids))
}

fn canonical_identity_id(id: &str) -> String {
    UserAssignedIdentityId::parse_insensitively(id)
        .map(|parsed| parsed.id().to_lowercase())
        .unwrap_or_else(|_| id.to_lowercase())
}

/// Only the configurable half of the block takes part in diffs.
pub(crate) fn suppress_identity_diff(_key: &str, old: &Value, new: &Value) -> bool {
    configured_identity(old) == configured_identity(new)
}

/// Whether the configured identity differs from the one last recorded.
pub(crate) fn identity_changed(old: &Value, new: &Value) -> bool {
    configured_identity(old) != configured_identity(new)
}

/// `None` when no block is configured.
pub(crate) fn expand_identity(input: &[Value]) -> Result<Option<Identity>, ProviderError> {
    let Some(obj) = input.first().and_then(Value::as_object) else {
        return Ok(None);
    };
    let kind: IdentityType = obj.get("type").and_then(Value::as_str).unwrap_or_default().parse()?;
    let user_assigned_identities: HashMap<String, UserAssignedIdentityDetails> = obj
        .get("identity_ids")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(|id| (id.to_string(), UserAssignedIdentityDetails::default()))
        .collect();

    Ok(Some(Identity {
        kind,
        principal_id: None,
        tenant_id: None,
        user_assigned_identities,
    }))
}

/// Expand, or an explicit `None` identity when the block was removed.
pub(crate) fn expand_identity_for_update(input: &[Value]) -> Result<Identity, ProviderError> {
    Ok(expand_identity(input)?.unwrap_or(Identity {
        kind: IdentityType::None,
        principal_id: None,
        tenant_id: None,
        user_assigned_identities: HashMap::new(),
    }))
}

pub(crate) fn flatten_identity(identity: Option<&Identity>) -> Value {
    let Some(identity) = identity.filter(|i| i.kind != IdentityType::None) else {
        return json!([]);
    };
    let mut ids: Vec<String> = identity
        .user_assigned_identities
        .keys()
        .map(|id| {
            UserAssignedIdentityId::parse_insensitively(id)
                .map(|parsed| parsed.id())
                .unwrap_or_else(|_| id.clone())
        })
        .collect();
    ids.sort();

    json!([{
        "type": identity.kind.as_str(),
        "identity_ids": ids,
        "principal_id": identity.principal_id.clone().unwrap_or_default(),
        "tenant_id": identity.tenant_id.clone().unwrap_or_default(),
    }])
}
