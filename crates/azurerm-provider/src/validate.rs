//! Validation functions for schema attributes.
//!
//! Every validator has the shape `fn(&Value, key) -> Vec<String>` so it can
//! be handed straight to [`Attribute::validate_with`](crate::schema::Attribute::validate_with).
//! A value of the wrong JSON type yields no errors here; type checking is
//! the schema's job.

use std::sync::LazyLock;

use azurerm_resourceids::ResourceId;
use serde_json::Value;

static RESOURCE_GROUP_NAME_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[-\w._()]+$").expect("RESOURCE_GROUP_NAME_RE is a valid regex pattern")
});

static CONFIGURATION_STORE_NAME_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-zA-Z0-9-]{5,50}$").expect("CONFIGURATION_STORE_NAME_RE is a valid regex pattern")
});

static STORAGE_ACCOUNT_NAME_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-z0-9]{3,24}$").expect("STORAGE_ACCOUNT_NAME_RE is a valid regex pattern")
});

static KEY_VAULT_NAME_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-zA-Z0-9-]{3,24}$").expect("KEY_VAULT_NAME_RE is a valid regex pattern")
});

const MAX_TAGS: usize = 50;
const MAX_TAG_KEY_LEN: usize = 512;
const MAX_TAG_VALUE_LEN: usize = 256;

fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

/// The value must be one of `valid`, optionally ignoring case.
pub fn string_in_slice(
    valid: &'static [&'static str],
    ignore_case: bool,
) -> impl Fn(&Value, &str) -> Vec<String> + Send + Sync + 'static {
    move |value, key| {
        let Some(v) = as_str(value) else {
            return vec![];
        };
        let found = valid
            .iter()
            .any(|candidate| if ignore_case { candidate.eq_ignore_ascii_case(v) } else { *candidate == v });
        if found {
            vec![]
        } else {
            vec![format!("expected {key} to be one of {valid:?}, got {v}")]
        }
    }
}

pub fn int_between(min: i64, max: i64) -> impl Fn(&Value, &str) -> Vec<String> + Send + Sync + 'static {
    move |value, key| match value.as_i64() {
        Some(v) if v < min || v > max => {
            vec![format!("expected {key} to be in the range ({min} - {max}), got {v}")]
        }
        _ => vec![],
    }
}

pub fn string_is_not_empty(value: &Value, key: &str) -> Vec<String> {
    match as_str(value) {
        Some(v) if v.trim().is_empty() => vec![format!("expected {key:?} to not be an empty string or whitespace")],
        _ => vec![],
    }
}

pub fn is_uuid(value: &Value, key: &str) -> Vec<String> {
    match as_str(value) {
        Some(v) if uuid::Uuid::parse_str(v).is_err() => vec![format!("expected {key:?} to be a valid UUID, got {v}")],
        _ => vec![],
    }
}

pub fn is_url_http_or_https(value: &Value, key: &str) -> Vec<String> {
    let Some(v) = as_str(value) else {
        return vec![];
    };
    match url::Url::parse(v) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => vec![],
        Ok(u) if u.host_str().is_none() => vec![format!("expected {key:?} to have a host, got {v}")],
        Ok(_) => vec![format!("expected {key:?} to have a url with schema of: \"http,https\", got {v}")],
        Err(e) => vec![format!("expected {key:?} to be a valid url, got {v}: {e}")],
    }
}

/// Up to 90 characters: letters, digits, underscores, hyphens, periods and
/// parentheses. Cannot end in a period.
pub fn resource_group_name(value: &Value, key: &str) -> Vec<String> {
    let Some(v) = as_str(value) else {
        return vec![];
    };
    let mut errors = Vec::new();
    if v.is_empty() {
        errors.push(format!("{key} cannot be blank"));
    } else if v.len() > 90 {
        errors.push(format!("{key} may not exceed 90 characters in length"));
    }
    if v.ends_with('.') {
        errors.push(format!("{key} cannot end with a period"));
    }
    if !v.is_empty() && !RESOURCE_GROUP_NAME_RE.is_match(v) {
        errors.push(format!(
            "{key} can only consist of underscores, hyphens, periods, parenthesis, letters or digits"
        ));
    }
    errors
}

pub fn configuration_store_name(value: &Value, key: &str) -> Vec<String> {
    match as_str(value) {
        Some(v) if !CONFIGURATION_STORE_NAME_RE.is_match(v) => vec![format!(
            "{key} must be between 5-50 chars, may contain only alphanumeric characters and dashes"
        )],
        _ => vec![],
    }
}

pub fn storage_account_name(value: &Value, key: &str) -> Vec<String> {
    match as_str(value) {
        Some(v) if !STORAGE_ACCOUNT_NAME_RE.is_match(v) => vec![format!(
            "{key} can only consist of lowercase letters and numbers, and must be between 3 and 24 characters long"
        )],
        _ => vec![],
    }
}

pub fn key_vault_name(value: &Value, key: &str) -> Vec<String> {
    let Some(v) = as_str(value) else {
        return vec![];
    };
    let mut errors = Vec::new();
    if !KEY_VAULT_NAME_RE.is_match(v) {
        errors.push(format!(
            "{key} may only contain alphanumeric characters and dashes and must be between 3-24 chars"
        ));
    }
    if !v.starts_with(|c: char| c.is_ascii_alphabetic()) {
        errors.push(format!("{key} must start with a letter"));
    }
    if !v.ends_with(|c: char| c.is_ascii_alphanumeric()) {
        errors.push(format!("{key} must end with a letter or digit"));
    }
    if v.contains("--") {
        errors.push(format!("{key} must not contain any consecutive hyphens"));
    }
    errors
}

pub fn location(value: &Value, key: &str) -> Vec<String> {
    match as_str(value) {
        Some(v) if normalize_location(v).is_empty() => vec![format!("{key} must not be empty")],
        _ => vec![],
    }
}

pub fn tags(value: &Value, key: &str) -> Vec<String> {
    let Some(map) = value.as_object() else {
        return vec![];
    };
    let mut errors = Vec::new();
    if map.len() > MAX_TAGS {
        errors.push(format!("a maximum of {MAX_TAGS} tags can be applied to each ARM resource"));
    }
    for (k, v) in map {
        if k.len() > MAX_TAG_KEY_LEN {
            errors.push(format!("{key}: the maximum length for a tag key is {MAX_TAG_KEY_LEN} characters: {k:?}"));
        }
        if let Some(v) = v.as_str() {
            if v.len() > MAX_TAG_VALUE_LEN {
                errors.push(format!(
                    "{key}: the maximum length for a tag value is {MAX_TAG_VALUE_LEN} characters: the value for {k:?} is {} characters",
                    v.len()
                ));
            }
        }
    }
    errors
}

/// The value must parse as a `T` resource ID.
pub fn resource_id<T: ResourceId>(value: &Value, key: &str) -> Vec<String> {
    match as_str(value) {
        Some(v) => azurerm_resourceids::validate_id::<T>(v, key).err().into_iter().collect(),
        None => vec![],
    }
}

/// `West Europe` and `westeurope` are the same location.
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

pub fn suppress_location_diff(_key: &str, old: &Value, new: &Value) -> bool {
    match (old.as_str(), new.as_str()) {
        (Some(old), Some(new)) => normalize_location(old) == normalize_location(new),
        _ => false,
    }
}

pub fn suppress_case_diff(_key: &str, old: &Value, new: &Value) -> bool {
    match (old.as_str(), new.as_str()) {
        (Some(old), Some(new)) => old.eq_ignore_ascii_case(new),
        _ => false,
    }
}
