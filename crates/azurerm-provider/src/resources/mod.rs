//! One module per managed resource type.

pub mod app_configuration;
mod identity;
pub mod key_vault;
pub mod resource_group;
pub mod storage_account;

use std::fmt::Display;

use azurerm_sdk::models::Tags;
use azurerm_sdk::{ArmError, ArmResult};
use serde_json::{Map, Value};

use crate::data::ResourceData;
use crate::error::{format_err_chain, ProviderError};
use crate::schema::{Attribute, AttributeType};
use crate::validate;

pub use app_configuration::AppConfigurationResource;
pub use key_vault::KeyVaultResource;
pub use resource_group::ResourceGroupResource;
pub use storage_account::StorageAccountResource;

/// Every resource type this provider manages.
pub fn all() -> Vec<Box<dyn crate::resource::Resource>> {
    vec![
        Box::new(ResourceGroupResource::new()),
        Box::new(AppConfigurationResource::new()),
        Box::new(StorageAccountResource::new()),
        Box::new(KeyVaultResource::new()),
    ]
}

/// Fail with "requires import" unless the lookup came back 404.
pub(crate) fn require_absent<T>(
    resource_type: &str,
    id: &impl Display,
    raw_id: String,
    existing: ArmResult<T>,
) -> Result<(), ProviderError> {
    match existing {
        Ok(_) => Err(ProviderError::RequiresImport {
            resource_type: resource_type.to_string(),
            id: raw_id,
        }),
        Err(e) if e.was_not_found() => Ok(()),
        Err(e) => Err(ProviderError::CreateFailed(format!(
            "checking for presence of existing {id}: {}",
            format_err_chain(&e)
        ))),
    }
}

/// `Some` when the lookup succeeded, `None` on 404.
pub(crate) fn found<T>(result: ArmResult<T>) -> Result<Option<T>, ArmError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.was_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

pub(crate) fn name_attribute(validator: fn(&Value, &str) -> Vec<String>) -> Attribute {
    Attribute::required("name", AttributeType::String)
        .force_new()
        .validate_with(validator)
}

pub(crate) fn resource_group_name_attribute() -> Attribute {
    Attribute::required("resource_group_name", AttributeType::String)
        .force_new()
        .validate_with(validate::resource_group_name)
}

pub(crate) fn location_attribute() -> Attribute {
    Attribute::required("location", AttributeType::String)
        .force_new()
        .validate_with(validate::location)
        .suppress_diff(validate::suppress_location_diff)
}

pub(crate) fn tags_attribute() -> Attribute {
    Attribute::optional("tags", AttributeType::Map).validate_with(validate::tags)
}

pub(crate) fn expand_tags(data: &ResourceData) -> Option<Tags> {
    let tags = data.get_string_map("tags");
    (!tags.is_empty()).then_some(tags)
}

pub(crate) fn flatten_tags(tags: Option<&Tags>) -> Value {
    let map: Map<String, Value> = tags
        .into_iter()
        .flatten()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}
