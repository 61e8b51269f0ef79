use azurerm_resourceids::ids::commonids::SubscriptionId;
use azurerm_resourceids::ids::storage::StorageAccountId;
use azurerm_sdk::resource_manager::storage::v2023_01_01::storage_accounts::{
    AccessTier, Kind, MinimumTlsVersion, Sku, SkuName, SkuTier, StorageAccountCheckNameAvailabilityParameters,
    StorageAccountCreateParameters, StorageAccountPropertiesCreateParameters, StorageAccountUpdateParameters,
};
use serde_json::Value;

use super::{
    expand_tags, flatten_tags, found, location_attribute, name_attribute, require_absent,
    resource_group_name_attribute, tags_attribute,
};
use crate::clients::Clients;
use crate::data::ResourceData;
use crate::error::{format_err_chain, ProviderError};
use crate::resource::{read_after_write, BoxFuture, DiffContext, Presence, Resource, Timeouts};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::validate;

const RESOURCE_TYPE: &str = "azurerm_storage_account";

const REPLICATION_TYPES: &[&str] = &["LRS", "ZRS", "GRS", "RAGRS", "GZRS", "RAGZRS"];

/// Kinds that accept an `access_tier`.
const KINDS_SUPPORTING_ACCESS_TIER: &[Kind] = &[Kind::BlobStorage, Kind::FileStorage, Kind::StorageV2];

const ENDPOINT_ATTRIBUTES: &[&str] = &[
    "primary_blob_endpoint",
    "primary_dfs_endpoint",
    "primary_file_endpoint",
    "primary_queue_endpoint",
    "primary_table_endpoint",
    "primary_web_endpoint",
];

pub struct StorageAccountResource {
    schema: Schema,
}

impl Default for StorageAccountResource {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageAccountResource {
    pub fn new() -> Self {
        let mut attributes = vec![
            name_attribute(validate::storage_account_name),
            resource_group_name_attribute(),
            location_attribute(),
            Attribute::optional("account_kind", AttributeType::String)
                .with_default(Kind::StorageV2.as_str())
                .validate_with(validate::string_in_slice(Kind::possible_values(), false)),
            Attribute::required("account_tier", AttributeType::String)
                .force_new()
                .validate_with(validate::string_in_slice(SkuTier::possible_values(), false)),
            Attribute::required("account_replication_type", AttributeType::String)
                .validate_with(validate::string_in_slice(REPLICATION_TYPES, false)),
            Attribute::optional("access_tier", AttributeType::String)
                .also_computed()
                .validate_with(validate::string_in_slice(AccessTier::possible_values(), false)),
            Attribute::optional("min_tls_version", AttributeType::String)
                .with_default(MinimumTlsVersion::Tls1_2.as_str())
                .validate_with(validate::string_in_slice(MinimumTlsVersion::possible_values(), false)),
            Attribute::optional("https_traffic_only_enabled", AttributeType::Bool).with_default(true),
            tags_attribute(),
            Attribute::computed("primary_location", AttributeType::String),
            Attribute::computed("secondary_location", AttributeType::String),
            Attribute::computed("primary_access_key", AttributeType::String).sensitive(),
            Attribute::computed("secondary_access_key", AttributeType::String).sensitive(),
        ];
        attributes.extend(
            ENDPOINT_ATTRIBUTES
                .iter()
                .copied()
                .map(|name| Attribute::computed(name, AttributeType::String)),
        );
        Self {
            schema: Schema::new(attributes),
        }
    }

    fn parse_id(data: &ResourceData) -> Result<StorageAccountId, ProviderError> {
        Ok(StorageAccountId::parse(data.id().unwrap_or_default())?)
    }

    fn sku(data: &ResourceData) -> Result<SkuName, ProviderError> {
        let name = format!(
            "{}_{}",
            data.get_string("account_tier"),
            data.get_string("account_replication_type")
        );
        Ok(name.parse()?)
    }

    async fn do_create(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let client = &clients.storage.storage_accounts;
        let id = StorageAccountId::new(
            &clients.subscription_id,
            data.get_string("resource_group_name"),
            data.get_string("name"),
        );

        require_absent(RESOURCE_TYPE, &id, id.id(), client.get_properties(&id).await)?;

        let availability = client
            .check_name_availability(
                &SubscriptionId::new(&clients.subscription_id),
                &StorageAccountCheckNameAvailabilityParameters::new(&id.storage_account_name),
            )
            .await
            .map_err(|e| {
                ProviderError::CreateFailed(format!(
                    "checking name availability for {id}: {}",
                    format_err_chain(&e)
                ))
            })?;
        if let Some(result) = availability.model {
            if result.name_available == Some(false) {
                return Err(ProviderError::CreateFailed(format!(
                    "creating {id}: the name {:?} is not available: {}",
                    id.storage_account_name,
                    result.message.unwrap_or_default()
                )));
            }
        }

        let kind: Kind = data.get_string("account_kind").parse()?;
        let access_tier = match data.get_str("access_tier") {
            Some(tier) => Some(tier.parse()?),
            None if KINDS_SUPPORTING_ACCESS_TIER.contains(&kind) => Some(AccessTier::Hot),
            None => None,
        };

        let input = StorageAccountCreateParameters {
            kind,
            location: validate::normalize_location(&data.get_string("location")),
            sku: Sku {
                name: Self::sku(data)?,
                tier: None,
            },
            identity: None,
            properties: Some(StorageAccountPropertiesCreateParameters {
                access_tier,
                minimum_tls_version: Some(data.get_string("min_tls_version").parse()?),
                supports_https_traffic_only: Some(data.get_bool("https_traffic_only_enabled")),
                ..StorageAccountPropertiesCreateParameters::default()
            }),
            tags: expand_tags(data),
        };
        client
            .create_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::create(&id, e))?;

        data.set_id(id.id());
        read_after_write(self, clients, data).await
    }

    async fn do_read(&self, clients: &Clients, data: &mut ResourceData) -> Result<Presence, ProviderError> {
        let client = &clients.storage.storage_accounts;
        let id = Self::parse_id(data)?;

        let Some(resp) = found(client.get_properties(&id).await).map_err(|e| ProviderError::read(&id, e))? else {
            tracing::info!(id = %id.id(), "storage account was not found, removing from state");
            data.clear_id();
            return Ok(Presence::Gone);
        };

        data.set("name", id.storage_account_name.clone());
        data.set("resource_group_name", id.resource_group_name.clone());

        let Some(model) = resp.model else {
            return Ok(Presence::Present);
        };
        data.set("location", validate::normalize_location(&model.location));
        data.set_opt("account_kind", model.kind.map(|k| k.as_str()));
        if let Some(sku) = &model.sku {
            let (tier, replication) = sku.name.tier_and_replication();
            data.set("account_tier", tier);
            data.set("account_replication_type", replication);
        }

        if let Some(props) = &model.properties {
            data.set_opt("access_tier", props.access_tier.map(|t| t.as_str()));
            data.set_opt("min_tls_version", props.minimum_tls_version.map(|v| v.as_str()));
            data.set("https_traffic_only_enabled", props.supports_https_traffic_only.unwrap_or(true));
            data.set_opt("primary_location", props.primary_location.clone());
            data.set_opt("secondary_location", props.secondary_location.clone());

            let endpoints = props.primary_endpoints.clone().unwrap_or_default();
            let values = [
                endpoints.blob,
                endpoints.dfs,
                endpoints.file,
                endpoints.queue,
                endpoints.table,
                endpoints.web,
            ];
            for (attribute, value) in ENDPOINT_ATTRIBUTES.iter().zip(values) {
                data.set_opt(attribute, value);
            }
        }

        let keys = client.list_keys(&id).await.map_err(|e| {
            ProviderError::ReadFailed(format!("listing keys for {id}: {}", format_err_chain(&e)))
        })?;
        let keys = keys.model.map(|k| k.keys).unwrap_or_default();
        let key_value = |index: usize| keys.get(index).and_then(|k| k.value.clone());
        data.set_opt("primary_access_key", key_value(0));
        data.set_opt("secondary_access_key", key_value(1));

        data.set("tags", flatten_tags(model.tags.as_ref()));
        Ok(Presence::Present)
    }

    async fn do_update(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let id = Self::parse_id(data)?;

        let mut update = StorageAccountUpdateParameters::default();
        if data.has_change("account_kind") {
            update.kind = Some(data.get_string("account_kind").parse()?);
        }
        if data.has_change("account_replication_type") {
            update.sku = Some(Sku {
                name: Self::sku(data)?,
                tier: None,
            });
        }
        if data.has_changes(&["access_tier", "min_tls_version", "https_traffic_only_enabled"]) {
            let mut props = StorageAccountPropertiesCreateParameters::default();
            if data.has_change("access_tier") {
                props.access_tier = data.get_str("access_tier").map(str::parse).transpose()?;
            }
            if data.has_change("min_tls_version") {
                props.minimum_tls_version = Some(data.get_string("min_tls_version").parse()?);
            }
            if data.has_change("https_traffic_only_enabled") {
                props.supports_https_traffic_only = Some(data.get_bool("https_traffic_only_enabled"));
            }
            update.properties = Some(props);
        }
        if data.has_change("tags") {
            update.tags = Some(expand_tags(data).unwrap_or_default());
        }

        if update != StorageAccountUpdateParameters::default() {
            clients
                .storage
                .storage_accounts
                .update(&id, &update)
                .await
                .map_err(|e| ProviderError::update(&id, e))?;
        }

        read_after_write(self, clients, data).await
    }

    async fn do_delete(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let id = Self::parse_id(data)?;
        match clients.storage.storage_accounts.delete(&id).await {
            Ok(()) => {}
            Err(e) if e.was_not_found() => {
                tracing::info!(id = %id.id(), "storage account already gone");
            }
            Err(e) => return Err(ProviderError::delete(&id, e)),
        }
        data.clear_id();
        Ok(())
    }
}

impl Resource for StorageAccountResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::writes(60)
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ProviderError> {
        StorageAccountId::parse(id)?;
        Ok(())
    }

    fn customize_diff(&self, diff: &mut DiffContext<'_>) -> Result<(), ProviderError> {
        if !diff.is_new_resource() {
            // Only `Storage` upgrades to `StorageV2` in place.
            if diff.has_change("account_kind") {
                let old = diff.old("account_kind").and_then(Value::as_str).unwrap_or_default();
                let new = diff.get_str("account_kind").unwrap_or_default();
                if !(old == Kind::Storage.as_str() && new == Kind::StorageV2.as_str()) {
                    tracing::debug!(old, new, "storage account kind cannot be migrated, recreating");
                    diff.force_new("account_kind");
                }
            }

            // Moving between zonal and non-zonal redundancy needs a new account.
            if diff.has_change("account_replication_type") {
                let old = diff
                    .old("account_replication_type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_uppercase();
                let new = diff
                    .get_str("account_replication_type")
                    .unwrap_or_default()
                    .to_uppercase();
                let zonal = |r: &str| matches!(r, "ZRS" | "GZRS" | "RAGZRS");
                if zonal(&old) != zonal(&new) {
                    diff.force_new("account_replication_type");
                }
            }
        }

        if diff.get_str("access_tier").is_some() {
            let kind: Kind = diff.get_str("account_kind").unwrap_or(Kind::StorageV2.as_str()).parse()?;
            if !KINDS_SUPPORTING_ACCESS_TIER.contains(&kind) {
                let kinds: Vec<&str> = KINDS_SUPPORTING_ACCESS_TIER.iter().map(Kind::as_str).collect();
                return Err(ProviderError::Validation(vec![format!(
                    "`access_tier` is only available for accounts where `kind` is set to one of: {}",
                    kinds.join(" / ")
                )]));
            }
        }

        Ok(())
    }

    fn create<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.do_create(clients, data))
    }

    fn read<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData) -> BoxFuture<'a, Result<Presence, ProviderError>> {
        Box::pin(self.do_read(clients, data))
    }

    fn update<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.do_update(clients, data))
    }

    fn delete<'a>(&'a self, clients: &'a Clients, data: &'a mut ResourceData) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.do_delete(clients, data))
    }
}
