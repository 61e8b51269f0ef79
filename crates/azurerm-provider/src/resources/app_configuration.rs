use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use azurerm_resourceids::ids::appconfiguration::{ConfigurationStoreId, DeletedConfigurationStoreId, ReplicaId};
use azurerm_resourceids::ids::commonids::SubscriptionId;
use azurerm_sdk::resource_manager::appconfiguration::v2024_05_01::configuration_stores::{
    ApiKey, AuthenticationMode, ConfigurationStore, ConfigurationStoreProperties,
    ConfigurationStorePropertiesUpdateParameters, ConfigurationStoreUpdateParameters, CreateMode,
    DataPlaneProxyProperties, EncryptionProperties, KeyVaultProperties, PrivateLinkDelegation, PublicNetworkAccess,
    Sku,
};
use azurerm_sdk::resource_manager::appconfiguration::v2024_05_01::operations::CheckNameAvailabilityParameters;
use azurerm_sdk::resource_manager::appconfiguration::v2024_05_01::replicas::Replica;
use serde_json::{json, Value};

use super::identity::{
    expand_identity, expand_identity_for_update, flatten_identity, identity_attribute, identity_changed,
};
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

const RESOURCE_TYPE: &str = "azurerm_app_configuration";

/// Retention the service applies when none is sent.
const DEFAULT_SOFT_DELETE_RETENTION_DAYS: i64 = 7;

const MAX_REPLICA_AND_STORE_NAME_LEN: usize = 60;

const ENCRYPTION_KEYS: &[&str] = &["key_vault_key_identifier", "identity_client_id"];

static REPLICA_NAME_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[a-zA-Z0-9]{1,50}$").expect("REPLICA_NAME_RE is a valid regex pattern")
});

pub struct AppConfigurationResource {
    schema: Schema,
}

impl Default for AppConfigurationResource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigurationResource {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![
                name_attribute(validate::configuration_store_name),
                resource_group_name_attribute(),
                location_attribute(),
                Attribute::optional("sku", AttributeType::String)
                    .with_default("free")
                    .validate_with(validate::string_in_slice(&["free", "developer", "standard", "premium"], false)),
                Attribute::optional("local_auth_enabled", AttributeType::Bool).with_default(true),
                Attribute::optional("public_network_access", AttributeType::String)
                    .also_computed()
                    .validate_with(validate::string_in_slice(PublicNetworkAccess::possible_values(), true))
                    .suppress_diff(validate::suppress_case_diff),
                Attribute::optional("purge_protection_enabled", AttributeType::Bool).with_default(false),
                Attribute::optional("soft_delete_retention_days", AttributeType::Int)
                    .with_default(DEFAULT_SOFT_DELETE_RETENTION_DAYS)
                    .force_new()
                    .validate_with(validate::int_between(1, 7)),
                Attribute::optional("data_plane_proxy_authentication_mode", AttributeType::String)
                    .with_default(AuthenticationMode::Local.as_str())
                    .validate_with(validate::string_in_slice(AuthenticationMode::possible_values(), false)),
                Attribute::optional("data_plane_proxy_private_link_delegation_enabled", AttributeType::Bool)
                    .with_default(false),
                identity_attribute(),
                Attribute::optional("encryption", AttributeType::List)
                    .validate_with(validate_encryption)
                    .suppress_diff(suppress_encryption_diff),
                Attribute::optional("replica", AttributeType::List)
                    .validate_with(validate_replicas)
                    .suppress_diff(suppress_replica_diff),
                tags_attribute(),
                Attribute::computed("endpoint", AttributeType::String),
                Attribute::computed("primary_read_key", AttributeType::Map).sensitive(),
                Attribute::computed("primary_write_key", AttributeType::Map).sensitive(),
                Attribute::computed("secondary_read_key", AttributeType::Map).sensitive(),
                Attribute::computed("secondary_write_key", AttributeType::Map).sensitive(),
            ]),
        }
    }

    fn parse_id(data: &ResourceData) -> Result<ConfigurationStoreId, ProviderError> {
        Ok(ConfigurationStoreId::parse(data.id().unwrap_or_default())?)
    }

    async fn do_create(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let stores = &clients.app_configuration.configuration_stores;
        let id = ConfigurationStoreId::new(
            &clients.subscription_id,
            data.get_string("resource_group_name"),
            data.get_string("name"),
        );

        require_absent(RESOURCE_TYPE, &id, id.id(), stores.get(&id).await)?;

        let location = validate::normalize_location(&data.get_string("location"));

        let mut recover_soft_deleted = false;
        if clients.features.app_configuration.recover_soft_deleted {
            let deleted_id =
                DeletedConfigurationStoreId::new(&clients.subscription_id, &location, &id.configuration_store_name);
            match clients.app_configuration.configuration_stores.get_deleted(&deleted_id).await {
                Ok(_) => {
                    tracing::debug!(id = %deleted_id.id(), "soft-deleted app configuration exists, marked for recover");
                    recover_soft_deleted = true;
                }
                Err(e) if e.was_status(403) => {
                    return Err(ProviderError::CreateFailed(missing_permission_message(
                        &id.configuration_store_name,
                        &location,
                    )));
                }
                Err(e) if e.was_not_found() => {}
                Err(e) => {
                    return Err(ProviderError::CreateFailed(format!(
                        "checking for presence of deleted {deleted_id}: {}",
                        format_err_chain(&e)
                    )));
                }
            }
        }

        let delegation = if data.get_bool("data_plane_proxy_private_link_delegation_enabled") {
            PrivateLinkDelegation::Enabled
        } else {
            PrivateLinkDelegation::Disabled
        };
        let mut properties = ConfigurationStoreProperties {
            data_plane_proxy: Some(DataPlaneProxyProperties {
                authentication_mode: Some(data.get_string("data_plane_proxy_authentication_mode").parse()?),
                private_link_delegation: Some(delegation),
            }),
            enable_purge_protection: Some(data.get_bool("purge_protection_enabled")),
            disable_local_auth: Some(!data.get_bool("local_auth_enabled")),
            public_network_access: data.get_str("public_network_access").map(str::parse).transpose()?,
            encryption: expand_encryption(&data.get_list("encryption")),
            ..ConfigurationStoreProperties::default()
        };
        if let Some(days) = data
            .get_i64("soft_delete_retention_days")
            .filter(|d| *d != DEFAULT_SOFT_DELETE_RETENTION_DAYS)
        {
            properties.soft_delete_retention_in_days = Some(days);
        }
        if recover_soft_deleted {
            properties.create_mode = Some(CreateMode::Recover);
        }

        let input = ConfigurationStore {
            id: None,
            name: None,
            kind: None,
            location: location.clone(),
            identity: expand_identity(&data.get_list("identity"))?,
            sku: Sku {
                name: data.get_string("sku"),
            },
            properties: Some(properties),
            system_data: None,
            tags: expand_tags(data),
        };
        stores
            .create_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::create(&id, e))?;

        data.set_id(id.id());

        let created = stores.get(&id).await.map_err(|e| ProviderError::read(&id, e))?;
        let has_endpoint = created
            .model
            .as_ref()
            .and_then(|m| m.properties.as_ref())
            .is_some_and(|p| p.endpoint.is_some());
        if !has_endpoint {
            return Err(ProviderError::ReadFailed(format!(
                "retrieving {id}: `model.properties.endpoint` was nil"
            )));
        }

        let replicas = expand_replicas(&data.get_list("replica"), &id.configuration_store_name, &location)
            .map_err(|e| ProviderError::CreateFailed(format!("expanding `replica`: {e}")))?;
        for replica in replicas {
            let replica_id = replica_id(&id, &replica)?;
            clients
                .app_configuration
                .replicas
                .create_then_poll(&replica_id, &replica)
                .await
                .map_err(|e| ProviderError::create(&replica_id, e))?;
        }

        read_after_write(self, clients, data).await
    }

    async fn do_read(&self, clients: &Clients, data: &mut ResourceData) -> Result<Presence, ProviderError> {
        let stores = &clients.app_configuration.configuration_stores;
        let id = Self::parse_id(data)?;

        let Some(resp) = found(stores.get(&id).await).map_err(|e| ProviderError::read(&id, e))? else {
            tracing::info!(id = %id.id(), "app configuration was not found, removing from state");
            data.clear_id();
            return Ok(Presence::Gone);
        };

        let keys = stores.list_keys(&id).await.map_err(|e| {
            ProviderError::ReadFailed(format!("retrieving access keys for {id}: {}", format_err_chain(&e)))
        })?;

        data.set("name", id.configuration_store_name.clone());
        data.set("resource_group_name", id.resource_group_name.clone());

        let Some(model) = resp.model else {
            return Ok(Presence::Present);
        };
        data.set("location", validate::normalize_location(&model.location));
        data.set("sku", model.sku.name.clone());

        if let Some(props) = &model.properties {
            if let Some(proxy) = &props.data_plane_proxy {
                if let Some(mode) = &proxy.authentication_mode {
                    data.set("data_plane_proxy_authentication_mode", mode.as_str());
                }
                if let Some(delegation) = &proxy.private_link_delegation {
                    data.set(
                        "data_plane_proxy_private_link_delegation_enabled",
                        *delegation == PrivateLinkDelegation::Enabled,
                    );
                }
            }
            data.set_opt("endpoint", props.endpoint.clone());
            data.set_opt("public_network_access", props.public_network_access.map(|p| p.as_str()));
            data.set("local_auth_enabled", !props.disable_local_auth.unwrap_or(false));
            data.set("purge_protection_enabled", props.enable_purge_protection.unwrap_or(false));
            // Stores without soft delete report no retention at all.
            let retention = props
                .soft_delete_retention_in_days
                .or_else(|| data.get_i64("soft_delete_retention_days"));
            data.set_opt("soft_delete_retention_days", retention);
            data.set("encryption", flatten_encryption(props.encryption.as_ref()));
        }
        data.set("identity", flatten_identity(model.identity.as_ref()));

        let access_keys = flatten_access_keys(&keys);
        for (attribute, value) in access_keys {
            data.set(attribute, value);
        }

        let replicas = clients
            .app_configuration
            .replicas
            .list_by_configuration_store(&id)
            .await
            .map_err(|e| ProviderError::ReadFailed(format!("retrieving replicas for {id}: {}", format_err_chain(&e))))?;
        data.set("replica", flatten_replicas(&replicas));
        data.set("tags", flatten_tags(model.tags.as_ref()));

        Ok(Presence::Present)
    }

    async fn do_update(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let stores = &clients.app_configuration.configuration_stores;
        let id = Self::parse_id(data)?;

        let existing = stores.get(&id).await.map_err(|e| ProviderError::read(&id, e))?;
        let Some(model) = existing.model else {
            return Err(ProviderError::ReadFailed(format!("retrieving {id}: `model` was nil")));
        };
        let Some(existing_props) = &model.properties else {
            return Err(ProviderError::ReadFailed(format!("retrieving {id}: `properties` was nil")));
        };

        let mut update = ConfigurationStoreUpdateParameters::default();
        if data.has_change("sku") {
            update.sku = Some(Sku {
                name: data.get_string("sku"),
            });
        }
        if data.has_change("tags") {
            update.tags = Some(expand_tags(data).unwrap_or_default());
        }
        let (old_identity, new_identity) = data.get_change("identity");
        if identity_changed(&old_identity, &new_identity) {
            update.identity = Some(expand_identity_for_update(&data.get_list("identity"))?);
        }

        let mut props = ConfigurationStorePropertiesUpdateParameters::default();
        let (old_encryption, new_encryption) = data.get_change("encryption");
        if !suppress_encryption_diff("encryption", &old_encryption, &new_encryption) {
            // Removing the block sends empty key vault properties.
            props.encryption = Some(expand_encryption(&data.get_list("encryption")).unwrap_or(EncryptionProperties {
                key_vault_properties: Some(KeyVaultProperties::default()),
            }));
        }
        if data.has_change("data_plane_proxy_authentication_mode") {
            props.data_plane_proxy.get_or_insert_with(Default::default).authentication_mode =
                Some(data.get_string("data_plane_proxy_authentication_mode").parse()?);
        }
        if data.has_change("data_plane_proxy_private_link_delegation_enabled") {
            let delegation = if data.get_bool("data_plane_proxy_private_link_delegation_enabled") {
                PrivateLinkDelegation::Enabled
            } else {
                PrivateLinkDelegation::Disabled
            };
            props.data_plane_proxy.get_or_insert_with(Default::default).private_link_delegation = Some(delegation);
        }
        if data.has_change("local_auth_enabled") {
            props.disable_local_auth = Some(!data.get_bool("local_auth_enabled"));
        }
        if data.has_change("public_network_access") {
            props.public_network_access = data.get_str("public_network_access").map(str::parse).transpose()?;
        }
        if data.has_change("purge_protection_enabled") {
            let enabled = existing_props.enable_purge_protection.unwrap_or(false);
            let wanted = data.get_bool("purge_protection_enabled");
            if enabled && !wanted {
                return Err(ProviderError::UpdateFailed(format!(
                    "updating {id}: once Purge Protection has been Enabled it's not possible to disable it"
                )));
            }
            props.enable_purge_protection = Some(wanted);
        }
        if props != ConfigurationStorePropertiesUpdateParameters::default() {
            update.properties = Some(props);
        }

        if update != ConfigurationStoreUpdateParameters::default() {
            stores
                .update_then_poll(&id, &update)
                .await
                .map_err(|e| ProviderError::update(&id, e))?;
        }

        if data.has_change("replica") {
            self.update_replicas(clients, data, &id, &validate::normalize_location(&model.location))
                .await?;
        }

        read_after_write(self, clients, data).await
    }

    /// Delete replicas that were removed or moved, then create the new ones.
    async fn update_replicas(
        &self,
        clients: &Clients,
        data: &ResourceData,
        id: &ConfigurationStoreId,
        store_location: &str,
    ) -> Result<(), ProviderError> {
        let client = &clients.app_configuration.replicas;
        let (old, new) = data.get_change("replica");
        let old = old.as_array().cloned().unwrap_or_default();
        let new = new.as_array().cloned().unwrap_or_default();

        let mut unchanged = HashSet::new();
        let mut removed = Vec::new();
        for old_replica in &old {
            let (old_name, old_location) = replica_fields(old_replica);
            let kept = new.iter().any(|new_replica| {
                let (name, location) = replica_fields(new_replica);
                name.eq_ignore_ascii_case(old_name)
                    && validate::normalize_location(location) == validate::normalize_location(old_location)
            });
            if kept {
                unchanged.insert(old_name.to_string());
            } else {
                removed.push(ReplicaId::new(
                    &id.subscription_id,
                    &id.resource_group_name,
                    &id.configuration_store_name,
                    old_name,
                ));
            }
        }

        for replica_id in removed {
            tracing::info!(id = %replica_id.id(), "deleting replica");
            client
                .delete_then_poll(&replica_id)
                .await
                .map_err(|e| ProviderError::delete(&replica_id, e))?;
        }

        let replicas = expand_replicas(&new, &id.configuration_store_name, store_location)
            .map_err(|e| ProviderError::UpdateFailed(format!("expanding `replica`: {e}")))?;
        for replica in replicas {
            if replica.name.as_ref().is_some_and(|n| unchanged.contains(n)) {
                continue;
            }
            let replica_id = replica_id(id, &replica)?;
            if found(client.get(&replica_id).await)
                .map_err(|e| ProviderError::read(&replica_id, e))?
                .is_some()
            {
                return Err(ProviderError::UpdateFailed(format!(
                    "updating {id}: replica {replica_id} already exists"
                )));
            }
            client
                .create_then_poll(&replica_id, &replica)
                .await
                .map_err(|e| ProviderError::create(&replica_id, e))?;
        }
        Ok(())
    }

    async fn do_delete(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let stores = &clients.app_configuration.configuration_stores;
        let id = Self::parse_id(data)?;

        let Some(existing) = found(stores.get(&id).await).map_err(|e| ProviderError::read(&id, e))? else {
            tracing::info!(id = %id.id(), "app configuration already gone");
            data.clear_id();
            return Ok(());
        };
        let Some(model) = existing.model else {
            return Err(ProviderError::ReadFailed(format!("retrieving {id}: `model` was nil")));
        };
        let Some(props) = &model.properties else {
            return Err(ProviderError::ReadFailed(format!("retrieving {id}: `properties` was nil")));
        };
        let purge_protection_enabled = props.enable_purge_protection.unwrap_or(false);
        let soft_delete_enabled = props.soft_delete_retention_in_days.is_some_and(|d| d > 0);

        stores
            .delete_then_poll(&id)
            .await
            .map_err(|e| ProviderError::delete(&id, e))?;

        if clients.features.app_configuration.purge_soft_delete_on_destroy && soft_delete_enabled {
            let deleted_id = DeletedConfigurationStoreId::new(
                &clients.subscription_id,
                validate::normalize_location(&model.location),
                &id.configuration_store_name,
            );

            // Azure purges these itself once the retention period ends.
            if purge_protection_enabled {
                let deleted = stores.get_deleted(&deleted_id).await.map_err(|e| {
                    ProviderError::DeleteFailed(format!(
                        "while purging the soft-deleted, retrieving the Deletion Details for {id}: {}",
                        format_err_chain(&e)
                    ))
                })?;
                let dates = deleted
                    .model
                    .and_then(|m| m.properties)
                    .and_then(|p| p.deletion_date.zip(p.scheduled_purge_date));
                match dates {
                    Some((deleted_on, purge_on)) => tracing::debug!(
                        name = %id.configuration_store_name,
                        deleted_on = %deleted_on,
                        purge_on = %purge_on,
                        "app configuration has purge protection enabled, Azure will purge it"
                    ),
                    None => tracing::debug!(
                        name = %id.configuration_store_name,
                        "app configuration has purge protection enabled and will be purged automatically by Azure"
                    ),
                }
                data.clear_id();
                return Ok(());
            }

            tracing::debug!(name = %id.configuration_store_name, "marked for purge, executing purge");
            stores.purge_deleted_then_poll(&deleted_id).await.map_err(|e| {
                ProviderError::DeleteFailed(format!("purging {id}: {}", format_err_chain(&e)))
            })?;
            wait_for_purge(clients, &id, &deleted_id).await?;
            tracing::debug!(name = %id.configuration_store_name, "purged app configuration");
        }

        data.clear_id();
        Ok(())
    }
}

/// Upper bound on status checks in each phase of [`wait_for_purge`].
const PURGE_POLL_ATTEMPTS: u32 = 60;

/// The purge call can return before the deleted store is actually gone, and
/// the name stays reserved for a while after that. Poll until the deleted
/// store reads as not found, then until the name is available again.
async fn wait_for_purge(
    clients: &Clients,
    id: &ConfigurationStoreId,
    deleted_id: &DeletedConfigurationStoreId,
) -> Result<(), ProviderError> {
    let stores = &clients.app_configuration.configuration_stores;
    let mut attempts = 0;
    loop {
        match found(stores.get_deleted(deleted_id).await) {
            Ok(None) => break,
            Ok(Some(_)) => {}
            Err(e) => {
                return Err(ProviderError::DeleteFailed(format!(
                    "polling after purging for {id}: {}",
                    format_err_chain(&e)
                )));
            }
        }
        attempts += 1;
        if attempts >= PURGE_POLL_ATTEMPTS {
            return Err(ProviderError::DeleteFailed(format!(
                "waiting for {deleted_id} to be purged: still present after {attempts} checks"
            )));
        }
        tokio::time::sleep(clients.poll_interval()).await;
    }

    let subscription = SubscriptionId::new(&id.subscription_id);
    let input = CheckNameAvailabilityParameters::configuration_store(&id.configuration_store_name);
    let mut attempts = 0;
    loop {
        let status = clients
            .app_configuration
            .operations
            .check_name_availability(&subscription, &input)
            .await
            .map_err(|e| {
                ProviderError::DeleteFailed(format!(
                    "checking name availability of {:?} after purging {id}: {}",
                    id.configuration_store_name,
                    format_err_chain(&e)
                ))
            })?;
        if status.model.and_then(|m| m.name_available) == Some(true) {
            return Ok(());
        }
        attempts += 1;
        if attempts >= PURGE_POLL_ATTEMPTS {
            return Err(ProviderError::DeleteFailed(format!(
                "waiting for the name {:?} to be released after purging {id}: still unavailable after {attempts} checks",
                id.configuration_store_name
            )));
        }
        tokio::time::sleep(clients.poll_interval()).await;
    }
}

impl Resource for AppConfigurationResource {
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
        ConfigurationStoreId::parse(id)?;
        Ok(())
    }

    fn customize_diff(&self, diff: &mut DiffContext<'_>) -> Result<(), ProviderError> {
        // Production tiers cannot go down to `developer`, and nothing goes
        // back to `free`, without recreating the store.
        if !diff.is_new_resource() && diff.has_change("sku") {
            let old = diff.old("sku").and_then(Value::as_str).unwrap_or_default();
            let new = diff.get_str("sku").unwrap_or_default();
            if ((old == "premium" || old == "standard") && new == "developer") || new == "free" {
                diff.force_new("sku");
            }
        }

        let mut errors = Vec::new();
        if diff.get_str("data_plane_proxy_authentication_mode") == Some(AuthenticationMode::Local.as_str())
            && diff.get_bool("data_plane_proxy_private_link_delegation_enabled")
        {
            errors.push(
                "`data_plane_proxy_private_link_delegation_enabled` cannot be set to `true` when \
                 `data_plane_proxy_authentication_mode` is `Local`"
                    .to_string(),
            );
        }

        let was_protected = diff.old("purge_protection_enabled").and_then(Value::as_bool) == Some(true);
        if was_protected && !diff.get_bool("purge_protection_enabled") {
            errors.push("once Purge Protection has been Enabled it's not possible to disable it".to_string());
        }

        let replicas = diff.get("replica").and_then(Value::as_array).cloned().unwrap_or_default();
        let name = diff.get_str("name").unwrap_or_default();
        let location = validate::normalize_location(diff.get_str("location").unwrap_or_default());
        if let Err(e) = expand_replicas(&replicas, name, &location) {
            errors.push(format!("`replica`: {e}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Validation(errors))
        }
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

fn replica_fields(value: &Value) -> (&str, &str) {
    let name = value.get("name").and_then(Value::as_str).unwrap_or_default();
    let location = value.get("location").and_then(Value::as_str).unwrap_or_default();
    (name, location)
}

fn replica_id(store: &ConfigurationStoreId, replica: &Replica) -> Result<ReplicaId, ProviderError> {
    let name = replica
        .name
        .as_deref()
        .ok_or_else(|| ProviderError::Validation(vec!["`replica`: a replica is missing its name".to_string()]))?;
    Ok(ReplicaId::new(
        &store.subscription_id,
        &store.resource_group_name,
        &store.configuration_store_name,
        name,
    ))
}

/// Replica locations must be unique and differ from the store's own,
/// names must be unique, and each name plus the store name must fit in
/// 60 characters.
pub fn expand_replicas(input: &[Value], store_name: &str, store_location: &str) -> Result<Vec<Replica>, String> {
    let mut locations: HashMap<String, String> = HashMap::new();
    let mut names = HashSet::new();
    let mut result = Vec::with_capacity(input.len());

    for value in input {
        let (name, location) = replica_fields(value);
        let location = validate::normalize_location(location);

        if location.eq_ignore_ascii_case(store_location) {
            return Err(format!(
                "location ({location:?}) of replica {name:?} is duplicated with original configuration store {store_name:?}"
            ));
        }
        if let Some(other) = locations.get(&location) {
            return Err(format!(
                "location ({location:?}) of replica {name:?} is duplicated with replica {other:?}"
            ));
        }
        locations.insert(location.clone(), name.to_string());

        if !names.insert(name.to_lowercase()) {
            return Err(format!("replica name {name:?} is duplicated"));
        }
        if name.len() + store_name.len() > MAX_REPLICA_AND_STORE_NAME_LEN {
            return Err(format!(
                "replica name {name:?} is too long, the total length of replica name and configuration store name \
                 should be less or equal than {MAX_REPLICA_AND_STORE_NAME_LEN}"
            ));
        }

        result.push(Replica {
            name: Some(name.to_string()),
            location: Some(location),
            ..Replica::default()
        });
    }
    Ok(result)
}

fn validate_encryption(value: &Value, key: &str) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec![];
    };
    if items.len() > 1 {
        return vec![format!("{key}: at most one `encryption` block is allowed, got {}", items.len())];
    }
    let mut errors = Vec::new();
    for item in items {
        let Some(obj) = item.as_object() else {
            errors.push(format!("{key}.0: expected an object"));
            continue;
        };
        for unexpected in obj.keys().filter(|k| !ENCRYPTION_KEYS.contains(&k.as_str())) {
            errors.push(format!("{key}.0: an argument named {unexpected:?} is not expected here"));
        }
        if let Some(identifier) = obj.get("key_vault_key_identifier") {
            errors.extend(validate::is_url_http_or_https(identifier, &format!("{key}.0.key_vault_key_identifier")));
        }
        if let Some(client_id) = obj.get("identity_client_id") {
            errors.extend(validate::is_uuid(client_id, &format!("{key}.0.identity_client_id")));
        }
    }
    errors
}

/// `(key identifier, identity client ID)`, with unset and empty the same.
fn encryption_fields(value: &Value) -> (String, String) {
    let obj = value.as_array().and_then(|a| a.first()).and_then(Value::as_object);
    let field = |name: &str| {
        obj.and_then(|o| o.get(name))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    (field("key_vault_key_identifier"), field("identity_client_id"))
}

fn suppress_encryption_diff(_key: &str, old: &Value, new: &Value) -> bool {
    encryption_fields(old) == encryption_fields(new)
}

/// `None` unless the block sets at least one field.
fn expand_encryption(input: &[Value]) -> Option<EncryptionProperties> {
    let (key_identifier, identity_client_id) = encryption_fields(&Value::Array(input.to_vec()));
    if key_identifier.is_empty() && identity_client_id.is_empty() {
        return None;
    }
    let non_empty = |s: String| (!s.is_empty()).then_some(s);
    Some(EncryptionProperties {
        key_vault_properties: Some(KeyVaultProperties {
            identity_client_id: non_empty(identity_client_id),
            key_identifier: non_empty(key_identifier),
        }),
    })
}

fn flatten_encryption(encryption: Option<&EncryptionProperties>) -> Value {
    let Some(kv) = encryption.and_then(|e| e.key_vault_properties.as_ref()) else {
        return json!([]);
    };
    if kv.key_identifier.is_none() && kv.identity_client_id.is_none() {
        return json!([]);
    }
    json!([{
        "key_vault_key_identifier": kv.key_identifier.clone().unwrap_or_default(),
        "identity_client_id": kv.identity_client_id.clone().unwrap_or_default(),
    }])
}

fn validate_replicas(value: &Value, key: &str) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec![];
    };
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            errors.push(format!("{key}.{index}: expected an object with `name` and `location`"));
            continue;
        };
        for unexpected in obj.keys().filter(|k| !matches!(k.as_str(), "name" | "location")) {
            errors.push(format!("{key}.{index}: an argument named {unexpected:?} is not expected here"));
        }
        match obj.get("name").and_then(Value::as_str) {
            Some(name) if REPLICA_NAME_RE.is_match(name) => {}
            Some(_) => errors.push(format!(
                "{key}.{index}.name: may only contain alphanumeric characters and must be between 1-50 chars"
            )),
            None => errors.push(format!("{key}.{index}.name: is required")),
        }
        match obj.get("location").and_then(Value::as_str) {
            Some(location) => {
                errors.extend(validate::location(&Value::String(location.to_string()), &format!("{key}.{index}.location")))
            }
            None => errors.push(format!("{key}.{index}.location: is required")),
        }
    }
    errors
}

/// Replicas are a set: order, name case and location spelling don't matter.
fn suppress_replica_diff(_key: &str, old: &Value, new: &Value) -> bool {
    let normalise = |v: &Value| -> HashSet<(String, String)> {
        v.as_array()
            .into_iter()
            .flatten()
            .map(|r| {
                let (name, location) = replica_fields(r);
                (name.to_lowercase(), validate::normalize_location(location))
            })
            .collect()
    };
    normalise(old) == normalise(new)
}

fn flatten_replicas(replicas: &[Replica]) -> Value {
    let items: Vec<Value> = replicas
        .iter()
        .map(|r| {
            json!({
                "name": r.name.clone().unwrap_or_default(),
                "location": validate::normalize_location(r.location.as_deref().unwrap_or_default()),
            })
        })
        .collect();
    Value::Array(items)
}

/// Sort the store's keys into primary/secondary, read/write slots.
fn flatten_access_keys(keys: &[ApiKey]) -> Vec<(&'static str, Value)> {
    let mut slots = vec![
        ("primary_read_key", json!({})),
        ("primary_write_key", json!({})),
        ("secondary_read_key", json!({})),
        ("secondary_write_key", json!({})),
    ];
    for key in keys {
        let (Some(name), Some(read_only)) = (&key.name, key.read_only) else {
            continue;
        };
        let name = name.to_lowercase();
        let slot = match (name.starts_with("primary"), name.starts_with("secondary"), read_only) {
            (true, _, true) => "primary_read_key",
            (true, _, false) => "primary_write_key",
            (_, true, true) => "secondary_read_key",
            (_, true, false) => "secondary_write_key",
            _ => continue,
        };
        let value = json!({
            "id": key.id.clone().unwrap_or_default(),
            "secret": key.value.clone().unwrap_or_default(),
            "connection_string": key.connection_string.clone().unwrap_or_default(),
        });
        if let Some(entry) = slots.iter_mut().find(|(s, _)| *s == slot) {
            entry.1 = value;
        }
    }
    slots
}

fn missing_permission_message(name: &str, location: &str) -> String {
    format!(
        "an existing soft-deleted App Configuration may exist with the Name {name:?} in the location {location:?}, \
         however the credentials in use have insufficient permissions to check for one.\n\
         You can opt out of this behaviour with `features.app_configuration.recover_soft_deleted = false` \
         in the provider block."
    )
}
