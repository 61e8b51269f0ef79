use azurerm_resourceids::ids::keyvault::{DeletedVaultId, VaultId};
use azurerm_sdk::resource_manager::keyvault::v2023_07_01::vaults::{
    CreateMode, Sku, SkuFamily, SkuName, VaultCreateOrUpdateParameters, VaultPatchParameters, VaultPatchProperties,
    VaultProperties,
};
use serde_json::Value;

use super::{
    expand_tags, flatten_tags, found, location_attribute, name_attribute, require_absent,
    resource_group_name_attribute, tags_attribute,
};
use crate::clients::Clients;
use crate::data::ResourceData;
use crate::error::{format_err_chain, ProviderError};
use crate::resource::{read_after_write, BoxFuture, DiffContext, Presence, Resource};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::validate;

const RESOURCE_TYPE: &str = "azurerm_key_vault";

/// Retention Azure applies when none is sent.
const DEFAULT_SOFT_DELETE_RETENTION_DAYS: i64 = 90;

const PURGE_PROTECTION_LOCKED: &str = "once Purge Protection has been Enabled it's not possible to disable it";
const RETENTION_LOCKED: &str = "once `soft_delete_retention_days` has been configured it cannot be modified";

pub struct KeyVaultResource {
    schema: Schema,
}

impl Default for KeyVaultResource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyVaultResource {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![
                name_attribute(validate::key_vault_name),
                resource_group_name_attribute(),
                location_attribute(),
                Attribute::required("tenant_id", AttributeType::String).validate_with(validate::is_uuid),
                Attribute::required("sku_name", AttributeType::String)
                    .validate_with(validate::string_in_slice(SkuName::possible_values(), false)),
                Attribute::optional("soft_delete_retention_days", AttributeType::Int)
                    .with_default(DEFAULT_SOFT_DELETE_RETENTION_DAYS)
                    .validate_with(validate::int_between(7, 90)),
                Attribute::optional("purge_protection_enabled", AttributeType::Bool).with_default(false),
                Attribute::optional("enabled_for_deployment", AttributeType::Bool).with_default(false),
                tags_attribute(),
                Attribute::computed("vault_uri", AttributeType::String),
            ]),
        }
    }

    fn parse_id(data: &ResourceData) -> Result<VaultId, ProviderError> {
        Ok(VaultId::parse(data.id().unwrap_or_default())?)
    }

    fn sku(data: &ResourceData) -> Result<Sku, ProviderError> {
        Ok(Sku {
            family: SkuFamily::A,
            name: data.get_string("sku_name").parse()?,
        })
    }

    async fn do_create(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let vaults = &clients.key_vault.vaults;
        let id = VaultId::new(
            &clients.subscription_id,
            data.get_string("resource_group_name"),
            data.get_string("name"),
        );

        require_absent(RESOURCE_TYPE, &id, id.id(), vaults.get(&id).await)?;

        let location = validate::normalize_location(&data.get_string("location"));

        // Without read access at the subscription the lookup answers 403,
        // which is treated like "nothing to recover".
        let deleted_id = DeletedVaultId::new(&clients.subscription_id, &location, &id.vault_name);
        let soft_deleted = match vaults.get_deleted(&deleted_id).await {
            Ok(_) => true,
            Err(e) if e.was_not_found() || e.was_status(403) => false,
            Err(e) => {
                return Err(ProviderError::CreateFailed(format!(
                    "checking for the presence of an existing Soft-Deleted Key Vault {:?} (Location {location:?}): {}",
                    id.vault_name,
                    format_err_chain(&e)
                )));
            }
        };
        if soft_deleted && !clients.features.key_vault.recover_soft_deleted_key_vaults {
            return Err(ProviderError::CreateFailed(opted_out_of_recovery_message(
                &id.vault_name,
                &location,
            )));
        }

        let mut properties = VaultProperties {
            tenant_id: data.get_string("tenant_id"),
            sku: Self::sku(data)?,
            access_policies: Vec::new(),
            create_mode: Some(if soft_deleted {
                CreateMode::Recover
            } else {
                CreateMode::Default
            }),
            enable_purge_protection: None,
            enable_rbac_authorization: None,
            enable_soft_delete: Some(true),
            enabled_for_deployment: Some(data.get_bool("enabled_for_deployment")),
            enabled_for_disk_encryption: None,
            enabled_for_template_deployment: None,
            provisioning_state: None,
            public_network_access: Some("Enabled".to_string()),
            soft_delete_retention_in_days: None,
            vault_uri: None,
        };
        if data.get_bool("purge_protection_enabled") {
            properties.enable_purge_protection = Some(true);
        }
        if let Some(days) = data
            .get_i64("soft_delete_retention_days")
            .filter(|d| *d != DEFAULT_SOFT_DELETE_RETENTION_DAYS)
        {
            properties.soft_delete_retention_in_days = Some(days);
        }
        if soft_deleted {
            tracing::debug!(id = %deleted_id.id(), "recovering soft-deleted key vault");
        }

        let input = VaultCreateOrUpdateParameters {
            location,
            properties,
            tags: expand_tags(data),
        };
        vaults
            .create_or_update_then_poll(&id, &input)
            .await
            .map_err(|e| ProviderError::create(&id, e))?;
        data.set_id(id.id());

        let created = vaults.get(&id).await.map_err(|e| ProviderError::read(&id, e))?;
        let vault_uri = created
            .model
            .and_then(|m| m.properties.vault_uri)
            .unwrap_or_default();
        if vault_uri.is_empty() {
            return Err(ProviderError::ReadFailed(format!(
                "retrieving {id}: `properties.VaultUri` was nil"
            )));
        }

        read_after_write(self, clients, data).await
    }

    async fn do_read(&self, clients: &Clients, data: &mut ResourceData) -> Result<Presence, ProviderError> {
        let id = Self::parse_id(data)?;

        let Some(resp) = found(clients.key_vault.vaults.get(&id).await).map_err(|e| ProviderError::read(&id, e))?
        else {
            tracing::info!(id = %id.id(), "key vault was not found, removing from state");
            data.clear_id();
            return Ok(Presence::Gone);
        };

        data.set("name", id.vault_name.clone());
        data.set("resource_group_name", id.resource_group_name.clone());

        let Some(model) = resp.model else {
            return Ok(Presence::Present);
        };
        data.set_opt("location", model.location.as_deref().map(validate::normalize_location));

        let props = &model.properties;
        data.set("tenant_id", props.tenant_id.clone());
        data.set("sku_name", props.sku.name.as_str());
        data.set("enabled_for_deployment", props.enabled_for_deployment.unwrap_or(false));
        data.set("purge_protection_enabled", props.enable_purge_protection.unwrap_or(false));
        data.set(
            "soft_delete_retention_days",
            props
                .soft_delete_retention_in_days
                .unwrap_or(DEFAULT_SOFT_DELETE_RETENTION_DAYS),
        );
        data.set_opt("vault_uri", props.vault_uri.clone());
        data.set("tags", flatten_tags(model.tags.as_ref()));
        Ok(Presence::Present)
    }

    async fn do_update(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let vaults = &clients.key_vault.vaults;
        let id = Self::parse_id(data)?;

        let existing = vaults.get(&id).await.map_err(|e| ProviderError::read(&id, e))?;
        let Some(existing) = existing.model else {
            return Err(ProviderError::ReadFailed(format!("retrieving {id}: `model` was nil")));
        };

        let mut props = VaultPatchProperties::default();
        if data.has_change("tenant_id") {
            props.tenant_id = Some(data.get_string("tenant_id"));
        }
        if data.has_change("sku_name") {
            props.sku = Some(Self::sku(data)?);
        }
        if data.has_change("enabled_for_deployment") {
            props.enabled_for_deployment = Some(data.get_bool("enabled_for_deployment"));
        }
        if data.has_change("purge_protection_enabled") {
            let enabled = existing.properties.enable_purge_protection.unwrap_or(false);
            let wanted = data.get_bool("purge_protection_enabled");
            if enabled && !wanted {
                return Err(ProviderError::UpdateFailed(format!("updating {id}: {PURGE_PROTECTION_LOCKED}")));
            }
            props.enable_purge_protection = Some(wanted);
        }
        // The API refuses to change the retention once it has been set.
        if data.has_change("soft_delete_retention_days") && existing.properties.soft_delete_retention_in_days.is_some() {
            return Err(ProviderError::UpdateFailed(format!("updating {id}: {RETENTION_LOCKED}")));
        }

        let mut update = VaultPatchParameters::default();
        if props != VaultPatchProperties::default() {
            update.properties = Some(props);
        }
        if data.has_change("tags") {
            update.tags = Some(expand_tags(data).unwrap_or_default());
        }

        if update != VaultPatchParameters::default() {
            vaults
                .update(&id, &update)
                .await
                .map_err(|e| ProviderError::update(&id, e))?;
        }

        read_after_write(self, clients, data).await
    }

    async fn do_delete(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let vaults = &clients.key_vault.vaults;
        let id = Self::parse_id(data)?;

        let Some(existing) = found(vaults.get(&id).await).map_err(|e| ProviderError::read(&id, e))? else {
            tracing::info!(id = %id.id(), "key vault already gone");
            data.clear_id();
            return Ok(());
        };
        let (location, purge_protection_enabled, soft_delete_enabled) = match &existing.model {
            Some(model) => (
                model.location.clone().unwrap_or_default(),
                model.properties.enable_purge_protection.unwrap_or(false),
                model.properties.enable_soft_delete.unwrap_or(false),
            ),
            None => (String::new(), false, false),
        };

        vaults.delete(&id).await.map_err(|e| ProviderError::delete(&id, e))?;

        if clients.features.key_vault.purge_soft_delete_on_destroy && soft_delete_enabled {
            let deleted_id = DeletedVaultId::new(
                &clients.subscription_id,
                validate::normalize_location(&location),
                &id.vault_name,
            );

            // Vaults with purge protection can only be purged by Azure.
            if purge_protection_enabled {
                let deleted = found(vaults.get_deleted(&deleted_id).await).map_err(|e| {
                    ProviderError::DeleteFailed(format!(
                        "retrieving the Deletion Details for {id}: {}",
                        format_err_chain(&e)
                    ))
                })?;
                let dates = deleted
                    .and_then(|d| d.model)
                    .and_then(|m| m.properties)
                    .and_then(|p| p.deletion_date.zip(p.scheduled_purge_date));
                match dates {
                    Some((deleted_on, purge_on)) => tracing::debug!(
                        name = %id.vault_name,
                        deleted_on = %deleted_on,
                        purge_on = %purge_on,
                        "key vault has purge protection enabled, Azure will purge it"
                    ),
                    None => tracing::debug!(
                        name = %id.vault_name,
                        "key vault has purge protection enabled and will be purged automatically by Azure"
                    ),
                }
                data.clear_id();
                return Ok(());
            }

            tracing::debug!(name = %id.vault_name, "key vault marked for purge, executing purge");
            vaults.purge_deleted_then_poll(&deleted_id).await.map_err(|e| {
                ProviderError::DeleteFailed(format!("purging {id}: {}", format_err_chain(&e)))
            })?;
            tracing::debug!(name = %id.vault_name, "purged key vault");
        }

        data.clear_id();
        Ok(())
    }
}

impl Resource for KeyVaultResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ProviderError> {
        VaultId::parse(id)?;
        Ok(())
    }

    fn customize_diff(&self, diff: &mut DiffContext<'_>) -> Result<(), ProviderError> {
        if diff.is_new_resource() {
            return Ok(());
        }

        let mut errors = Vec::new();
        let was_protected = diff.old("purge_protection_enabled").and_then(Value::as_bool) == Some(true);
        if was_protected && !diff.get_bool("purge_protection_enabled") {
            errors.push(PURGE_PROTECTION_LOCKED.to_string());
        }
        if diff.has_change("soft_delete_retention_days")
            && diff.old("soft_delete_retention_days").and_then(Value::as_i64).is_some()
        {
            errors.push(RETENTION_LOCKED.to_string());
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

fn opted_out_of_recovery_message(name: &str, location: &str) -> String {
    format!(
        "an existing soft-deleted Key Vault exists with the Name {name:?} in the location {location:?}, however \
         automatically recovering this Key Vault has been disabled via the `features` block.\n\n\
         The provider can recover the soft-deleted Key Vault when \
         `features.key_vault.recover_soft_deleted_key_vaults` is `true`. Alternatively recover it manually \
         and import it, or pick a different name or location."
    )
}
