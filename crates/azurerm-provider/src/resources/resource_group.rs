use azurerm_resourceids::ids::commonids::ResourceGroupId;
use azurerm_sdk::resource_manager::resources::v2022_09_01::resource_groups::{ResourceGroup, ResourceGroupPatchable};

use super::{expand_tags, flatten_tags, found, location_attribute, name_attribute, require_absent, tags_attribute};
use crate::clients::Clients;
use crate::data::ResourceData;
use crate::error::ProviderError;
use crate::resource::{read_after_write, BoxFuture, Presence, Resource, Timeouts};
use crate::schema::{Attribute, AttributeType, Schema};
use crate::validate;

const RESOURCE_TYPE: &str = "azurerm_resource_group";

pub struct ResourceGroupResource {
    schema: Schema,
}

impl Default for ResourceGroupResource {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceGroupResource {
    pub fn new() -> Self {
        Self {
            schema: Schema::new(vec![
                name_attribute(validate::resource_group_name),
                location_attribute(),
                Attribute::optional("managed_by", AttributeType::String)
                    .force_new()
                    .validate_with(validate::string_is_not_empty),
                tags_attribute(),
            ]),
        }
    }

    fn parse_id(data: &ResourceData) -> Result<ResourceGroupId, ProviderError> {
        Ok(ResourceGroupId::parse(data.id().unwrap_or_default())?)
    }

    async fn do_create(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let client = &clients.resources.resource_groups;
        let id = ResourceGroupId::new(&clients.subscription_id, data.get_string("name"));

        require_absent(RESOURCE_TYPE, &id, id.id(), client.get(&id).await)?;

        let input = ResourceGroup {
            location: validate::normalize_location(&data.get_string("location")),
            managed_by: data.get_str("managed_by").map(str::to_string),
            tags: expand_tags(data),
            ..ResourceGroup::default()
        };
        client
            .create_or_update(&id, &input)
            .await
            .map_err(|e| ProviderError::create(&id, e))?;

        data.set_id(id.id());
        read_after_write(self, clients, data).await
    }

    async fn do_read(&self, clients: &Clients, data: &mut ResourceData) -> Result<Presence, ProviderError> {
        let id = Self::parse_id(data)?;

        let Some(resp) = found(clients.resources.resource_groups.get(&id).await)
            .map_err(|e| ProviderError::read(&id, e))?
        else {
            tracing::info!(id = %id.id(), "resource group was not found, removing from state");
            data.clear_id();
            return Ok(Presence::Gone);
        };
        let Some(model) = resp.model else {
            return Err(ProviderError::ReadFailed(format!("retrieving {id}: `model` was nil")));
        };

        data.set("name", id.resource_group_name.clone());
        data.set("location", validate::normalize_location(&model.location));
        data.set_opt("managed_by", model.managed_by);
        data.set("tags", flatten_tags(model.tags.as_ref()));
        Ok(Presence::Present)
    }

    async fn do_update(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let id = Self::parse_id(data)?;

        if data.has_change("tags") {
            let input = ResourceGroupPatchable {
                tags: Some(expand_tags(data).unwrap_or_default()),
                ..ResourceGroupPatchable::default()
            };
            clients
                .resources
                .resource_groups
                .update(&id, &input)
                .await
                .map_err(|e| ProviderError::update(&id, e))?;
        }

        read_after_write(self, clients, data).await
    }

    async fn do_delete(&self, clients: &Clients, data: &mut ResourceData) -> Result<(), ProviderError> {
        let client = &clients.resources.resource_groups;
        let id = Self::parse_id(data)?;

        if clients.features.resource_group.prevent_deletion_if_contains_resources {
            let nested = client
                .list_resources(&id)
                .await
                .map_err(|e| ProviderError::delete(&id, e))?;
            let nested: Vec<String> = nested.into_iter().filter_map(|r| r.id).collect();
            if !nested.is_empty() {
                return Err(ProviderError::DeleteFailed(format!(
                    "deleting {id}: the Resource Group still contains Resources.\n\n\
                     The provider checks for Resources within a Resource Group before deleting it, and \
                     refuses while nested Resources exist so that they are not deleted unintentionally.\n\n\
                     Delete or import these Resources first, or turn the check off with \
                     `features.resource_group.prevent_deletion_if_contains_resources = false`:\n\n{}",
                    nested.join("\n")
                )));
            }
        }

        match client.delete_then_poll(&id).await {
            Ok(()) => {}
            Err(e) if e.was_not_found() => {
                tracing::info!(id = %id.id(), "resource group already gone");
            }
            Err(e) => return Err(ProviderError::delete(&id, e)),
        }
        data.clear_id();
        Ok(())
    }
}

impl Resource for ResourceGroupResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::writes(90)
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ProviderError> {
        ResourceGroupId::parse(id)?;
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
