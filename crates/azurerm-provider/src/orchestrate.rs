use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use serde_json::Map;

use crate::addr::ResourceAddr;
use crate::clients::Clients;
use crate::data::ResourceData;
use crate::error::ProviderError;
use crate::manifest::{Manifest, ResourceBlock};
use crate::persistence::StatePersistence;
use crate::plan::{Action, Plan, PlanEntry};
use crate::provider::Provider;
use crate::resource::{DiffContext, Presence, Resource};
use crate::state::{ProviderState, ResourceState, ResourceStatus};

/// Refresh every recorded resource and compare the manifest against it.
///
/// Refreshed attributes are written back into `state`, and resources that
/// read as gone are dropped from it. Nothing is persisted until
/// [`execute`] runs.
pub async fn plan(
    provider: &Provider,
    clients: &Clients,
    manifest: &Manifest,
    state: &mut ProviderState,
) -> Result<Plan, ProviderError> {
    let mut entries = Vec::new();

    // 1. Manifest blocks in order: validate, refresh, diff
    for block in &manifest.resources {
        let addr = block.addr();
        let resource = provider.resource(&block.resource_type)?;
        let config = desired_config(resource, block)?;

        let mut reason = None;
        if let Some(recorded) = state.get(&addr).cloned() {
            let mut data = ResourceData::existing(&recorded.id, config.clone(), recorded.attributes);
            let timeout = resource.timeouts().read;
            let presence = run("read", &addr, timeout, resource.read(clients, &mut data)).await?;
            match presence {
                Presence::Present => {
                    if let Some(rs) = state.resources.get_mut(&addr) {
                        rs.attributes = data.into_state();
                    }
                }
                Presence::Gone => {
                    tracing::warn!(addr = %addr, id = %recorded.id, "resource was removed outside of this tool");
                    state.resources.remove(&addr);
                    reason = Some("removed outside of this tool".to_string());
                }
            }
        }

        let recorded = state.get(&addr).map(|rs| &rs.attributes);
        let mut changes = resource.schema().diff(&config, recorded.unwrap_or(&Map::new()));
        resource
            .customize_diff(&mut DiffContext::new(&config, recorded, &mut changes))
            .map_err(|e| prefix_validation(e, &addr))?;

        let action = match recorded {
            None => Action::Create,
            Some(_) if changes.is_empty() => Action::Ok,
            Some(_) if changes.iter().any(|c| c.force_new) => Action::Replace,
            Some(_) => Action::Update,
        };
        tracing::debug!(addr = %addr, action = %action, changes = changes.len(), "planned");
        entries.push(PlanEntry {
            addr,
            action,
            changes,
            reason,
        });
    }

    // 2. Orphan pass: in state, no longer in the manifest
    let manifest_addrs: HashSet<_> = manifest.resources.iter().map(ResourceBlock::addr).collect();
    for addr in state.resources.keys().filter(|a| !manifest_addrs.contains(a)) {
        entries.push(PlanEntry {
            addr: addr.clone(),
            action: Action::Delete,
            changes: Vec::new(),
            reason: Some("no longer in the manifest".to_string()),
        });
    }

    Ok(Plan { entries })
}

/// Execute every actionable entry in the plan.
///
/// Creates in manifest order (dependencies satisfied by position), updates
/// in manifest order, replacements as delete-then-create, deletes in
/// reverse order (dependents first). State is flushed after every action.
pub async fn execute(
    provider: &Provider,
    clients: &Clients,
    manifest: &Manifest,
    plan: &Plan,
    state: &mut ProviderState,
    persistence: &StatePersistence,
) -> Result<(), ProviderError> {
    // Creates: manifest order
    for entry in plan.with_action(Action::Create) {
        let block = manifest_block(manifest, &entry.addr)?;
        tracing::info!(addr = %entry.addr, "creating resource");
        create(provider, clients, block, state, persistence).await?;
    }

    // Updates: manifest order
    for entry in plan.with_action(Action::Update) {
        let block = manifest_block(manifest, &entry.addr)?;
        let resource = provider.resource(&block.resource_type)?;
        let recorded = state
            .get(&entry.addr)
            .cloned()
            .ok_or_else(|| ProviderError::ResourceNotFound(entry.addr.to_string()))?;

        tracing::info!(addr = %entry.addr, "updating resource");
        let config = desired_config(resource, block)?;
        let mut data = ResourceData::existing(&recorded.id, config, recorded.attributes);
        run("update", &entry.addr, resource.timeouts().update, resource.update(clients, &mut data)).await?;

        let id = data.id().unwrap_or(recorded.id.as_str()).to_string();
        state.resources.insert(
            entry.addr.clone(),
            ResourceState::new(&block.resource_type, id, ResourceStatus::Updated, data.into_state()),
        );
        persistence.flush(state).await?;
    }

    // Replacements: delete, then create
    for entry in plan.with_action(Action::Replace) {
        let block = manifest_block(manifest, &entry.addr)?;
        tracing::info!(addr = %entry.addr, "replacing resource");
        delete(provider, clients, &entry.addr, state, persistence).await?;
        create(provider, clients, block, state, persistence).await?;
    }

    // Deletes: reverse order (dependents before dependencies)
    for entry in plan.with_action(Action::Delete).rev() {
        tracing::info!(addr = %entry.addr, "destroying resource");
        delete(provider, clients, &entry.addr, state, persistence).await?;
    }

    state.version = crate::state::CURRENT_VERSION;
    persistence.flush(state).await?;
    Ok(())
}

/// Bring an existing resource under management.
pub async fn import(
    provider: &Provider,
    clients: &Clients,
    manifest: &Manifest,
    addr: &ResourceAddr,
    id: &str,
    state: &mut ProviderState,
    persistence: &StatePersistence,
) -> Result<(), ProviderError> {
    let block = manifest.resource(addr).ok_or_else(|| {
        ProviderError::Import(format!(
            "{addr} is not declared in the manifest; add a block for it before importing"
        ))
    })?;
    if let Some(existing) = state.get(addr) {
        return Err(ProviderError::Import(format!(
            "{addr} is already managed (ID {:?}); remove it from state first to import another resource",
            existing.id
        )));
    }

    let resource = provider.resource(&block.resource_type)?;
    resource
        .validate_import_id(id)
        .map_err(|e| ProviderError::Import(format!("parsing import ID {id:?} for {addr}: {e}")))?;

    tracing::info!(addr = %addr, id, "importing resource");
    let mut data = ResourceData::from_id(id);
    let presence = run("import", addr, resource.timeouts().read, resource.read(clients, &mut data)).await?;
    if presence == Presence::Gone {
        return Err(ProviderError::Import(format!(
            "cannot import non-existent remote object {id:?} into {addr}"
        )));
    }

    state.resources.insert(
        addr.clone(),
        ResourceState::new(&block.resource_type, id, ResourceStatus::Imported, data.into_state()),
    );
    persistence.flush(state).await?;
    Ok(())
}

/// Destroy every managed resource.
///
/// Manifest blocks go in reverse order (dependents first), then anything
/// left in state that the manifest no longer declares.
pub async fn destroy_all(
    provider: &Provider,
    clients: &Clients,
    manifest: &Manifest,
    state: &mut ProviderState,
    persistence: &StatePersistence,
) -> Result<(), ProviderError> {
    for block in manifest.resources.iter().rev() {
        let addr = block.addr();
        if state.contains(&addr) {
            tracing::info!(addr = %addr, "destroying resource");
            delete(provider, clients, &addr, state, persistence).await?;
        }
    }

    let remaining: Vec<ResourceAddr> = state.resources.keys().rev().cloned().collect();
    for addr in remaining {
        tracing::info!(addr = %addr, "destroying orphaned resource");
        delete(provider, clients, &addr, state, persistence).await?;
    }

    persistence.flush(state).await?;
    Ok(())
}

async fn create(
    provider: &Provider,
    clients: &Clients,
    block: &ResourceBlock,
    state: &mut ProviderState,
    persistence: &StatePersistence,
) -> Result<(), ProviderError> {
    let addr = block.addr();
    let resource = provider.resource(&block.resource_type)?;
    let config = desired_config(resource, block)?;

    let mut data = ResourceData::new(config);
    let result = run("create", &addr, resource.timeouts().create, resource.create(clients, &mut data)).await;

    // A create that fails after the resource exists still records it, so
    // the next run can update or destroy it.
    if let Some(id) = data.id().map(str::to_string) {
        state.resources.insert(
            addr.clone(),
            ResourceState::new(&block.resource_type, id, ResourceStatus::Created, data.into_state()),
        );
        persistence.flush(state).await?;
    }
    result?;

    if !state.contains(&addr) {
        return Err(ProviderError::CreateFailed(format!("{addr}: create returned without setting an ID")));
    }
    Ok(())
}

async fn delete(
    provider: &Provider,
    clients: &Clients,
    addr: &ResourceAddr,
    state: &mut ProviderState,
    persistence: &StatePersistence,
) -> Result<(), ProviderError> {
    let Some(recorded) = state.get(addr).cloned() else {
        return Ok(());
    };
    let resource = provider.resource(&recorded.resource_type)?;

    let mut data = ResourceData::existing(&recorded.id, Map::new(), recorded.attributes);
    run("delete", addr, resource.timeouts().delete, resource.delete(clients, &mut data)).await?;

    state.resources.remove(addr);
    persistence.flush(state).await?;
    Ok(())
}

/// The block's attributes after validation, with defaults applied.
fn desired_config(
    resource: &dyn Resource,
    block: &ResourceBlock,
) -> Result<Map<String, serde_json::Value>, ProviderError> {
    let schema = resource.schema();
    schema
        .validate_config(&block.config)
        .map_err(|e| prefix_validation(e, &block.addr()))?;
    Ok(schema.with_defaults(&block.config))
}

fn manifest_block<'a>(manifest: &'a Manifest, addr: &ResourceAddr) -> Result<&'a ResourceBlock, ProviderError> {
    manifest
        .resource(addr)
        .ok_or_else(|| ProviderError::ResourceNotFound(addr.to_string()))
}

fn prefix_validation(err: ProviderError, addr: &ResourceAddr) -> ProviderError {
    match err {
        ProviderError::Validation(errors) => {
            ProviderError::Validation(errors.into_iter().map(|e| format!("{addr}: {e}")).collect())
        }
        other => other,
    }
}

/// Run one resource operation under its timeout, labelling any failure
/// with the resource address.
async fn run<T>(
    operation: &str,
    addr: &ResourceAddr,
    timeout: Duration,
    fut: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(|e| e.with_resource(&addr.resource_type, &addr.resource_name)),
        Err(_) => Err(ProviderError::Timeout {
            operation: format!("{operation} of {addr}"),
            timeout,
        }),
    }
}
