//! azurerm-provider
//!
//! Declarative management of Azure resources on top of `azurerm-sdk`.
//!
//! Public API:
//! - `Provider`: registry of resource types; `configure()` builds the shared clients
//! - `orchestrate::plan()`: refresh state and compare it against a manifest
//! - `orchestrate::execute()`: apply a plan, flushing state after each action
//! - `orchestrate::import()`: adopt an existing resource into state
//! - `orchestrate::destroy_all()`: tear down every managed resource

pub mod addr;
pub mod clients;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod manifest;
pub mod orchestrate;
pub mod persistence;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod state;
pub mod validate;

pub use crate::addr::ResourceAddr;
pub use crate::clients::Clients;
pub use crate::config::{ProviderBlock, ProviderConfig};
pub use crate::error::{format_err_chain, ProviderError};
pub use crate::features::UserFeatures;
pub use crate::manifest::{Manifest, ResourceBlock};
pub use crate::persistence::StatePersistence;
pub use crate::plan::{Action, Plan, PlanEntry};
pub use crate::provider::Provider;
pub use crate::resource::Resource;
pub use crate::state::ProviderState;

/// Load state, plan against it and execute the plan when it has changes.
pub async fn apply(
    provider: &Provider,
    clients: &Clients,
    manifest: &Manifest,
    persistence: &StatePersistence,
) -> Result<Plan, ProviderError> {
    let mut state = persistence.load().await?;
    let plan = orchestrate::plan(provider, clients, manifest, &mut state).await?;

    if plan.has_changes() {
        tracing::info!(
            creates = plan.count(Action::Create),
            updates = plan.count(Action::Update),
            replaces = plan.count(Action::Replace),
            deletes = plan.count(Action::Delete),
            "executing plan"
        );
        orchestrate::execute(provider, clients, manifest, &plan, &mut state, persistence).await?;
    } else {
        tracing::info!("all resources in sync, no changes needed");
        persistence.flush(&state).await?;
    }

    Ok(plan)
}

/// Destroy every managed resource in reverse order.
pub async fn destroy(
    provider: &Provider,
    clients: &Clients,
    manifest: &Manifest,
    persistence: &StatePersistence,
) -> Result<(), ProviderError> {
    let mut state = persistence.load().await?;
    orchestrate::destroy_all(provider, clients, manifest, &mut state, persistence).await
}
