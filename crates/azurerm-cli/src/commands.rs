use azurerm_provider::{
    orchestrate, Clients, Manifest, Provider, ProviderConfig, ResourceAddr, StatePersistence,
};
use azurerm_resourceids::ids::{appconfiguration, authorization, commonids, keyvault, postgres, storage};
use azurerm_resourceids::{parse_id as parse_typed, parse_id_insensitively, ResourceId};
use eyre::{Result, WrapErr};
use serde_json::{json, Map, Value};

use crate::{IdKind, Workspace};

struct Session {
    provider: Provider,
    clients: Clients,
    manifest: Manifest,
    persistence: StatePersistence,
}

fn open(workspace: &Workspace) -> Result<Session> {
    let manifest = Manifest::load(&workspace.manifest)
        .wrap_err_with(|| format!("loading manifest {}", workspace.manifest.display()))?;
    let config = ProviderConfig::load(&manifest.provider)?;
    let provider = Provider::new();
    let clients = provider.configure(&config)?;

    Ok(Session {
        provider,
        clients,
        manifest,
        persistence: StatePersistence::new(&workspace.state),
    })
}

pub async fn plan(workspace: &Workspace, output_json: bool) -> Result<()> {
    let session = open(workspace)?;
    let mut state = session.persistence.load().await?;

    let plan = orchestrate::plan(&session.provider, &session.clients, &session.manifest, &mut state).await?;
    if output_json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else if plan.has_changes() {
        println!("{plan}");
    } else {
        println!("No changes. Infrastructure matches the manifest.");
    }
    Ok(())
}

pub async fn apply(workspace: &Workspace) -> Result<()> {
    let session = open(workspace)?;

    let plan = azurerm_provider::apply(&session.provider, &session.clients, &session.manifest, &session.persistence)
        .await?;
    if plan.has_changes() {
        println!("{plan}");
        println!("Apply complete.");
    } else {
        println!("No changes. Infrastructure matches the manifest.");
    }
    Ok(())
}

pub async fn destroy(workspace: &Workspace) -> Result<()> {
    let session = open(workspace)?;

    azurerm_provider::destroy(&session.provider, &session.clients, &session.manifest, &session.persistence).await?;
    println!("Destroy complete.");
    Ok(())
}

pub async fn import(workspace: &Workspace, address: &str, id: &str) -> Result<()> {
    let addr: ResourceAddr = address.parse()?;
    let session = open(workspace)?;
    let mut state = session.persistence.load().await?;

    orchestrate::import(
        &session.provider,
        &session.clients,
        &session.manifest,
        &addr,
        id,
        &mut state,
        &session.persistence,
    )
    .await?;
    println!("Imported {addr} from {id}.");
    Ok(())
}

pub fn parse_id(kind: IdKind, id: &str, insensitive: bool) -> Result<()> {
    let parsed = match kind {
        IdKind::Subscription => describe::<commonids::SubscriptionId>(id, insensitive)?,
        IdKind::ResourceGroup => describe::<commonids::ResourceGroupId>(id, insensitive)?,
        IdKind::ConfigurationStore => describe::<appconfiguration::ConfigurationStoreId>(id, insensitive)?,
        IdKind::DeletedConfigurationStore => {
            describe::<appconfiguration::DeletedConfigurationStoreId>(id, insensitive)?
        }
        IdKind::ConfigurationStoreReplica => describe::<appconfiguration::ReplicaId>(id, insensitive)?,
        IdKind::PrivateLinkResource => describe::<appconfiguration::PrivateLinkResourceId>(id, insensitive)?,
        IdKind::KeyVault => describe::<keyvault::VaultId>(id, insensitive)?,
        IdKind::DeletedKeyVault => describe::<keyvault::DeletedVaultId>(id, insensitive)?,
        IdKind::KeyVaultKey => describe::<keyvault::KeyId>(id, insensitive)?,
        IdKind::StorageAccount => describe::<storage::StorageAccountId>(id, insensitive)?,
        IdKind::StorageTable => describe::<storage::TableId>(id, insensitive)?,
        IdKind::PostgresServerGroup => describe::<postgres::ServerGroupsv2Id>(id, insensitive)?,
        IdKind::ScopedLock => describe::<authorization::ScopedLockId>(id, insensitive)?,
    };
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

/// The user-supplied segments of `input` plus its canonical form.
fn describe<T: ResourceId>(input: &str, insensitive: bool) -> Result<Value> {
    let id: T = if insensitive {
        parse_id_insensitively(input)?
    } else {
        parse_typed(input)?
    };

    let segments: Map<String, Value> = T::segments()
        .into_iter()
        .filter(|s| s.is_user_value())
        .filter_map(|s| id.segment_value(s.name).map(|v| (s.name.to_string(), json!(v))))
        .collect();

    Ok(json!({
        "type": T::ID_TYPE,
        "id": id.id(),
        "segments": segments,
    }))
}
