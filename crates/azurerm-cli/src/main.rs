use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "azurerm")]
#[command(about = "Plan, apply and destroy Azure resources declared in a JSON manifest", long_about = None)]
#[command(version)]
struct Cli {
    /// Write logs as JSON lines
    #[arg(long, global = true, env = "AZURERM_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Workspace {
    /// Path to the manifest
    manifest: PathBuf,
    /// Path to the state file
    #[arg(long, env = "AZURERM_STATE", default_value = "azurerm.state.json")]
    state: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what apply would change
    Plan {
        #[command(flatten)]
        workspace: Workspace,
        /// Print the plan as JSON
        #[arg(long)]
        output_json: bool,
    },
    /// Create, update and delete resources until state matches the manifest
    Apply {
        #[command(flatten)]
        workspace: Workspace,
    },
    /// Delete every managed resource
    Destroy {
        #[command(flatten)]
        workspace: Workspace,
    },
    /// Record an existing resource in state
    Import {
        #[command(flatten)]
        workspace: Workspace,
        /// Resource address, e.g. azurerm_key_vault.main
        address: String,
        /// ARM resource ID
        id: String,
    },
    /// Parse a resource ID and print its segments
    ParseId {
        #[arg(value_enum)]
        kind: IdKind,
        id: String,
        /// Accept any casing of the fixed segments
        #[arg(long)]
        insensitive: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IdKind {
    Subscription,
    ResourceGroup,
    ConfigurationStore,
    DeletedConfigurationStore,
    ConfigurationStoreReplica,
    PrivateLinkResource,
    KeyVault,
    DeletedKeyVault,
    KeyVaultKey,
    StorageAccount,
    StorageTable,
    PostgresServerGroup,
    ScopedLock,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.json);

    match cli.command {
        Commands::Plan { workspace, output_json } => commands::plan(&workspace, output_json).await,
        Commands::Apply { workspace } => commands::apply(&workspace).await,
        Commands::Destroy { workspace } => commands::destroy(&workspace).await,
        Commands::Import { workspace, address, id } => commands::import(&workspace, &address, &id).await,
        Commands::ParseId { kind, id, insensitive } => commands::parse_id(kind, &id, insensitive),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
