use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use crate::core::config::{resolve_root, servers_dir, BuildConfig};
use crate::core::curseforge::CurseForgeClient;
use crate::core::distribution::{Distribution, DistributionStructureBuilder};
use crate::core::error::{DistroError, DistroResult};
use crate::core::loaders::LoaderTable;
use crate::core::server::ServerStructureBuilder;

/// Exit status of a build that wrote a manifest but recorded failures.
pub const EXIT_PARTIAL: u8 = 2;

/// Build and maintain a Helios distribution manifest.
#[derive(Parser, Debug)]
#[command(name = "helios-distro")]
#[command(version, about)]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  ROOT                 Distribution root (when --root is not given)\n",
    "  BASE_URL             URL the root is served from\n",
    "  CURSEFORGE_API_KEY   Enables curseforge.json resolution\n",
    "  RUST_LOG             Log filter [default: info,helios_distro=debug]\n\n",
    "EXAMPLES:\n",
    "  $ helios-distro init root --root ./distro\n",
    "  $ helios-distro generate server survival 1.16.5 --forge 36.2.39\n",
    "  $ helios-distro generate distro --base-url https://cdn.example.com/distro\n",
))]
pub struct Cli {
    /// Distribution root directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scaffold things that do not exist yet.
    #[command(subcommand)]
    Init(InitCommand),

    /// Create servers or (re)build the manifest.
    #[command(subcommand)]
    Generate(GenerateCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum InitCommand {
    /// Create the root layout and an empty distribution.json.
    Root,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GenerateCommand {
    /// Create the directory skeleton of a new server.
    Server(ServerArgs),

    /// Walk the root and write distribution.json.
    Distro(DistroArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Server id, used as its directory name.
    pub id: String,

    /// Minecraft version, e.g. 1.16.5.
    pub version: String,

    /// Forge version to install.
    #[arg(long, value_name = "VERSION", conflicts_with = "fabric")]
    pub forge: Option<String>,

    /// Fabric loader version to install.
    #[arg(long, value_name = "VERSION")]
    pub fabric: Option<String>,

    /// JSON file overriding the loader layout table.
    #[arg(long, value_name = "FILE")]
    pub loader_table: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DistroArgs {
    /// URL the root directory is served from.
    #[arg(long, env = "BASE_URL", value_name = "URL")]
    pub base_url: String,

    /// Files hashed / mods resolved in parallel.
    #[arg(long, default_value_t = 8, value_name = "N")]
    pub concurrency: usize,

    /// JSON file overriding the loader layout table.
    #[arg(long, value_name = "FILE")]
    pub loader_table: Option<PathBuf>,

    /// Download missing loader files from the loader's maven repository.
    #[arg(long)]
    pub fetch_loaders: bool,

    /// Hash every file again instead of trusting the previous manifest.
    #[arg(long)]
    pub no_cache: bool,

    #[arg(long, env = "CURSEFORGE_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub curseforge_api_key: Option<String>,
}

/// Run a parsed command, returning the process exit status.
pub async fn dispatch(cli: Cli) -> u8 {
    let result = match cli.command {
        Command::Init(InitCommand::Root) => init_root(cli.root.as_deref()).await.map(|_| 0),
        Command::Generate(GenerateCommand::Server(args)) => {
            generate_server(cli.root.as_deref(), args).await.map(|_| 0)
        }
        Command::Generate(GenerateCommand::Distro(args)) => {
            generate_distro(cli.root.as_deref(), args).await
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

fn root_dir(arg: Option<&Path>) -> DistroResult<PathBuf> {
    resolve_root(arg, std::env::var("ROOT").ok().as_deref())
}

async fn load_loader_table(path: Option<&Path>) -> DistroResult<LoaderTable> {
    let Some(path) = path else {
        return Ok(LoaderTable::default());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DistroError::io(path, e))?;
    serde_json::from_str(&raw)
        .map_err(|e| DistroError::InvalidConfiguration(format!("{}: {}", path.display(), e)))
}

async fn init_root(root: Option<&Path>) -> DistroResult<()> {
    let root = root_dir(root)?;
    // The base URL only matters for artifacts, and a fresh root has none.
    let config = BuildConfig::new(&root, "http://localhost/")?;
    DistributionStructureBuilder::new(config)?.init().await?;
    info!("Root ready at {}", root.display());
    Ok(())
}

async fn generate_server(root: Option<&Path>, args: ServerArgs) -> DistroResult<()> {
    let root = root_dir(root)?;
    let table = load_loader_table(args.loader_table.as_deref()).await?;

    let created = ServerStructureBuilder::new(servers_dir(&root), &table)
        .create_server(
            &args.id,
            &args.version,
            args.forge.as_deref(),
            args.fabric.as_deref(),
        )
        .await?;

    info!("Server '{}' at {}", created.server.id, created.directory.display());
    if let Some(layout) = &created.loader_layout {
        for entry in layout.entries() {
            info!(
                "Expecting {} at {}",
                entry.coordinate,
                created.directory.join(entry.server_relative_path()).display()
            );
        }
    }
    Ok(())
}

async fn generate_distro(root: Option<&Path>, args: DistroArgs) -> DistroResult<u8> {
    let root = root_dir(root)?;
    let mut config = BuildConfig::new(&root, &args.base_url)?.with_concurrency(args.concurrency);
    config.loader_table = load_loader_table(args.loader_table.as_deref()).await?;
    config.fetch_loader_files = args.fetch_loaders;

    let previous = if args.no_cache {
        None
    } else {
        match Distribution::load(&config.manifest_path()).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Ignoring unreadable previous manifest: {}", e);
                None
            }
        }
    };

    let mut builder = DistributionStructureBuilder::new(config)?.with_previous(previous);
    match args.curseforge_api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let client = CurseForgeClient::new(key, builder.config().retry.clone())?;
            builder = builder.with_curseforge(Arc::new(client));
        }
        _ => info!("CURSEFORGE_API_KEY not set, curseforge.json entries will be reported"),
    }

    let report = builder.generate().await?;
    if report.is_clean() {
        return Ok(0);
    }

    warn!("Manifest written with {} failure(s):", report.failures.len());
    for failure in &report.failures {
        warn!("  {}", failure);
    }
    Ok(EXIT_PARTIAL)
}
