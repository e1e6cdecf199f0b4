mod commands;
pub mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use commands::{Cli, EXIT_PARTIAL};

/// Entry point of the `helios-distro` binary. Returns the exit status.
pub fn run() -> u8 {
    // A .env next to the root is optional.
    let _ = dotenvy::dotenv();

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,helios_distro=debug")),
        )
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start the async runtime: {}", e);
            return 1;
        }
    };

    runtime.block_on(commands::dispatch(cli))
}
