mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::cli::context::CliContext;
use crate::cli::dispatch::dispatch;
use crate::cli::env::CliArgs;
use crate::cli::runtime::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;

    info!("Starting PageMirror v{}", env!("CARGO_PKG_VERSION"));

    let loaded = pagemirror_cli::load_config(cli.config.as_deref())?;
    let ctx = CliContext::new(loaded.config, loaded.path, loaded.from_file, cli.output);

    match dispatch(&cli, &ctx).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
