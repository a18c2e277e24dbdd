mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first
    dotenvy::dotenv().ok();

    let _guard = logging::init_logging()?;

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.network.as_deref())?;

    if let Err(e) = commands::execute(cli.command, config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
