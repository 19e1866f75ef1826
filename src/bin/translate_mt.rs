//! MT-backed entry point: translate a TSV dataset with a dedicated
//! machine-translation API.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tabtrans::cli::MtArgs;
use tabtrans::config::AppConfig;
use tabtrans::logging::setup_logging;
use tabtrans::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let args = MtArgs::parse();

    setup_logging(args.verbose)?;

    let config = AppConfig::load(args.config.as_deref())?;

    pipeline::run_mt(&args, &config).await?;

    info!("Translation pipeline completed successfully");
    Ok(())
}
