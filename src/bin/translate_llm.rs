//! LLM-backed entry point: translate a TSV dataset with a local open-weight
//! engine or a commercial chat-completion API.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tabtrans::cli::LlmArgs;
use tabtrans::config::AppConfig;
use tabtrans::logging::setup_logging;
use tabtrans::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let args = LlmArgs::parse();

    setup_logging(args.verbose)?;

    let config = AppConfig::load(args.config.as_deref())?;

    pipeline::run_llm(&args, &config).await?;

    info!("Translation pipeline completed successfully");
    Ok(())
}
