// ABOUTME: Entry point for jpom-admin CLI
// ABOUTME: Provides admin commands against a Jpom server

use anyhow::Result;
use clap::Parser;
use jpom_admin::commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    jpom_log::init_for(jpom_admin::LOG_TARGETS, level);

    let overrides = cli.overrides();
    jpom_admin::run_command(cli.command, overrides).await
}
