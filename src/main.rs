//! pagewise CLI
//!
//! Downloads World Bank indicator data page by page

use anyhow::Context;
use clap::Parser;
use pagewise::cli::{Cli, Runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so printed records stay clean on stdout
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);
    let stats = runner.run().await.context("Download failed")?;

    tracing::debug!(?stats, "Done");
    Ok(())
}
