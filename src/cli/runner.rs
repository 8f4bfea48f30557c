//! CLI runner - executes a download

use crate::cli::commands::{Cli, OutputFormat};
use crate::config::load_settings;
use crate::error::{Error, Result};
use crate::output::JsonLinesSink;
use crate::roles::{run_pipeline, Identity, Internal, PipelineStats, Source};
use crate::storage::DuckDbSink;
use crate::worldbank::{WorldBankClient, WorldBankSettings};
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Settings from the config file, with command-line values taking precedence
    pub fn settings(&self) -> Result<WorldBankSettings> {
        let mut settings = match &self.cli.config {
            Some(path) => load_settings::<WorldBankSettings, _>(path)?,
            None => WorldBankSettings::new(
                Vec::<String>::new(),
                Vec::<String>::new(),
                Vec::<String>::new(),
            ),
        };

        if !self.cli.countries.is_empty() {
            settings.countries.clone_from(&self.cli.countries);
        }
        if !self.cli.indicators.is_empty() {
            settings.indicators.clone_from(&self.cli.indicators);
        }
        if !self.cli.dates.is_empty() {
            settings.date_intervals.clone_from(&self.cli.dates);
        }
        if let Some(base_url) = &self.cli.base_url {
            settings.api.base_url.clone_from(base_url);
        }

        if settings.indicators.is_empty() {
            return Err(Error::config(
                "No indicators given (use -i or an `indicators` list in the config file)",
            ));
        }
        Ok(settings)
    }

    /// Download every requested indicator into the chosen sink
    pub async fn run(&self) -> Result<PipelineStats> {
        let settings = self.settings()?;
        info!(
            countries = settings.countries.len(),
            indicators = settings.indicators.len(),
            base_url = %settings.api.base_url,
            "Starting download"
        );

        let start = Instant::now();
        let mut client = WorldBankClient::new(settings)?;
        let client = client.scoped()?;

        let stats = match &self.cli.database {
            Some(path) => {
                let mut sink = DuckDbSink::open(path)?;
                let stats =
                    run_pipeline(client.records(), &Identity, &mut sink, self.cli.limit).await?;
                info!(
                    database = sink.location(),
                    total = sink.count()?,
                    "Observations stored"
                );
                stats
            }
            None => {
                let mut sink =
                    JsonLinesSink::stdout().pretty(self.cli.format == OutputFormat::Pretty);
                run_pipeline(client.records(), &Identity, &mut sink, self.cli.limit).await?
            }
        };

        info!(
            read = stats.read,
            written = stats.written,
            duplicates = stats.duplicates,
            skipped = stats.skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Download finished"
        );
        Ok(stats)
    }
}
