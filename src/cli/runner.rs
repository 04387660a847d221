//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, HostArgs, OutputFormat, RequiredHostArgs};
use crate::client::{HostQuery, HostScope, SatelliteClient};
use crate::config::SatelliteConfig;
use crate::error::{Error, Result};
use crate::nvra::Nvra;
use crate::pagination::RecordStream;
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
    cancel: CancellationToken,
}

impl Runner {
    /// Create a new runner; `cancel` stops a running listing
    pub fn new(cli: Cli, cancel: CancellationToken) -> Self {
        Self { cli, cancel }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Nvra { compound } => self.nvra(compound),
            Commands::Resolve { name } => {
                let id = self.client()?.resolve_host(name).await?;
                self.output(&json!({ "name": name, "id": id }))
            }
            Commands::Host { id_or_name } => {
                let host = self.client()?.get_host(id_or_name).await?;
                self.output(&host)
            }
            Commands::Hosts {
                search,
                full,
                per_page,
            } => {
                let query = HostQuery {
                    search: search.clone(),
                    thin: !full,
                    per_page: *per_page,
                };
                let hosts = self.client()?.list_hosts(query, self.cancel.clone());
                self.drain("hosts", hosts).await
            }
            Commands::Packages { host } => {
                let packages = self
                    .client()?
                    .list_host_packages(optional_scope(host), self.cancel.clone())
                    .await?;
                self.drain("packages", packages).await
            }
            Commands::Errata { host } => {
                let errata = self
                    .client()?
                    .list_host_errata(required_scope(host)?, self.cancel.clone())
                    .await?;
                self.drain("errata", errata).await
            }
        }
    }

    /// Load the configuration and build a client
    fn client(&self) -> Result<SatelliteClient> {
        let config = SatelliteConfig::load(self.cli.config.as_deref())?;
        SatelliteClient::from_config(config)
    }

    fn nvra(&self, compound: &str) -> Result<()> {
        let nvra = Nvra::parse(compound)?;
        self.output(&nvra)
    }

    /// Print every record of a listing as it arrives
    async fn drain<T: Serialize>(&self, what: &str, mut records: RecordStream<T>) -> Result<()> {
        let start = Instant::now();
        let mut count = 0u64;

        while let Some(record) = records.next().await {
            self.output(&record?)?;
            count += 1;
        }

        if self.cancel.is_cancelled() {
            info!(count, "{what} listing interrupted");
        } else {
            info!(count, elapsed_ms = start.elapsed().as_millis() as u64, "listed {what}");
        }
        Ok(())
    }

    fn output<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}")?;
        Ok(())
    }
}

fn optional_scope(host: &HostArgs) -> HostScope {
    match (host.host_id, &host.host_name) {
        (Some(id), _) => HostScope::Id(id),
        (None, Some(name)) => HostScope::Name(name.clone()),
        (None, None) => HostScope::All,
    }
}

fn required_scope(host: &RequiredHostArgs) -> Result<HostScope> {
    match (host.host_id, &host.host_name) {
        (Some(id), _) => Ok(HostScope::Id(id)),
        (None, Some(name)) => Ok(HostScope::Name(name.clone())),
        (None, None) => Err(Error::config("no valid host id or name provided")),
    }
}
