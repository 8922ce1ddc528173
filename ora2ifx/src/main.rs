//! ora2ifx CLI - Informix DDL from an Oracle catalog snapshot.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use ora2ifx::config::{self, Config, LoggingConfig};
use ora2ifx::utils::logging::init_logging;
use ora2ifx::Ora2IfxClient;

#[derive(Parser)]
#[command(name = "ora2ifx")]
#[command(about = "Generate Informix DDL from Oracle catalog metadata")]
#[command(version)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Schema owner to convert
    #[arg(short = 'u', long)]
    owner: Option<String>,

    /// Catalog snapshot (.json, .yaml or .yml)
    #[arg(long)]
    catalog: Option<String>,

    /// Type override CSV (owner, table, column, target type)
    #[arg(long)]
    overrides: Option<String>,

    /// Write DDL to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Log verbosity: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Print the generation report as JSON to stderr
    #[arg(long)]
    report_json: bool,
}

impl Cli {
    /// Load the config file, if any, and apply command line overrides
    fn into_config(self) -> anyhow::Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => config::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(owner) = self.owner {
            config.source.owner = Some(owner);
        }
        if let Some(catalog) = self.catalog {
            config.source.catalog = Some(catalog);
        }
        if let Some(overrides) = self.overrides {
            config.type_mapping.override_file = Some(overrides);
        }
        if let Some(output) = self.output {
            config.output.file = Some(output);
        }
        if let Some(level) = self.log_level {
            match config.logging.as_mut() {
                Some(logging) => logging.level = level,
                None => {
                    config.logging = Some(LoggingConfig {
                        level,
                        file: None,
                        format: "text".to_string(),
                    })
                }
            }
        }

        Ok((config, self.report_json))
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (config, report_json) = cli.into_config()?;
    init_logging(&config.logging).context("initializing logging")?;

    if config.source.owner.is_none() {
        bail!("no schema owner given (use -u/--owner or [source] owner)");
    }
    let output = config.output.file.clone();

    let client = Ora2IfxClient::new(config)?;
    let script = client.generate().await?;

    match &output {
        Some(path) => {
            fs::write(path, &script.ddl).with_context(|| format!("writing {}", path))?;
            tracing::info!(path = %path, bytes = script.ddl.len(), "DDL written");
        }
        None => print!("{}", script.ddl),
    }

    for anomaly in &script.report.anomalies {
        tracing::warn!(object = %anomaly.object, kind = ?anomaly.kind, "Needs manual review");
    }
    if report_json {
        eprintln!("{}", serde_json::to_string_pretty(&script.report)?);
    }

    if script.report.has_failures() {
        tracing::error!(
            failures = script.report.failures.len(),
            "Some objects could not be generated"
        );
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
