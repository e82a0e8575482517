use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use thermo_core::{
    Config, ForecastPayload, ForecastResponse, LinearModel, SourceId, TemperatureModel,
    source::{default_source_from_config, source_from_config},
};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "thermo", version, about = "Building temperature forecaster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Model artifact; overrides the configured path.
        #[arg(long)]
        model: Option<PathBuf>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Forecast the next 80 minutes for a zone.
    Forecast {
        /// Base timestamp; if absent, means "now" (local time).
        #[arg(long)]
        timestamp: Option<String>,

        /// Zone name, e.g. "Juegos".
        #[arg(long)]
        zone: Option<String>,

        /// Source short name, "local" or "remote"; defaults to the configured one.
        #[arg(long)]
        source: Option<String>,
    },

    /// Persist settings to the config file.
    Configure {
        #[arg(long)]
        model: Option<PathBuf>,

        #[arg(long)]
        default_zone: Option<String>,

        #[arg(long)]
        default_source: Option<String>,

        /// Server used by the remote source; prompts for its API token.
        #[arg(long)]
        remote_url: Option<String>,

        /// Issue a new API token for this user and print it.
        #[arg(long)]
        issue_token: Option<String>,
    },

    /// Load a model artifact and report whether it matches the feature schema.
    CheckModel {
        /// Defaults to the configured model path.
        path: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { model, host, port } => {
                let mut config = Config::load()?;
                config.apply_env()?;
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }

                let model_path = model.or_else(|| config.model_path());
                server::serve(&config, model_path.as_deref()).await?;
            }
            Command::Forecast {
                timestamp,
                zone,
                source,
            } => {
                let config = Config::load()?;
                let source = match source {
                    Some(id) => source_from_config(SourceId::try_from(id.as_str())?, &config)?,
                    None => default_source_from_config(&config)?,
                };

                let timestamp = timestamp.unwrap_or_else(|| {
                    chrono::Local::now()
                        .naive_local()
                        .format(thermo_core::time::OUTPUT_FORMAT)
                        .to_string()
                });

                let response = source
                    .forecast(&ForecastPayload::new(timestamp, zone))
                    .await?;
                print_forecast(&response);
            }
            Command::Configure {
                model,
                default_zone,
                default_source,
                remote_url,
                issue_token,
            } => {
                let mut config = Config::load()?;

                if let Some(path) = model {
                    config.model_path = Some(path);
                }
                if let Some(zone) = default_zone {
                    config.default_zone = zone;
                }
                if let Some(id) = default_source {
                    config.set_default_source(SourceId::try_from(id.as_str())?);
                }
                if let Some(url) = remote_url {
                    let token = inquire::Password::new("API token for the remote server:")
                        .without_confirmation()
                        .prompt()
                        .context("Failed to read API token")?;
                    config.set_remote(url, token);
                }
                if let Some(user) = issue_token {
                    let token = uuid::Uuid::new_v4().simple().to_string();
                    config.upsert_token(token.clone(), user.clone());
                    println!("Issued token for {user}: {token}");
                }

                config.save()?;
                println!("Configuration saved to {}", Config::config_file_path()?.display());
            }
            Command::CheckModel { path } => {
                let config = Config::load()?;
                let path = path
                    .or_else(|| config.model_path())
                    .ok_or_else(|| anyhow!("No model path given or configured"))?;

                let model = LinearModel::load(&path)?;
                println!("{}: OK ({} features, intercept {})", model.name(), model.features.len(), model.intercept);
                for name in &model.features {
                    match model.categories.get(name) {
                        Some(levels) => {
                            let mut levels: Vec<&str> = levels.keys().map(String::as_str).collect();
                            levels.sort_unstable();
                            println!("  {name:<12} categorical [{}]", levels.join(", "));
                        }
                        None => println!(
                            "  {name:<12} {:+.4}",
                            model.coefficients.get(name).copied().unwrap_or_default()
                        ),
                    }
                }
            }
        }

        Ok(())
    }
}

fn print_forecast(response: &ForecastResponse) {
    println!("Zone {} from {}", response.zone_name, response.base_timestamp);
    for p in &response.predictions {
        println!(
            "  {:>9}  {}  {:6.2} °C  (RH {:.0}%)",
            p.interval_label,
            thermo_core::time::format_timestamp(&p.predicted_timestamp),
            p.predicted_temperature,
            p.humidity_used,
        );
    }
}
