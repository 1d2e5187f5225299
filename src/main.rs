use std::{sync::Arc, time::Duration};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod constants;
mod renderer;
mod report;
mod server;
mod service;
mod speed;
mod store;
mod utils;

use cli::*;
use config::{AppConfig, load_config};
use server::{HttpServerConfig, run_http_server};
use service::{Export, LogPaths, SpeedTestService};
use speed::HttpSpeedProvider;
use store::{JsonFileStore, MemoryStore, ResultStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            common,
            port,
            bind,
            no_cors,
        } => {
            let mut config = resolve_config(&common)?;
            if let Some(bind) = bind {
                config.bind_addr.set_ip(bind);
            }
            if let Some(port) = port {
                config.bind_addr.set_port(port);
            }
            if no_cors {
                config.enable_cors = false;
            }

            println!("{}", "Starting web server...".blue().bold());
            let server_config = HttpServerConfig {
                bind_addr: config.bind_addr,
                enable_cors: config.enable_cors,
            };
            run_http_server(server_config, build_service(&config, common.in_memory)?).await?;
        }

        Commands::Check { common } => {
            let config = resolve_config(&common)?;
            let service = build_service(&config, common.in_memory)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
            spinner.set_message("Running speed test...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcome = service.check_speed().await;
            spinner.finish_and_clear();

            let outcome = outcome.wrap_err("Speed test failed")?;
            println!("{}", "Speed test complete".green().bold());
            print!("{outcome}");
        }

        Commands::Export {
            common,
            format,
            output,
        } => {
            let config = resolve_config(&common)?;
            let service = build_service(&config, common.in_memory)?;

            let body = match service.export(format)? {
                Export::Json(json) => json.into_bytes(),
                Export::Csv(csv) => csv,
            };

            match output {
                Some(path) => {
                    tokio::fs::write(&path, body)
                        .await
                        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "Exported results as {} to {}",
                        format.to_string().cyan(),
                        path.display().to_string().yellow()
                    );
                }
                None => {
                    use tokio::io::AsyncWriteExt;
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&body).await?;
                    stdout.flush().await?;
                }
            }
        }
    }

    Ok(())
}

/// Loads the config file and applies the path overrides given on the command line.
fn resolve_config(common: &CommonArgs) -> Result<AppConfig> {
    let mut config = load_config(common.config.as_deref())?;

    if let Some(ref store) = common.store {
        config.store_path = store.clone();
    }
    if let Some(ref json_log) = common.json_log {
        config.json_log_path = json_log.clone();
    }
    if let Some(ref csv_log) = common.csv_log {
        config.csv_log_path = csv_log.clone();
    }

    Ok(config)
}

fn build_service(config: &AppConfig, in_memory: bool) -> Result<Arc<SpeedTestService>> {
    let provider = HttpSpeedProvider::new(config.measurement.clone())
        .wrap_err("Failed to create measurement client")?;
    let store: Arc<dyn ResultStore> = if in_memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::open(&config.store_path)?)
    };

    Ok(Arc::new(SpeedTestService::new(
        Arc::new(provider),
        store,
        LogPaths::from(config),
    )))
}
