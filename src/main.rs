use anyhow::{Context, Result};
use career_risk::cli::{handle_assess_command, Cli, Command};
use career_risk::config::AppConfig;
use career_risk::start_web_server;
use clap::Parser;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() -> Result<()> {
    // Optional JSON log file next to the console output
    let file_layer = match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("career_risk=info,rocket::server=off")),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            info!("Server: http://localhost:{}", config.port);
            start_web_server(config).await
        }
        Command::Assess {
            url,
            screenshot,
            pdf,
            json,
        } => handle_assess_command(&config, url, screenshot, pdf, json).await,
    }
}
