//! Metric Server CLI
//!
//! Serves the process-wide registry, including the default collectors,
//! until interrupted.

use clap::Parser;
use metric_server::{FileConfig, MetricServer, MetricServerOptions};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "metric-server", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind, overriding the configuration file.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overriding the configuration file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Scrape path, overriding the configuration file.
    #[arg(long)]
    path: Option<String>,
}

impl Args {
    fn into_options(self) -> Result<MetricServerOptions, metric_server::ServerError> {
        let file = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        let mut options = file.into_options()?;

        if let Some(host) = self.host {
            options.host = host;
        }
        if let Some(port) = self.port {
            options.port = port;
        }
        if let Some(path) = self.path {
            options.map_path = path;
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Metric Server v{}", metric_server::VERSION);

    let options = match Args::parse().into_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let mut server = match MetricServer::new(options) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to create metric server: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = server.start().await {
        error!("Failed to start metric server: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down");
    server.stop().await;
}
