//! proxmox-mcp-server - MCP server for Proxmox VE.
//!
//! Reads JSON-RPC requests line by line from stdin and writes responses to
//! stdout. All logging goes to stderr.

mod cli;
mod config;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pvemcp_core::Router;
use pvemcp_http::ApiClient;

use cli::Cli;
use config::ServerConfig;
use server::Handler;

const BANNER_RULE: &str = "==================================================";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let config = ServerConfig::from_cli(&cli).context("invalid configuration")?;

    info!("{}", BANNER_RULE);
    info!("Proxmox MCP Server v{}", env!("PVEMCP_VERSION"));
    info!("{}", BANNER_RULE);
    info!("Proxmox Host: {}", config.address());
    info!("User: {}", config.credentials.user());
    info!(
        "SSL Verification: {}",
        if config.client.verify_ssl { "Enabled" } else { "Disabled" }
    );
    info!("Authentication: {}", config.credentials.mode());
    info!("{}", BANNER_RULE);

    let client = ApiClient::connect(config.api, config.credentials, config.client)
        .await
        .context("authentication failed")?;

    let router = Router::new(client).with_fan_out(config.fan_out);
    let tools = router.registry().len();
    let handler = Arc::new(Handler::new(router));

    info!("{}", BANNER_RULE);
    info!("Server ready - {} tools available", tools);
    info!("{}", BANNER_RULE);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = server::serve(handler, stdin, stdout) => {
            result.context("stdio transport failed")?;
            info!("Input closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Server stopped by user");
            // A pending stdin read would block runtime shutdown
            std::process::exit(0);
        }
    }

    Ok(())
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout carries the protocol
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
