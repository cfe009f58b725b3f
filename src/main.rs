//! Google Tag Manager MCP Server
//!
//! Bridges the Tag Manager API v2 to the Model Context Protocol.

mod api;
mod auth;
mod components;
mod config;
mod debug;
mod error;
mod rest;
mod server;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::GtmClient;
use crate::config::Config;
use crate::debug::DebugLogger;
use crate::server::GtmServer;

#[derive(Parser, Debug)]
#[command(name = "gtm-mcp")]
#[command(author, version, about = "Google Tag Manager MCP Server", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// OAuth client-secret JSON downloaded from Google Cloud Console
    #[arg(long, env = "GTM_CREDENTIALS_FILE")]
    credentials: Option<PathBuf>,

    /// Where the OAuth token is cached
    #[arg(long, env = "GTM_TOKEN_FILE")]
    token: Option<PathBuf>,

    /// Enable debug mode (logs all tool calls and API requests)
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Run the OAuth consent flow and cache the token
    Auth,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(path) = args.credentials.filter(|p| !p.as_os_str().is_empty()) {
        config.credentials_path = path;
    }
    if let Some(path) = args.token.filter(|p| !p.as_os_str().is_empty()) {
        config.token_path = path;
    }
    config.debug |= args.debug;
    config.validate().context("Invalid configuration")?;

    init_tracing(config.debug);

    match args.command {
        Some(Command::Auth) => Ok(run_auth(&config).await),
        None => {
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr; stdout carries the MCP transport.
fn init_tracing(debug: bool) {
    let default = if debug { "gtm_mcp=debug" } else { "gtm_mcp=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_auth(config: &Config) -> ExitCode {
    eprintln!("Authenticating with Google Tag Manager...");
    match auth::authorize(config).await {
        Ok(_) => {
            eprintln!("Authentication successful. Token saved to {}", config.token_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Authentication failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let debug = Arc::new(DebugLogger::new(config.debug));

    if debug.is_enabled() {
        debug.log("GTM MCP Server starting...");
        debug.log(&format!("Credentials file: {}", config.credentials_path.display()));
        debug.log(&format!("Token file: {}", config.token_path.display()));
        debug.log(&format!("API base URL: {}", config.api_base_url));
        debug.log(&format!("Token endpoint: {}", config.token_endpoint));
        if let Some(path) = debug.trace_path() {
            eprintln!("[DEBUG] Trace file: {}", path.display());
        }
    }

    // Authentication happens lazily on the first tool call.
    let client = Arc::new(GtmClient::new(config, debug.clone()));
    let server = GtmServer::new(client, debug.clone());

    let service = server.serve(stdio()).await?;
    info!("GTM MCP server running on stdio");

    service.waiting().await?;

    debug.log("MCP server shutting down");
    Ok(())
}
