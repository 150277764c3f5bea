//! OTC MCP Server binary
//!
//! Reads OTC identity parameters from the environment and serves the ECS
//! tools over stdio.

use clap::Parser;
use otc_mcp_server::auth::TokenManager;
use otc_mcp_server::config::{Config, HTTP_TIMEOUT};
use otc_mcp_server::ecs::EcsClient;
use otc_mcp_server::mcp::McpServer;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "otc-mcp-server",
    about = "MCP server exposing Open Telekom Cloud ECS operations to AI agents",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries the MCP transport, so all diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    let config = Arc::new(Config::from_env());

    let client = reqwest::Client::builder()
        .user_agent(concat!("otc-mcp-server/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let tokens = Arc::new(TokenManager::new(config.clone(), client.clone()));
    let ecs = Arc::new(EcsClient::new(config.clone(), client, tokens));

    info!(region = %config.region, project = %config.project_id, "OTC MCP server running on stdio");

    let mut mcp = McpServer::new(ecs);
    mcp.run_stdio().await?;

    Ok(())
}
