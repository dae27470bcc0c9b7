//! dooray-mcp - MCP stdio server for the Dooray! API
//!
//! This binary is intended to be launched by an MCP client (e.g. Claude
//! Desktop or Claude Code). It reads credentials from the environment,
//! builds the tool registry once, and serves JSON-RPC over stdio. stdout
//! carries protocol messages only; logs go to stderr.

use dooray_mcp::{all_tools, DoorayClient, DoorayConfig, McpServer};
use std::sync::Arc;
use tracing::info;

fn log_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    info!("Dooray MCP server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = DoorayConfig::from_env()?;
    let client = Arc::new(DoorayClient::new(&config));

    let server = McpServer::dooray();
    server.register_tools(all_tools(&client)).await;
    info!("Registered {} tools", server.list_tools().await.len());

    server.run_stdio().await?;
    Ok(())
}
