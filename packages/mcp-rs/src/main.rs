//! tolk-mcp - MCP server for the Tolk compiler

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tolk_compiler::TolkCompiler;
use tolk_mcp::{serve_stdio, McpServer, ServerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let config = ServerConfig::parse();
  config.init_logging();

  if !config.bridge_script.exists() {
    log::warn!(
      "bridge script {} not found; compiler calls will fail until it is installed",
      config.bridge_script.display()
    );
  } else if !config.bridge_dependencies_installed() {
    log::warn!(
      "@ton/tolk-js is not installed next to {}; run `npm install` in that directory",
      config.bridge_script.display()
    );
  }

  let server = Arc::new(McpServer::new(TolkCompiler::from_backend(config.bridge())));
  log::info!(
    "tolk-mcp {} serving on stdio (bridge: {} {})",
    env!("CARGO_PKG_VERSION"),
    config.node,
    config.bridge_script.display()
  );

  serve_stdio(server)
    .await
    .context("MCP stdio transport failed")?;
  log::info!("session closed");
  Ok(())
}
