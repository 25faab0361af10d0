use std::path::PathBuf;

use clap::Parser;
use tolk_rs::{BridgeCompiler, DEFAULT_BRIDGE_SCRIPT, DEFAULT_NODE_PROGRAM};

#[derive(Parser, Debug, Clone)]
#[command(name = "tolk-mcp")]
#[command(about = "MCP server exposing the Tolk smart-contract compiler over stdio")]
#[command(version)]
pub struct ServerConfig {
  /// Node.js executable used to run the compiler bridge
  #[arg(long, env = "TOLK_MCP_NODE", default_value = DEFAULT_NODE_PROGRAM)]
  pub node: String,

  /// Bridge script wrapping @ton/tolk-js
  #[arg(long, env = "TOLK_MCP_BRIDGE_SCRIPT", default_value = DEFAULT_BRIDGE_SCRIPT)]
  pub bridge_script: PathBuf,

  /// Log filter written to stderr (RUST_LOG takes precedence)
  #[arg(long, env = "TOLK_MCP_LOG", default_value = "info")]
  pub log_level: String,
}

impl ServerConfig {
  pub fn bridge(&self) -> BridgeCompiler {
    BridgeCompiler::node(self.node.clone(), &self.bridge_script)
  }

  /// Whether `@ton/tolk-js` resolves from the bridge script's directory.
  pub fn bridge_dependencies_installed(&self) -> bool {
    self
      .bridge_script
      .ancestors()
      .skip(1)
      .any(|dir| dir.join("node_modules/@ton/tolk-js").is_dir())
  }

  /// Route logs to stderr; stdout belongs to the protocol.
  pub fn init_logging(&self) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&self.log_level))
      .target(env_logger::Target::Stderr)
      .init();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_flags_override_defaults() {
    let config = ServerConfig::try_parse_from([
      "tolk-mcp",
      "--node",
      "/usr/local/bin/node",
      "--bridge-script",
      "/opt/tolk/tolk-bridge.mjs",
      "--log-level",
      "debug",
    ])
    .expect("parse flags");

    assert_eq!(config.node, "/usr/local/bin/node");
    assert_eq!(config.bridge_script, PathBuf::from("/opt/tolk/tolk-bridge.mjs"));
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.bridge().program(), "/usr/local/bin/node");
  }

  #[test]
  fn defaults_to_the_shipped_bridge_script() {
    let config = ServerConfig::try_parse_from(["tolk-mcp"]).expect("parse defaults");
    assert!(config.bridge_script.is_absolute());
    assert!(config.bridge_script.is_file(), "{}", config.bridge_script.display());
    assert_eq!(config.node, "node");
  }

  #[test]
  fn rejects_unknown_flags() {
    assert!(ServerConfig::try_parse_from(["tolk-mcp", "--port", "8080"]).is_err());
  }
}
