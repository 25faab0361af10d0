//! Model Context Protocol server for the Tolk compiler.
//!
//! Exposes `get_compiler_version`, `compile_tolk` and `check_tolk_syntax` as tools, a set of
//! `tolk://` reference resources and a few prompt templates over JSON-RPC 2.0 on stdio.

pub mod config;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use config::ServerConfig;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::{serve, serve_stdio};
