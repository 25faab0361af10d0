//! Typesafe bindings for the Tolk smart-contract compiler.
//!
//! The compiler itself is an opaque engine. This crate describes the request it accepts, the two
//! outcomes it can produce, and the file-lookup callback it calls back into while resolving
//! imports. [`BridgeCompiler`] drives the published WebAssembly build through a small Node.js
//! bridge process; anything else that can honour the [`Compiler`] contract can be substituted.

mod bridge;
mod compiler;
mod error;
mod types;
mod version;

pub use bridge::{BridgeCompiler, DEFAULT_BRIDGE_SCRIPT, DEFAULT_NODE_PROGRAM};
pub use compiler::{Compiler, FsReader, ReadError};
pub use futures::future::BoxFuture;
pub use error::{Result, TolkError};
pub use types::{CompileRequest, CompileResult, CompileSuccess, SourceSnapshotEntry};
pub use version::parse_version;
