use std::fmt;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::types::{CompileRequest, CompileResult};

/// File lookup callback handed to the compiler. Returning an error aborts the compiler run; the
/// error text ends up inside the compiler's failure message.
pub trait FsReader: Send + Sync {
  fn read_file(&self, path: &str) -> std::result::Result<String, ReadError>;
}

/// A failed lookup, carried back to the compiler as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadError {
  message: String,
}

impl ReadError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

impl fmt::Display for ReadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}

impl std::error::Error for ReadError {}

/// The external Tolk engine.
///
/// Implementations await exactly one outcome per call. A compile error in the user's sources is a
/// successful call returning [`CompileResult::Error`]; `Err` is reserved for failures of the
/// binding itself (the engine could not be reached or answered garbage).
pub trait Compiler: Send + Sync {
  /// Semantic version reported by the engine, e.g. `0.12.0`.
  fn version(&self) -> BoxFuture<'_, Result<String>>;

  fn compile<'a>(
    &'a self,
    request: CompileRequest,
    reader: &'a dyn FsReader,
  ) -> BoxFuture<'a, Result<CompileResult>>;
}
