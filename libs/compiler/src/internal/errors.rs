use thiserror::Error;
use tolk_rs::TolkError;

/// Canonical error type used by the Rust-facing API surface.
///
/// Compile errors in user sources are not errors at this level; they travel as
/// [`CompileOutcome::Failure`](crate::CompileOutcome::Failure).
#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "Entrypoint file \"{entrypoint}\" not found in sources. Available files: {}",
    list_files(.available)
  )]
  MissingEntrypoint {
    entrypoint: String,
    available: Vec<String>,
  },

  #[error("Invalid compile options: {0}")]
  InvalidOptions(String),

  #[error(transparent)]
  Compiler(#[from] TolkError),
}

/// Result alias bound to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Comma-separated file list for diagnostics.
pub(crate) fn list_files(files: &[String]) -> String {
  if files.is_empty() {
    "(none)".to_string()
  } else {
    files.join(", ")
  }
}
