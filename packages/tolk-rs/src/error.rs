use std::io;

use thiserror::Error;

/// Failures raised by the binding itself, as opposed to compile errors reported by Tolk.
#[derive(Debug, Error)]
pub enum TolkError {
  #[error("Failed to start Tolk bridge `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("Tolk bridge I/O failed: {0}")]
  Io(#[from] io::Error),

  #[error("Malformed message from Tolk bridge: {0}")]
  Protocol(#[from] serde_json::Error),

  #[error("Tolk bridge exited before answering ({0})")]
  UnexpectedEof(String),

  #[error("Tolk bridge sent an unexpected `{0}` message")]
  UnexpectedMessage(&'static str),

  #[error("Failed to parse Tolk compiler version `{version}`: {source}")]
  Version {
    version: String,
    #[source]
    source: semver::Error,
  },
}

pub type Result<T> = std::result::Result<T, TolkError>;
