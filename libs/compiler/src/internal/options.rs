use serde::{Deserialize, Serialize};
use tolk_rs::CompileRequest;

use crate::internal::errors::{Error, Result};

/// Highest optimization level the engine accepts; also the default.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 2;

/// Fully resolved settings for one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
  pub optimization_level: u8,
  pub with_stack_comments: bool,
  pub experimental_options: String,
}

impl Default for CompileOptions {
  fn default() -> Self {
    CompileOptions {
      optimization_level: MAX_OPTIMIZATION_LEVEL,
      with_stack_comments: false,
      experimental_options: String::new(),
    }
  }
}

/// Caller-supplied overrides as they arrive in tool arguments. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptionsInput {
  pub optimization_level: Option<i64>,
  pub with_stack_comments: Option<bool>,
  pub experimental_options: Option<String>,
}

impl CompileOptions {
  pub fn from_input(input: Option<&CompileOptionsInput>) -> Result<Self> {
    Self::default().merge(input)
  }

  /// Apply `overrides` on top of `self`, validating the optimization level.
  pub fn merge(&self, overrides: Option<&CompileOptionsInput>) -> Result<Self> {
    let Some(overrides) = overrides else {
      return Ok(self.clone());
    };

    let optimization_level = overrides
      .optimization_level
      .map(validate_optimization_level)
      .transpose()?
      .unwrap_or(self.optimization_level);

    Ok(CompileOptions {
      optimization_level,
      with_stack_comments: overrides
        .with_stack_comments
        .unwrap_or(self.with_stack_comments),
      experimental_options: overrides
        .experimental_options
        .clone()
        .unwrap_or_else(|| self.experimental_options.clone()),
    })
  }

  /// Settings used by syntax checks: maximum optimization, no stack comments, no experimental
  /// flags. Hashes match a full compile run with the same settings.
  pub fn syntax_check() -> Self {
    CompileOptions::default()
  }

  pub(crate) fn to_request(&self, entrypoint: &str) -> CompileRequest {
    CompileRequest {
      entrypoint_file_name: entrypoint.to_string(),
      optimization_level: self.optimization_level,
      with_stack_comments: self.with_stack_comments,
      experimental_options: self.experimental_options.clone(),
    }
  }
}

fn validate_optimization_level(level: i64) -> Result<u8> {
  u8::try_from(level)
    .ok()
    .filter(|level| *level <= MAX_OPTIMIZATION_LEVEL)
    .ok_or_else(|| {
      Error::InvalidOptions(format!(
        "optimizationLevel must be between 0 and {MAX_OPTIMIZATION_LEVEL}, got {level}"
      ))
    })
}
