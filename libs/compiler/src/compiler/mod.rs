use std::sync::Arc;

use tolk_rs::Compiler;

use crate::internal::errors::{Error, Result};
use crate::internal::options::CompileOptions;
use crate::internal::path::SourceResolver;
use input::SourceSet;
use output::{CompileOutcome, SyntaxCheckOutcome};

pub mod input;
pub mod output;

/// Compiler façade shared by every request. It holds no per-request state: sources, options and
/// outcomes live only for the duration of one call, so concurrent calls never observe each other.
#[derive(Clone)]
pub struct TolkCompiler {
  backend: Arc<dyn Compiler>,
}

impl TolkCompiler {
  pub fn new(backend: Arc<dyn Compiler>) -> Self {
    Self { backend }
  }

  pub fn from_backend<C: Compiler + 'static>(backend: C) -> Self {
    Self::new(Arc::new(backend))
  }

  /// Version reported by the engine, normalised to `MAJOR.MINOR.PATCH`.
  pub async fn version(&self) -> Result<String> {
    let raw = self.backend.version().await?;
    let parsed = tolk_rs::parse_version(&raw)?;
    Ok(parsed.to_string())
  }

  /// Reject requests whose entrypoint is not among the submitted sources. Callers run this before
  /// [`compile`](Self::compile) or [`check_syntax`](Self::check_syntax); the engine's own message
  /// for a missing entrypoint is less specific.
  pub fn ensure_entrypoint(entrypoint: &str, sources: &SourceSet) -> Result<()> {
    if sources.contains_key(entrypoint) {
      return Ok(());
    }
    Err(Error::MissingEntrypoint {
      entrypoint: entrypoint.to_string(),
      available: sources.keys().cloned().collect(),
    })
  }

  /// Compile `entrypoint` with the caller's settings and return the complete artifact set.
  ///
  /// Missing imports surface as [`CompileOutcome::Failure`] carrying the engine's message as-is.
  /// `Err` is only returned when the engine itself could not be driven.
  pub async fn compile(
    &self,
    entrypoint: &str,
    sources: &SourceSet,
    options: &CompileOptions,
  ) -> Result<CompileOutcome> {
    self.run(entrypoint, sources, options).await
  }

  /// Compile with [`CompileOptions::syntax_check`] and keep only the hash and warnings.
  pub async fn check_syntax(
    &self,
    entrypoint: &str,
    sources: &SourceSet,
  ) -> Result<SyntaxCheckOutcome> {
    let outcome = self
      .run(entrypoint, sources, &CompileOptions::syntax_check())
      .await?;
    Ok(outcome.into())
  }

  async fn run(
    &self,
    entrypoint: &str,
    sources: &SourceSet,
    options: &CompileOptions,
  ) -> Result<CompileOutcome> {
    log::debug!(
      "compiling {entrypoint} ({} files, optimization level {})",
      sources.len(),
      options.optimization_level
    );

    let resolver = SourceResolver::new(sources);
    let result = self
      .backend
      .compile(options.to_request(entrypoint), &resolver)
      .await?;
    let outcome = CompileOutcome::from(result);

    match &outcome {
      CompileOutcome::Success(artifacts) => {
        log::info!("compiled {entrypoint}: code hash {}", artifacts.code_hash_hex)
      }
      CompileOutcome::Failure { message } => {
        log::info!("compilation of {entrypoint} failed: {message}")
      }
    }
    Ok(outcome)
  }
}
