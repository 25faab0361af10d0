//! Adapter between structured compile requests and the external Tolk compiler.
//!
//! [`TolkCompiler`] serves in-memory sources to the engine through a flat virtual filesystem,
//! awaits a single outcome and maps it into [`CompileOutcome`], which renders itself as a
//! human-readable report.

mod compiler;
mod internal;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use compiler::{
  input::SourceSet,
  output::{
    estimated_boc_size, CompileOutcome, CompiledArtifacts, SourceSnapshotEntry, SyntaxCheckOutcome,
  },
  TolkCompiler,
};
pub use internal::errors::{Error, Result};
pub use internal::options::{CompileOptions, CompileOptionsInput, MAX_OPTIMIZATION_LEVEL};
pub use internal::path::{normalize_path, FileNotFound, SourceResolver};
