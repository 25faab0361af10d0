use serde::{Deserialize, Serialize};

/// Arguments for a single compiler run. The sources themselves are not part of the request; the
/// compiler pulls them through the [`FsReader`](crate::FsReader) it is handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
  pub entrypoint_file_name: String,
  pub optimization_level: u8,
  pub with_stack_comments: bool,
  pub experimental_options: String,
}

/// Result of a compiler run, discriminated by `status` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompileResult {
  Ok(CompileSuccess),
  Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileSuccess {
  pub code_hash_hex: String,
  pub code_boc64: String,
  pub fift_code: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stderr: Option<String>,
  #[serde(default)]
  pub sources_snapshot: Vec<SourceSnapshotEntry>,
}

/// A file the compiler actually read during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshotEntry {
  pub filename: String,
  pub contents: String,
}
