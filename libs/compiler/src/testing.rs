//! Deterministic stand-in for the Tolk engine.
//!
//! [`ScriptedCompiler`] honours the [`Compiler`] contract closely enough to exercise everything
//! around it: it walks `import "..."` statements through the supplied reader, rejects any file
//! containing `invalid syntax`, emits one `PUSHINT` per `return <number>;` and derives the code
//! hash from the files it read and the optimization level.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use base64::Engine;
use tolk_rs::{
  BoxFuture, CompileRequest, CompileResult, CompileSuccess, Compiler, FsReader, Result,
  SourceSnapshotEntry,
};

use crate::SourceSet;

/// Entrypoint with a single get-method returning `42`.
pub const HELLO_SOURCE: &str = "fun onInternalMessage(myBalance: int, msgValue: int, msgFull: cell, msgBody: slice) { }\n\nget fun hello(): int { return 42; }";

pub fn sources(entries: &[(&str, &str)]) -> SourceSet {
  entries
    .iter()
    .map(|(name, text)| (name.to_string(), text.to_string()))
    .collect()
}

#[derive(Debug)]
pub struct ScriptedCompiler {
  version: String,
  calls: AtomicUsize,
  last_request: Mutex<Option<CompileRequest>>,
}

impl Default for ScriptedCompiler {
  fn default() -> Self {
    Self::with_version("0.12.0")
  }
}

impl ScriptedCompiler {
  pub fn with_version(version: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      calls: AtomicUsize::new(0),
      last_request: Mutex::new(None),
    }
  }

  /// Number of compile calls served so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn last_request(&self) -> Option<CompileRequest> {
    self
      .last_request
      .lock()
      .map(|request| request.clone())
      .unwrap_or_default()
  }
}

impl Compiler for ScriptedCompiler {
  fn version(&self) -> BoxFuture<'_, Result<String>> {
    let version = self.version.clone();
    Box::pin(async move { Ok(version) })
  }

  fn compile<'a>(
    &'a self,
    request: CompileRequest,
    reader: &'a dyn FsReader,
  ) -> BoxFuture<'a, Result<CompileResult>> {
    Box::pin(async move {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if let Ok(mut last) = self.last_request.lock() {
        *last = Some(request.clone());
      }
      Ok(run_script(&request, reader))
    })
  }
}

fn run_script(request: &CompileRequest, reader: &dyn FsReader) -> CompileResult {
  let entrypoint = &request.entrypoint_file_name;
  let mut pending = vec![entrypoint.clone()];
  let mut seen = BTreeSet::new();
  let mut snapshot = Vec::new();
  let mut constants = Vec::new();
  let mut warnings = String::new();

  while let Some(path) = pending.pop() {
    if !seen.insert(path.clone()) {
      continue;
    }
    let contents = match reader.read_file(&path) {
      Ok(contents) => contents,
      Err(err) => {
        return CompileResult::Error {
          message: format!("{entrypoint}: error: {err}"),
        }
      }
    };
    if let Some(column) = contents.find("invalid syntax") {
      return CompileResult::Error {
        message: format!("{path}:1:{}: error: expected `;`, got `syntax`", column + 9),
      };
    }
    if contents.contains("var unused") {
      warnings.push_str(&format!("{path}: warning: variable `unused` is never used\n"));
    }

    let mut imports = imports(&contents);
    imports.reverse();
    pending.extend(imports);
    constants.extend(returned_constants(&contents));
    snapshot.push(SourceSnapshotEntry {
      filename: path,
      contents,
    });
  }

  let mut fift = String::from("\"Asm.fif\" include\nPROGRAM{\n");
  for constant in &constants {
    fift.push_str(&format!("  {constant} PUSHINT"));
    if request.with_stack_comments {
      fift.push_str("\t// ");
      fift.push_str(constant);
    }
    fift.push('\n');
  }
  fift.push_str("}END>c\n");

  let mut hasher = DefaultHasher::new();
  for entry in &snapshot {
    entry.contents.hash(&mut hasher);
  }
  request.optimization_level.hash(&mut hasher);
  let digest = hex::encode(hasher.finish().to_be_bytes()).repeat(4);

  CompileResult::Ok(CompileSuccess {
    code_hash_hex: digest,
    code_boc64: base64::engine::general_purpose::STANDARD.encode(fift.as_bytes()),
    fift_code: fift,
    stderr: Some(warnings),
    sources_snapshot: snapshot,
  })
}

fn imports(contents: &str) -> Vec<String> {
  contents
    .lines()
    .filter_map(|line| line.trim().strip_prefix("import"))
    .filter_map(|rest| {
      let start = rest.find('"')? + 1;
      let end = start + rest[start..].find('"')?;
      Some(rest[start..end].to_string())
    })
    .collect()
}

fn returned_constants(contents: &str) -> Vec<String> {
  contents
    .match_indices("return ")
    .filter_map(|(index, needle)| {
      let digits: String = contents[index + needle.len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
      (!digits.is_empty()).then_some(digits)
    })
    .collect()
}
