use std::path::Path;
use std::process::Stdio;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::compiler::{Compiler, FsReader};
use crate::error::{Result, TolkError};
use crate::types::{CompileRequest, CompileResult};

pub const DEFAULT_NODE_PROGRAM: &str = "node";
/// Bridge script shipped with this crate. Its `@ton/tolk-js` dependency is installed with
/// `npm install` in the same directory.
pub const DEFAULT_BRIDGE_SCRIPT: &str =
  concat!(env!("CARGO_MANIFEST_DIR"), "/bridge/tolk-bridge.mjs");

/// Drives the WebAssembly build of Tolk through a Node.js bridge script.
///
/// A fresh bridge process is spawned for every call and speaks newline-delimited JSON over its
/// stdin/stdout. While compiling, the bridge forwards each file request from the engine as a
/// `read` message and blocks until the host answers, so the [`FsReader`] stays on the Rust side.
/// The bridge's stderr is inherited.
#[derive(Debug, Clone)]
pub struct BridgeCompiler {
  program: String,
  args: Vec<String>,
}

impl BridgeCompiler {
  pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }

  /// Run `script` with the given Node.js executable.
  pub fn node(program: impl Into<String>, script: &Path) -> Self {
    Self::new(program, [script.to_string_lossy().into_owned()])
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  fn spawn(&self) -> Result<BridgeSession> {
    let mut child = Command::new(&self.program)
      .args(&self.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::inherit())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| TolkError::Spawn {
        program: self.program.clone(),
        source,
      })?;

    let stdin = child
      .stdin
      .take()
      .ok_or(TolkError::UnexpectedEof("stdin unavailable".into()))?;
    let stdout = child
      .stdout
      .take()
      .ok_or(TolkError::UnexpectedEof("stdout unavailable".into()))?;

    Ok(BridgeSession {
      child,
      stdin: Some(stdin),
      lines: BufReader::new(stdout).lines(),
    })
  }

  async fn run_version(&self) -> Result<String> {
    let mut session = self.spawn()?;
    session.send(&HostMessage::Version).await?;
    let version = match session.next().await? {
      BridgeMessage::Version { version } => version,
      BridgeMessage::Read { .. } => return Err(TolkError::UnexpectedMessage("read")),
      BridgeMessage::Result { .. } => return Err(TolkError::UnexpectedMessage("result")),
    };
    session.finish().await;
    Ok(version)
  }

  async fn run_compile(
    &self,
    request: CompileRequest,
    reader: &dyn FsReader,
  ) -> Result<CompileResult> {
    let mut session = self.spawn()?;
    session.send(&HostMessage::Compile(&request)).await?;

    let result = loop {
      match session.next().await? {
        BridgeMessage::Read { path } => {
          let reply = match reader.read_file(&path) {
            Ok(contents) => HostMessage::Contents { contents },
            Err(err) => {
              log::debug!("bridge lookup for `{path}` failed: {err}");
              HostMessage::Missing {
                message: err.to_string(),
              }
            }
          };
          session.send(&reply).await?;
        }
        BridgeMessage::Result { result } => break result,
        BridgeMessage::Version { .. } => return Err(TolkError::UnexpectedMessage("version")),
      }
    };

    session.finish().await;
    Ok(result)
  }
}

impl Compiler for BridgeCompiler {
  fn version(&self) -> BoxFuture<'_, Result<String>> {
    Box::pin(self.run_version())
  }

  fn compile<'a>(
    &'a self,
    request: CompileRequest,
    reader: &'a dyn FsReader,
  ) -> BoxFuture<'a, Result<CompileResult>> {
    Box::pin(self.run_compile(request, reader))
  }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum HostMessage<'a> {
  Compile(&'a CompileRequest),
  Version,
  Contents { contents: String },
  Missing { message: String },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum BridgeMessage {
  Read { path: String },
  Result { result: CompileResult },
  Version { version: String },
}

struct BridgeSession {
  child: Child,
  stdin: Option<ChildStdin>,
  lines: Lines<BufReader<ChildStdout>>,
}

impl BridgeSession {
  async fn send(&mut self, message: &HostMessage<'_>) -> Result<()> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    let stdin = self
      .stdin
      .as_mut()
      .ok_or(TolkError::UnexpectedEof("stdin closed".into()))?;
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await?;
    Ok(())
  }

  async fn next(&mut self) -> Result<BridgeMessage> {
    loop {
      match self.lines.next_line().await? {
        Some(line) if line.trim().is_empty() => continue,
        Some(line) => return Ok(serde_json::from_str(&line)?),
        None => {
          self.stdin.take();
          let status = match self.child.wait().await {
            Ok(status) => status.to_string(),
            Err(err) => err.to_string(),
          };
          return Err(TolkError::UnexpectedEof(status));
        }
      }
    }
  }

  async fn finish(mut self) {
    self.stdin.take();
    match self.child.wait().await {
      Ok(status) if !status.success() => log::warn!("Tolk bridge exited with {status}"),
      Ok(_) => {}
      Err(err) => log::warn!("Failed to reap Tolk bridge: {err}"),
    }
  }
}

#[cfg(all(test, unix))]
mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::compiler::ReadError;

  struct RecordingReader {
    contents: Option<String>,
    requested: Mutex<Vec<String>>,
  }

  impl RecordingReader {
    fn new(contents: Option<&str>) -> Self {
      Self {
        contents: contents.map(str::to_string),
        requested: Mutex::new(Vec::new()),
      }
    }
  }

  impl FsReader for RecordingReader {
    fn read_file(&self, path: &str) -> std::result::Result<String, ReadError> {
      self.requested.lock().unwrap().push(path.to_string());
      self
        .contents
        .clone()
        .ok_or_else(|| ReadError::new(format!("File not found: {path}")))
    }
  }

  const READ_THEN_RESULT: &str = r#"
read request
echo '{"kind":"read","path":"./main.tolk"}'
read reply
case "$reply" in
  *'"kind":"contents"'*) echo '{"kind":"result","result":{"status":"ok","codeHashHex":"aa","codeBoc64":"te6c","fiftCode":"42 PUSHINT","sourcesSnapshot":[]}}' ;;
  *) echo '{"kind":"result","result":{"status":"error","message":"lookup failed"}}' ;;
esac
"#;

  fn request() -> CompileRequest {
    CompileRequest {
      entrypoint_file_name: "main.tolk".into(),
      optimization_level: 2,
      with_stack_comments: false,
      experimental_options: String::new(),
    }
  }

  fn shell(script: &str) -> BridgeCompiler {
    BridgeCompiler::new("sh", ["-c", script])
  }

  #[tokio::test]
  async fn serves_file_reads_until_result() {
    let reader = RecordingReader::new(Some("fun main() {}"));
    let result = shell(READ_THEN_RESULT)
      .compile(request(), &reader)
      .await
      .expect("bridge run");

    let CompileResult::Ok(success) = result else {
      panic!("expected success, got {result:?}");
    };
    assert_eq!(success.fift_code, "42 PUSHINT");
    assert_eq!(*reader.requested.lock().unwrap(), vec!["./main.tolk"]);
  }

  #[tokio::test]
  async fn reports_missing_files_back_to_the_bridge() {
    let reader = RecordingReader::new(None);
    let result = shell(READ_THEN_RESULT)
      .compile(request(), &reader)
      .await
      .expect("bridge run");

    assert_eq!(
      result,
      CompileResult::Error {
        message: "lookup failed".into()
      }
    );
  }

  #[tokio::test]
  async fn queries_version() {
    let bridge = shell("read request\necho '{\"kind\":\"version\",\"version\":\"0.12.0\"}'\n");
    let version = bridge.version().await.expect("version");
    assert_eq!(version, "0.12.0");
  }

  #[tokio::test]
  async fn early_exit_is_an_error() {
    let reader = RecordingReader::new(None);
    let err = shell("read request\nexit 3\n")
      .compile(request(), &reader)
      .await
      .expect_err("bridge exited");
    assert!(matches!(err, TolkError::UnexpectedEof(_)));
  }

  #[test]
  fn default_script_ships_with_the_crate() {
    let script = Path::new(DEFAULT_BRIDGE_SCRIPT);
    assert!(script.is_file(), "{}", script.display());
    let manifest = script.with_file_name("package.json");
    let manifest = std::fs::read_to_string(&manifest).expect("bridge package.json");
    assert!(manifest.contains("\"@ton/tolk-js\""));
  }

  #[tokio::test]
  async fn missing_program_fails_to_spawn() {
    let bridge = BridgeCompiler::new("tolk-bridge-that-does-not-exist", Vec::<String>::new());
    let err = bridge.version().await.expect_err("spawn failure");
    assert!(matches!(err, TolkError::Spawn { .. }));
  }

  /// Runs the shipped bridge script under Node against a stand-in `@ton/tolk-js` that echoes the
  /// entrypoint it reads back as the Fift listing.
  mod node_script {
    use std::fs;
    use std::process::Command as StdCommand;

    use tempfile::TempDir;

    use super::*;

    const STUB_PACKAGE: &str =
      r#"{ "name": "@ton/tolk-js", "type": "module", "exports": "./index.mjs" }"#;

    const STUB_MODULE: &str = r#"
export async function getTolkCompilerVersion() {
  return '1.0.0'
}

export async function runTolkCompiler({ entrypointFileName, fsReadCallback }) {
  try {
    const text = fsReadCallback(entrypointFileName)
    return {
      status: 'ok',
      codeHashHex: 'ab'.repeat(32),
      codeBoc64: Buffer.from(text, 'utf8').toString('base64'),
      fiftCode: text,
      stderr: '',
      sourcesSnapshot: [{ filename: entrypointFileName, contents: text }],
    }
  } catch (err) {
    return { status: 'error', message: err.message }
  }
}
"#;

    fn node_available() -> bool {
      StdCommand::new(DEFAULT_NODE_PROGRAM)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
    }

    /// Copy of the bridge next to a stubbed `node_modules`, or `None` when Node is not installed.
    fn stubbed_bridge() -> Option<(TempDir, BridgeCompiler)> {
      if !node_available() {
        eprintln!("node not found, skipping bridge script test");
        return None;
      }
      let dir = tempfile::tempdir().expect("temp dir");
      let package = dir.path().join("node_modules/@ton/tolk-js");
      fs::create_dir_all(&package).expect("stub package dir");
      fs::write(package.join("package.json"), STUB_PACKAGE).expect("stub package.json");
      fs::write(package.join("index.mjs"), STUB_MODULE).expect("stub module");

      let script = dir.path().join("tolk-bridge.mjs");
      fs::copy(DEFAULT_BRIDGE_SCRIPT, &script).expect("copy bridge script");
      let bridge = BridgeCompiler::node(DEFAULT_NODE_PROGRAM, &script);
      Some((dir, bridge))
    }

    async fn compile_with(bridge: &BridgeCompiler, reader: &RecordingReader) -> CompileResult {
      bridge
        .compile(request(), reader)
        .await
        .expect("bridge run")
    }

    #[tokio::test]
    async fn serves_contents_to_the_engine() {
      let Some((_dir, bridge)) = stubbed_bridge() else {
        return;
      };
      let source = "get fun hello(): int { return 42; }";
      let reader = RecordingReader::new(Some(source));

      let CompileResult::Ok(success) = compile_with(&bridge, &reader).await else {
        panic!("expected success");
      };
      assert_eq!(success.fift_code, source);
      assert_eq!(success.sources_snapshot[0].filename, "main.tolk");
      assert_eq!(*reader.requested.lock().unwrap(), vec!["main.tolk"]);
    }

    #[tokio::test]
    async fn lookup_failures_reach_the_result_verbatim() {
      let Some((_dir, bridge)) = stubbed_bridge() else {
        return;
      };
      let reader = RecordingReader::new(None);

      assert_eq!(
        compile_with(&bridge, &reader).await,
        CompileResult::Error {
          message: "File not found: main.tolk".into()
        }
      );
    }

    #[tokio::test]
    async fn large_multibyte_sources_arrive_intact() {
      let Some((_dir, bridge)) = stubbed_bridge() else {
        return;
      };
      // Mixed 1-4 byte sequences over several pipe buffers, so chunk boundaries split characters.
      let source = format!("// {}\nget fun hello(): int {{ return 42; }}", "é€𝄞a".repeat(20_000));
      assert!(source.len() > 3 * 65_536);
      let reader = RecordingReader::new(Some(&source));

      let CompileResult::Ok(success) = compile_with(&bridge, &reader).await else {
        panic!("expected success");
      };
      assert_eq!(success.fift_code.len(), source.len());
      assert!(success.fift_code == source, "source text changed in transit");
      assert_eq!(success.sources_snapshot[0].contents, source);
    }

    #[tokio::test]
    async fn reports_engine_version() {
      let Some((_dir, bridge)) = stubbed_bridge() else {
        return;
      };
      assert_eq!(bridge.version().await.expect("version"), "1.0.0");
    }
  }
}
