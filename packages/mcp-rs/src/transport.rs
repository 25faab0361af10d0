use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::protocol::JsonRpcResponse;
use crate::server::McpServer;

/// Serve MCP over the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: Arc<McpServer>) -> io::Result<()> {
  serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Read newline-delimited JSON-RPC messages from `input` and write responses to `output`.
///
/// Each request runs as its own task, so a slow compile does not hold up a `ping`. Responses are
/// funnelled through a single writer task and written one JSON object per line. Returns once the
/// input is exhausted and every in-flight request has been answered.
pub async fn serve<R, W>(server: Arc<McpServer>, input: R, output: W) -> io::Result<()>
where
  R: AsyncRead + Unpin,
  W: AsyncWrite + Unpin + Send + 'static,
{
  let (sender, receiver) = mpsc::unbounded_channel::<JsonRpcResponse>();
  let writer = tokio::spawn(write_responses(receiver, output));

  let mut lines = BufReader::new(input).lines();
  let mut handlers = JoinSet::new();
  while let Some(line) = lines.next_line().await? {
    if line.trim().is_empty() {
      continue;
    }
    let server = Arc::clone(&server);
    let sender = sender.clone();
    handlers.spawn(async move {
      if let Some(response) = server.handle_message(&line).await {
        let _ = sender.send(response);
      }
    });
  }
  log::info!("input closed, finishing {} in-flight requests", handlers.len());

  while let Some(joined) = handlers.join_next().await {
    if let Err(err) = joined {
      log::error!("request handler panicked: {err}");
    }
  }
  drop(sender);

  writer.await.map_err(io::Error::other)?
}

async fn write_responses<W>(
  mut receiver: mpsc::UnboundedReceiver<JsonRpcResponse>,
  mut output: W,
) -> io::Result<()>
where
  W: AsyncWrite + Unpin,
{
  while let Some(response) = receiver.recv().await {
    let mut line = serde_json::to_string(&response)?;
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await?;
  }
  Ok(())
}
