//! Line-delimited JSON-RPC transport.
//!
//! Each request runs on its own task so a slow call never blocks the reader.
//! Responses funnel through one writer task and may leave out of order.

mod handler;
mod protocol;

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use pvemcp_core::Executor;

pub use handler::Handler;

/// Serve requests from `input` until EOF.
///
/// On EOF, waits for in-flight calls and flushes their responses.
pub async fn serve<E, R, W>(handler: Arc<Handler<E>>, input: R, output: W) -> std::io::Result<()>
where
    E: Executor + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(rx, output));

    let mut lines = input.lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request = match protocol::parse_line(line) {
            Ok(request) => request,
            Err(response) => {
                warn!("Rejected malformed message");
                let _ = tx.send(response.to_line());
                continue;
            }
        };

        let handler = Arc::clone(&handler);
        let tx = tx.clone();
        in_flight.spawn(async move {
            if let Some(response) = handler.handle(request).await {
                let _ = tx.send(response.to_line());
            }
        });

        // Reap finished calls so the set does not grow unbounded
        while in_flight.try_join_next().is_some() {}
    }

    debug!(pending = in_flight.len(), "Input closed, draining in-flight calls");
    while let Some(result) = in_flight.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Request task failed");
        }
    }

    drop(tx);
    writer.await.map_err(std::io::Error::other)?
}

async fn write_lines<W>(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut output: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    output.flush().await
}
