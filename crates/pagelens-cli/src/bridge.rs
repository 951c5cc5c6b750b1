//! `pagelens background`: the background service over stdin/stdout.
//!
//! Each input line is one request envelope, e.g.
//! `{"action":"getSummary","text":"…","model":"gpt-4"}`; each output line is
//! the matching `{"success":…}` response. Lines are answered in order.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use pagelens_core::config::Config;
use pagelens_popup::Background;

/// Serve until stdin closes.
pub async fn run(config: &Config) -> Result<()> {
    let background = Background::from_config(config);
    serve(&background, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

async fn serve<R, W>(background: &Background, reader: R, mut writer: W) -> Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(bytes = line.len(), "Request received");

        let mut reply = background.handle_json(line).await;
        reply.push('\n');
        writer
            .write_all(reply.as_bytes())
            .await
            .context("failed to write response")?;
        writer.flush().await.context("failed to flush response")?;
    }
    Ok(())
}
