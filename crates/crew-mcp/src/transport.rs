//! Newline-delimited JSON-RPC over a byte stream
//!
//! The read loop is strictly sequential: each line is fully handled, and
//! its response written, before the next line is read.

use crate::error::McpResult;
use crate::protocol::{McpResponse, McpRpcError};
use crate::server::McpServer;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One newline-terminated frame read from the stream
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Line(Vec<u8>),
    /// Line longer than the limit; its bytes were discarded
    Oversized(usize),
    Eof,
}

/// Serve `server` over `reader`/`writer` until EOF or cancellation.
///
/// Lines longer than `max_line_bytes` are skipped and answered with a parse
/// error. Only I/O failures on the stream end the session with an error.
pub async fn serve<R, W>(
    server: &McpServer,
    mut reader: R,
    mut writer: W,
    max_line_bytes: usize,
    cancel: &CancellationToken,
) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                info!("cancellation requested, leaving read loop");
                return Ok(());
            }
            frame = next_frame(&mut reader, max_line_bytes) => frame?,
        };

        let response = match frame {
            Frame::Eof => {
                debug!("input closed");
                return Ok(());
            }
            Frame::Oversized(size) => {
                warn!(size, limit = max_line_bytes, "discarding oversized message");
                Some(McpResponse::error(
                    None,
                    McpRpcError::parse_error()
                        .with_data(format!("message exceeds {} bytes", max_line_bytes)),
                ))
            }
            Frame::Line(bytes) => match String::from_utf8(bytes) {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => server.handle_line(line.trim(), cancel).await,
                Err(e) => Some(McpResponse::error(
                    None,
                    McpRpcError::parse_error().with_data(e.to_string()),
                )),
            },
        };

        if let Some(response) = response {
            write_response(&mut writer, &response).await?;
        }
    }
}

/// Serve over the process's stdin and stdout
pub async fn serve_stdio(
    server: &McpServer,
    max_line_bytes: usize,
    cancel: &CancellationToken,
) -> McpResult<()> {
    info!("starting stdio server");
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(server, reader, writer, max_line_bytes, cancel).await
}

async fn write_response<W>(writer: &mut W, response: &McpResponse) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Read up to the next `\n`, keeping at most `max` bytes in memory
async fn next_frame<R>(reader: &mut R, max: usize) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut total = 0usize;
    let mut oversized = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (total, oversized) {
                (0, _) => Frame::Eof,
                (_, true) => Frame::Oversized(total),
                (_, false) => Frame::Line(line),
            });
        }

        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(index) => (index + 1, true),
            None => (available.len(), false),
        };
        let chunk = if done { &available[..used - 1] } else { available };

        total += chunk.len();
        if total > max {
            if !oversized {
                oversized = true;
                line = Vec::new();
            }
        } else {
            line.extend_from_slice(chunk);
        }
        reader.consume(used);

        if done {
            return Ok(if oversized {
                Frame::Oversized(total)
            } else {
                Frame::Line(line)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_split_on_newline() {
        let mut reader: &[u8] = b"first\nsecond\nlast";
        assert_eq!(next_frame(&mut reader, 64).await.unwrap(), Frame::Line(b"first".to_vec()));
        assert_eq!(next_frame(&mut reader, 64).await.unwrap(), Frame::Line(b"second".to_vec()));
        assert_eq!(next_frame(&mut reader, 64).await.unwrap(), Frame::Line(b"last".to_vec()));
        assert_eq!(next_frame(&mut reader, 64).await.unwrap(), Frame::Eof);
    }

    #[tokio::test]
    async fn test_oversized_frame_is_skipped() {
        let mut reader: &[u8] = b"0123456789abcdef\nok\n";
        assert_eq!(next_frame(&mut reader, 8).await.unwrap(), Frame::Oversized(16));
        assert_eq!(next_frame(&mut reader, 8).await.unwrap(), Frame::Line(b"ok".to_vec()));
    }

    #[tokio::test]
    async fn test_oversized_across_buffer_refills() {
        let data = format!("{}\nnext\n", "x".repeat(100));
        let mut reader = BufReader::with_capacity(8, data.as_bytes());
        assert_eq!(next_frame(&mut reader, 32).await.unwrap(), Frame::Oversized(100));
        assert_eq!(next_frame(&mut reader, 32).await.unwrap(), Frame::Line(b"next".to_vec()));
    }
}
