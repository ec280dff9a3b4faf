//! `Content-Length` framing for JSON-RPC messages.
//!
//! Every message is preceded by a header block:
//!
//! ```text
//! Content-Length: 42\r\n
//! \r\n
//! {"jsonrpc":"2.0","id":1,"method":"ping"}
//! ```
//!
//! Other header lines are ignored. Both sides of the session use the same
//! reader and writer, over child stdio or an in-memory duplex stream.

use super::error::{Result, SessionError};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Upper bound on a single frame body.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Reads framed message bodies from a buffered byte stream.
pub struct FrameReader<R> {
    reader: R,
    line: String,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    /// Read the next frame body.
    ///
    /// Returns `Ok(None)` on a clean end of stream between frames.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(content_length) = self.read_content_length().await? else {
            return Ok(None);
        };

        // Skip remaining headers up to the blank separator line
        loop {
            self.line.clear();
            let bytes_read = self.reader.read_line(&mut self.line).await?;
            if bytes_read == 0 {
                return Err(SessionError::TransportClosed);
            }
            if self.line.trim().is_empty() {
                break;
            }
        }

        let mut body = vec![0u8; content_length];
        self.reader.read_exact(&mut body).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                SessionError::TransportClosed
            } else {
                SessionError::Io(e)
            }
        })?;

        trace!("Frame received: {}", String::from_utf8_lossy(&body));
        Ok(Some(body))
    }

    /// Read header lines until a `Content-Length` value is found.
    async fn read_content_length(&mut self) -> Result<Option<usize>> {
        loop {
            self.line.clear();
            let bytes_read = self.reader.read_line(&mut self.line).await?;
            if bytes_read == 0 {
                return Ok(None);
            }

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some((name, value)) = trimmed.split_once(':') else {
                return Err(SessionError::InvalidFrame(format!(
                    "malformed header line: {}",
                    trimmed
                )));
            };
            if !name.trim().eq_ignore_ascii_case("Content-Length") {
                trace!("Ignoring header: {}", trimmed);
                continue;
            }

            let len: usize = value.trim().parse().map_err(|_| {
                SessionError::InvalidFrame(format!("bad Content-Length: {}", value.trim()))
            })?;
            if len > MAX_FRAME_LEN {
                return Err(SessionError::InvalidFrame(format!(
                    "frame of {} bytes exceeds limit",
                    len
                )));
            }
            return Ok(Some(len));
        }
    }
}

/// Write one framed body and flush.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, body: &[u8]) -> Result<()> {
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Serialize a message as JSON and write it as one frame.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(message)?;
    trace!("Frame sending: {}", json);
    write_frame(writer, json.as_bytes()).await
}
