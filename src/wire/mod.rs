//! Wire protocol: framing and frame I/O over a byte stream.
//!
//! TCP provides no message boundaries, so every exchange travels as a
//! self-describing frame:
//!
//! ```text
//! ┌──────────────┬───┬──────────────┬───┬─────────────────────┐
//! │ expect       │ $ │ length       │ $ │ payload             │
//! │ ASCII digits │   │ ASCII digits │   │ exactly length bytes│
//! └──────────────┴───┴──────────────┴───┴─────────────────────┘
//! ```
//!
//! The `expect` field is the further-payload count: a server prompt with
//! `expect = 2` tells the client that two argument values must follow before
//! the command is dispatched; `expect = 0` marks a final response. The plain
//! `length$payload` layout (no count field) is retained for simple bodies
//! and selectable at codec construction.
//!
//! Binary results (screenshot bytes) are base64-encoded before framing so
//! the wire stays textual end to end.

pub mod frame;

pub use frame::{Frame, FrameCodec, DEFAULT_MAX_FRAME_BYTES, FIELD_DELIMITER};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

use crate::Result;

/// Encode `frame` and write it to `writer`, flushing when done.
///
/// `write_all` retries partial writes until every byte is on the wire; a
/// partial write is never reported as success.
///
/// # Errors
///
/// Returns [`AppError::Framing`](crate::AppError::Framing) if the payload
/// exceeds the codec's size limit, or [`AppError::Io`](crate::AppError::Io)
/// if the underlying write or flush fails.
pub async fn write_frame<W>(writer: &mut W, codec: &mut FrameCodec, frame: Frame) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut buf = bytes::BytesMut::new();
    codec.encode(frame, &mut buf)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}
