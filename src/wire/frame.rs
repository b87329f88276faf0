//! `$`-delimited, length-prefixed frame codec.
//!
//! Implements [`tokio_util::codec::Decoder`] and [`Encoder`] for the wire
//! frame format, with a configurable maximum payload size to prevent memory
//! exhaustion caused by a malicious or corrupted length field.
//!
//! # Usage
//!
//! Use [`FrameCodec`] as the codec parameter for
//! [`tokio_util::codec::FramedRead`] (inbound); outbound frames are encoded
//! into a [`BytesMut`] and written with `write_all`, which retries partial
//! writes until the whole frame is flushed.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{AppError, Result};

/// Separator byte between frame header fields.
///
/// Header fields are ASCII digit runs and never contain the delimiter;
/// the payload may, since it is read by exact byte count.
pub const FIELD_DELIMITER: u8 = b'$';

/// Maximum number of digits accepted in a single header field.
///
/// A digit run longer than this cannot describe a frame the codec would
/// accept anyway, so it is rejected as a framing error before the delimiter
/// ever arrives.
pub const MAX_FIELD_DIGITS: usize = 10;

/// Default maximum payload size accepted by the codec: 1 MiB.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1_048_576;

/// One decoded unit of wire data.
///
/// `expect` carries the frame's further-payload count: on server frames it is
/// the number of argument values the server still needs (0 = this payload is
/// the final content); on client frames it is the number of `$`-joined values
/// carried in the payload when answering a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Further-payload count declared by the sender.
    pub expect: usize,
    /// Raw payload bytes, exactly as long as the declared length field.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build a frame from a count and any byte-like payload.
    pub fn new(expect: usize, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            expect,
            payload: payload.into(),
        }
    }

    /// View the payload as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Framing`] if the payload is not valid UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| AppError::Framing(format!("payload is not valid utf-8: {e}")))
    }
}

/// Header layout variants that appear in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `expect$length$payload` — the canonical two-field frame.
    Tagged,
    /// `length$payload` — simple bodies with no follow-up semantics.
    Plain,
}

/// Codec for `$`-delimited, length-prefixed frames.
///
/// # Decoder
///
/// Scans buffered bytes for the header fields (digit runs terminated by
/// [`FIELD_DELIMITER`]), then takes exactly `length` payload bytes. Returns
/// `Ok(None)` while the buffer holds only a partial frame. Non-digit header
/// bytes, over-long digit runs, and lengths above the configured maximum
/// yield [`AppError::Framing`]. EOF with a partial frame buffered yields
/// [`AppError::PeerDisconnected`] from [`Decoder::decode_eof`]; EOF at a
/// frame boundary is a clean end of stream.
///
/// # Encoder
///
/// Renders the header as ASCII decimal fields followed by the raw payload
/// bytes. The size limit applies to both directions.
#[derive(Debug)]
pub struct FrameCodec {
    layout: Layout,
    max_frame_bytes: usize,
}

impl FrameCodec {
    /// Codec for the canonical `expect$length$payload` frame.
    #[must_use]
    pub fn tagged() -> Self {
        Self {
            layout: Layout::Tagged,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Codec for the `length$payload` frame without a count field.
    ///
    /// Decoded frames report `expect == 0`.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            layout: Layout::Plain,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Replace the maximum accepted payload size.
    #[must_use]
    pub fn with_max_frame_bytes(mut self, limit: usize) -> Self {
        self.max_frame_bytes = limit;
        self
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::tagged()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let mut pos = 0;

        let expect = match self.layout {
            Layout::Tagged => match read_header_field(src, &mut pos)? {
                Some(value) => value,
                None => return Ok(None),
            },
            Layout::Plain => 0,
        };

        let Some(length) = read_header_field(src, &mut pos)? else {
            return Ok(None);
        };

        if length > self.max_frame_bytes {
            return Err(AppError::Framing(format!(
                "declared payload length {length} exceeds limit {}",
                self.max_frame_bytes
            )));
        }

        if src.len() < pos + length {
            // Partial payload; reserve up front so the read loop fills it
            // without repeated reallocation.
            src.reserve(pos + length - src.len());
            return Ok(None);
        }

        src.advance(pos);
        let payload = src.split_to(length).to_vec();
        Ok(Some(Frame { expect, payload }))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(AppError::PeerDisconnected),
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = AppError;

    /// Encode `item` as `expect$length$payload` (or `length$payload` in
    /// plain layout) into `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Framing`] if the payload exceeds the size limit.
    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        if item.payload.len() > self.max_frame_bytes {
            return Err(AppError::Framing(format!(
                "payload of {} bytes exceeds limit {}",
                item.payload.len(),
                self.max_frame_bytes
            )));
        }

        let header = match self.layout {
            Layout::Tagged => format!("{}${}$", item.expect, item.payload.len()),
            Layout::Plain => format!("{}$", item.payload.len()),
        };

        dst.reserve(header.len() + item.payload.len());
        dst.extend_from_slice(header.as_bytes());
        dst.extend_from_slice(&item.payload);
        Ok(())
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Read one numeric header field from `src` starting at `*pos`.
///
/// On success advances `*pos` past the terminating delimiter and returns the
/// parsed value. Returns `Ok(None)` when the buffer ends before the delimiter
/// (incomplete frame, unless the digit run is already over-long).
fn read_header_field(src: &BytesMut, pos: &mut usize) -> Result<Option<usize>> {
    let start = *pos;

    for (offset, &byte) in src[start..].iter().enumerate() {
        match byte {
            FIELD_DELIMITER if offset == 0 => {
                return Err(AppError::Framing("empty numeric header field".into()));
            }
            FIELD_DELIMITER => {
                let digits = &src[start..start + offset];
                // Every byte before the delimiter was an ASCII digit.
                let text = std::str::from_utf8(digits)
                    .map_err(|e| AppError::Framing(format!("header field is not utf-8: {e}")))?;
                let value = text.parse::<usize>().map_err(|e| {
                    AppError::Framing(format!("header field '{text}' is not a number: {e}"))
                })?;
                *pos = start + offset + 1;
                return Ok(Some(value));
            }
            b'0'..=b'9' if offset >= MAX_FIELD_DIGITS => {
                return Err(AppError::Framing(format!(
                    "numeric header field longer than {MAX_FIELD_DIGITS} digits"
                )));
            }
            b'0'..=b'9' => {}
            other => {
                return Err(AppError::Framing(format!(
                    "non-numeric byte {other:#04x} in frame header"
                )));
            }
        }
    }

    Ok(None)
}
