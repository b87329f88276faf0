//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Malformed wire frame: non-numeric count/length field, oversized
    /// payload, or an argument payload that does not match its declaration.
    Framing(String),
    /// The peer closed the connection in the middle of a frame.
    ///
    /// Distinct from [`AppError::Io`]: a zero-byte read mid-frame is an
    /// end-of-stream signal from the peer, not a socket failure, and callers
    /// branch on it rather than treating it as a protocol violation.
    PeerDisconnected,
    /// Socket send/receive failure other than a clean disconnect.
    Io(String),
    /// A host operation (filesystem, process, screenshot) failed.
    ///
    /// Carries the native error text; recovered at the session layer and
    /// reported to the client instead of closing the connection.
    Collaborator(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Framing(msg) => write!(f, "framing: {msg}"),
            Self::PeerDisconnected => write!(f, "peer disconnected"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Collaborator(msg) => write!(f, "collaborator: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
