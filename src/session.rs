//! Session state machine for one accepted connection.
//!
//! Drives the connection end to end: receive a command, solicit missing
//! arguments, dispatch to the host operation, send the result, and decide
//! whether the connection stays open. All channel operations are sequential
//! awaits — a send completes or fails before the next receive is attempted;
//! there is no pipelining on one connection.
//!
//! # States
//!
//! ```text
//! AwaitingCommand ──unknown──────────────► AwaitingCommand  (reply sent)
//!       │ ──EXIT────────────────────────► Closed           (GOODBYE sent)
//!       │ ──arity 0───────► Dispatching ─► AwaitingCommand
//!       └ ──arity n───────► AwaitingArguments(n)
//!                                │ ──n values received──► Dispatching
//!                                └ ──mismatch/disconnect► Closed
//! ```
//!
//! Operation failures are recovered into an `ERROR: …` reply and the session
//! stays open; framing violations, peer disconnects, and send failures close
//! it. The session owns both halves of its stream, so the connection is
//! released on every exit path.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::config::GlobalConfig;
use crate::ops::HostOps;
use crate::registry::{CommandKind, CommandRegistry, CommandSpec, UNKNOWN_COMMAND};
use crate::wire::{self, Frame, FrameCodec, FIELD_DELIMITER};
use crate::{AppError, Result};

/// Why a session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client sent `EXIT` and the session closed after the farewell.
    Exit,
    /// The peer closed the connection, cleanly or mid-frame.
    PeerDisconnected,
    /// The peer violated the framing protocol.
    ProtocolError,
    /// A socket send or receive failed.
    IoError,
}

impl From<&AppError> for CloseReason {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::PeerDisconnected => Self::PeerDisconnected,
            AppError::Framing(_) => Self::ProtocolError,
            _ => Self::IoError,
        }
    }
}

/// One accepted connection, from accept to close.
///
/// Owns its framed reader and write half exclusively; the only state carried
/// between exchanges is the pending-arity counter implicit in the control
/// flow of [`Session::run`].
pub struct Session<S> {
    frames: FramedRead<ReadHalf<S>, FrameCodec>,
    writer: WriteHalf<S>,
    encoder: FrameCodec,
    registry: Arc<CommandRegistry>,
    ops: Arc<dyn HostOps>,
    idle_timeout: Option<Duration>,
    peer: String,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an accepted stream in a session.
    ///
    /// `peer` is a display label for log lines (the remote address for TCP).
    #[must_use]
    pub fn new(
        stream: S,
        peer: String,
        registry: Arc<CommandRegistry>,
        ops: Arc<dyn HostOps>,
        config: &GlobalConfig,
    ) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        let decoder = FrameCodec::tagged().with_max_frame_bytes(config.max_frame_bytes);
        let encoder = FrameCodec::tagged().with_max_frame_bytes(config.max_frame_bytes);

        Self {
            frames: FramedRead::new(read_half, decoder),
            writer: write_half,
            encoder,
            registry,
            ops,
            idle_timeout: config.idle_timeout(),
            peer,
        }
    }

    /// Drive the session until it closes, returning why it ended.
    ///
    /// Never returns an error: every failure mode resolves to a
    /// [`CloseReason`], is logged, and drops the connection.
    pub async fn run(mut self) -> CloseReason {
        let reason = match self.drive().await {
            Ok(reason) => reason,
            Err(err) => {
                let reason = CloseReason::from(&err);
                match reason {
                    CloseReason::PeerDisconnected => {
                        info!(peer = %self.peer, "peer disconnected mid-frame");
                    }
                    CloseReason::ProtocolError => {
                        warn!(peer = %self.peer, error = %err, "protocol violation");
                    }
                    _ => {
                        warn!(peer = %self.peer, error = %err, "session io failure");
                    }
                }
                reason
            }
        };

        info!(peer = %self.peer, ?reason, "session closed");
        reason
    }

    /// The main receive/dispatch loop; errors bubble to [`Session::run`].
    async fn drive(&mut self) -> Result<CloseReason> {
        loop {
            let Some(frame) = self.next_frame().await? else {
                return Ok(CloseReason::PeerDisconnected);
            };

            let command = frame.text()?.to_uppercase();
            debug!(peer = %self.peer, command = %command, "command received");

            let Some(spec) = self.registry.lookup(&command).copied() else {
                info!(peer = %self.peer, command = %command, "unknown command");
                self.send(0, UNKNOWN_COMMAND.as_bytes()).await?;
                continue;
            };

            if spec.kind == CommandKind::Exit {
                // The farewell is a best-effort courtesy; the session closes
                // whether or not it reaches the peer.
                if let Some(ack) = spec.ack {
                    if let Err(err) = self.send(0, ack.as_bytes()).await {
                        debug!(peer = %self.peer, error = %err, "farewell not delivered");
                    }
                }
                return Ok(CloseReason::Exit);
            }

            let args = self.solicit_arguments(&spec).await?;
            self.dispatch(&spec, &args).await?;
        }
    }

    /// Prompt for and receive the command's arguments.
    ///
    /// Arguments arrive as a single `$`-joined payload whose declared count
    /// and actual value count must both equal the command's arity.
    async fn solicit_arguments(&mut self, spec: &CommandSpec) -> Result<Vec<String>> {
        let Some(prompt) = spec.prompt else {
            return Ok(Vec::new());
        };

        self.send(spec.arity, prompt.as_bytes()).await?;

        let Some(frame) = self.next_frame().await? else {
            return Err(AppError::PeerDisconnected);
        };

        if frame.expect != spec.arity {
            return Err(AppError::Framing(format!(
                "argument frame declared {} value(s), {} expects {}",
                frame.expect, spec.name, spec.arity
            )));
        }

        let values: Vec<String> = frame
            .text()?
            .split(char::from(FIELD_DELIMITER))
            .map(str::to_owned)
            .collect();

        if values.len() != spec.arity {
            return Err(AppError::Framing(format!(
                "received {} argument value(s), {} expects {}",
                values.len(),
                spec.name,
                spec.arity
            )));
        }

        Ok(values)
    }

    /// Invoke the host operation and reply.
    ///
    /// Operation failures become an `ERROR: …` reply and the session stays
    /// open; only a failed send propagates.
    async fn dispatch(&mut self, spec: &CommandSpec, args: &[String]) -> Result<()> {
        match self.invoke(spec, args).await {
            Ok(reply) => self.send(0, &reply).await,
            Err(AppError::Collaborator(msg)) => {
                warn!(peer = %self.peer, command = spec.name, error = %msg, "operation failed");
                self.send(0, format!("ERROR: {msg}").as_bytes()).await
            }
            Err(other) => Err(other),
        }
    }

    /// Run the operation behind `spec` and render its success reply.
    async fn invoke(&self, spec: &CommandSpec, args: &[String]) -> Result<Vec<u8>> {
        let reply = match spec.kind {
            CommandKind::ListDir => {
                let files = self.ops.list_files(&args[0]).await?;
                files.join("\n").into_bytes()
            }
            CommandKind::Delete => {
                self.ops.delete_file(&args[0]).await?;
                fixed_ack(spec)
            }
            CommandKind::Copy => {
                self.ops.copy_file(&args[0], &args[1]).await?;
                fixed_ack(spec)
            }
            CommandKind::Execute => {
                self.ops.execute_program(&args[0]).await?;
                fixed_ack(spec)
            }
            CommandKind::Screenshot => {
                let image = self.ops.capture_screenshot().await?;
                BASE64.encode(image).into_bytes()
            }
            // EXIT never reaches dispatch; handled in the command loop.
            CommandKind::Exit => fixed_ack(spec),
        };

        Ok(reply)
    }

    /// Receive the next frame, honoring the optional per-read deadline.
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        let item = match self.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.frames.next()).await {
                Ok(item) => item,
                Err(_) => return Err(AppError::Io("read deadline elapsed".into())),
            },
            None => self.frames.next().await,
        };

        item.transpose()
    }

    /// Frame and send one payload with the given further-payload count.
    async fn send(&mut self, expect: usize, payload: &[u8]) -> Result<()> {
        wire::write_frame(&mut self.writer, &mut self.encoder, Frame::new(expect, payload)).await
    }
}

/// The command's fixed acknowledgement string as reply bytes.
fn fixed_ack(spec: &CommandSpec) -> Vec<u8> {
    spec.ack.unwrap_or_default().as_bytes().to_vec()
}
