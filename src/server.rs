//! TCP listener and per-connection session spawning.
//!
//! Binds to the configured address, accepts connections in a cancellable
//! loop, and hands each accepted stream to its own [`Session`] task.
//! Sessions share only the immutable registry, the config, and the host
//! operations handle, so no locking is needed between them. One session's
//! failure closes only that connection; the accept loop keeps serving.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::config::GlobalConfig;
use crate::ops::HostOps;
use crate::registry::CommandRegistry;
use crate::session::Session;
use crate::{AppError, Result};

/// Bind the listener and spawn the accept-loop task.
///
/// Returns the bound local address (useful when the config requests an
/// ephemeral port) and the join handle of the accept loop. The loop runs
/// until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the listener cannot be bound.
pub async fn spawn_server(
    config: Arc<GlobalConfig>,
    ops: Arc<dyn HostOps>,
    ct: CancellationToken,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let bind_addr = config.socket_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Io(format!("failed to bind {bind_addr}: {err}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| AppError::Io(format!("failed to resolve local addr: {err}")))?;

    let registry = Arc::new(CommandRegistry::new());
    info!(addr = %local_addr, "command server listening");

    let handle = tokio::spawn(async move {
        let span = info_span!("command_server", addr = %local_addr);
        async move {
            loop {
                tokio::select! {
                    () = ct.cancelled() => {
                        info!("command server shutting down");
                        break;
                    }
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, peer)) => {
                                info!(%peer, "connection accepted");
                                let session = Session::new(
                                    stream,
                                    peer.to_string(),
                                    Arc::clone(&registry),
                                    Arc::clone(&ops),
                                    &config,
                                );
                                tokio::spawn(session.run());
                            }
                            Err(err) => {
                                warn!(%err, "accept failed");
                            }
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await;
    });

    Ok((local_addr, handle))
}
