//! Host operations backed by the local filesystem and process table.
//!
//! Directory listing runs the `glob` crate through `spawn_blocking` (glob is
//! synchronous I/O); file operations use `tokio::fs`; program execution and
//! screenshot capture spawn child processes via `tokio::process`.

use std::future::Future;
#[cfg(unix)]
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::process::Command;
#[cfg(unix)]
use tracing::debug;
#[cfg(unix)]
use uuid::Uuid;

use crate::ops::HostOps;
use crate::{AppError, Result};

/// Production [`HostOps`] implementation operating on the server's host.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHost;

impl LocalHost {
    /// Create a new local host adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HostOps for LocalHost {
    fn list_files(&self, path: &str) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send>> {
        // Non-recursive; entries without an extension dot are not matched.
        let pattern = format!("{}/*.*", path.trim_end_matches('/'));

        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let entries = glob::glob(&pattern)
                    .map_err(|e| AppError::Collaborator(format!("invalid listing pattern: {e}")))?;

                let mut files = Vec::new();
                for entry in entries {
                    let path = entry.map_err(|e| AppError::Collaborator(e.to_string()))?;
                    files.push(path.to_string_lossy().into_owned());
                }
                files.sort();
                Ok(files)
            })
            .await
            .map_err(|e| AppError::Collaborator(format!("listing task panicked: {e}")))?
        })
    }

    fn delete_file(&self, path: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        let path = path.to_owned();
        Box::pin(async move {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Collaborator(format!("cannot delete '{path}': {e}")))
        })
    }

    fn copy_file(&self, src: &str, dest: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        let src = src.to_owned();
        let dest = dest.to_owned();
        Box::pin(async move {
            tokio::fs::copy(&src, &dest)
                .await
                .map(|_| ())
                .map_err(|e| {
                    AppError::Collaborator(format!("cannot copy '{src}' to '{dest}': {e}"))
                })
        })
    }

    fn execute_program(&self, path: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        let path = path.to_owned();
        Box::pin(async move {
            let status = Command::new(&path)
                .status()
                .await
                .map_err(|e| AppError::Collaborator(format!("cannot execute '{path}': {e}")))?;

            if status.success() {
                Ok(())
            } else {
                Err(AppError::Collaborator(format!(
                    "'{path}' exited with {status}"
                )))
            }
        })
    }

    fn capture_screenshot(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>> {
        Box::pin(async move {
            #[cfg(unix)]
            {
                let target =
                    std::env::temp_dir().join(format!("teleshell-{}.png", Uuid::new_v4()));
                capture_to_file(&target).await?;

                let bytes = tokio::fs::read(&target)
                    .await
                    .map_err(|e| AppError::Collaborator(format!("cannot read capture: {e}")))?;

                if let Err(e) = tokio::fs::remove_file(&target).await {
                    debug!(path = %target.display(), error = %e, "capture temp file not removed");
                }

                Ok(bytes)
            }

            #[cfg(not(unix))]
            {
                Err(AppError::Collaborator(
                    "screenshot capture is not supported on this platform".into(),
                ))
            }
        })
    }
}

// ── Platform capture helpers ──────────────────────────────────────────────────

/// Run the platform screenshot utility, writing the image to `target`.
#[cfg(unix)]
async fn capture_to_file(target: &Path) -> Result<()> {
    let (program, args) = capture_command(target);

    let status = Command::new(program)
        .args(&args)
        .status()
        .await
        .map_err(|e| AppError::Collaborator(format!("cannot run '{program}': {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(AppError::Collaborator(format!(
            "'{program}' exited with {status}"
        )))
    }
}

/// Screenshot utility and arguments for macOS.
#[cfg(target_os = "macos")]
fn capture_command(target: &Path) -> (&'static str, Vec<PathBuf>) {
    ("screencapture", vec![PathBuf::from("-x"), target.to_path_buf()])
}

/// Screenshot utility and arguments for other unix platforms.
#[cfg(all(unix, not(target_os = "macos")))]
fn capture_command(target: &Path) -> (&'static str, Vec<PathBuf>) {
    ("scrot", vec![target.to_path_buf()])
}
