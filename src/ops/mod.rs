//! Host operation abstraction.
//!
//! The [`HostOps`] trait decouples the session state machine from the
//! filesystem, process, and screen-capture calls a command ultimately
//! performs. The production implementation is [`LocalHost`]; tests
//! substitute their own implementations to script operation outcomes.

pub mod local;

use std::future::Future;
use std::pin::Pin;

pub use local::LocalHost;

use crate::Result;

/// Interface between the session state machine and the host environment.
///
/// Every method is one thin OS call; failures are reported as
/// [`AppError::Collaborator`](crate::AppError::Collaborator) carrying the
/// native error text, which the session relays to the client rather than
/// closing the connection.
pub trait HostOps: Send + Sync {
    /// List the files (not subdirectories) in `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collaborator`](crate::AppError::Collaborator) if
    /// the directory cannot be read.
    fn list_files(&self, path: &str) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send>>;

    /// Delete the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collaborator`](crate::AppError::Collaborator) if
    /// the file does not exist or cannot be removed.
    fn delete_file(&self, path: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    /// Copy the file at `src` to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collaborator`](crate::AppError::Collaborator) if
    /// the source cannot be read or the destination cannot be written.
    fn copy_file(&self, src: &str, dest: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    /// Run the program at `path` and wait for it to finish.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collaborator`](crate::AppError::Collaborator) if
    /// the program cannot be spawned or exits with a non-zero status.
    fn execute_program(&self, path: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    /// Capture a screenshot of the host display as raw image bytes.
    ///
    /// The session base64-encodes the bytes before framing; this method
    /// returns them untranslated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collaborator`](crate::AppError::Collaborator) if
    /// capture fails or is unsupported on this platform.
    fn capture_screenshot(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>>;
}
