//! Error types for the sandbox module.

use std::path::PathBuf;

/// Errors produced by the sandbox layer.
///
/// Command execution never returns these; it reports failures inside a
/// [`CommandExecutionRecord`](super::CommandExecutionRecord). Only working
/// directory changes can fail.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("cannot change directory to {path:?}: {source}")]
    InvalidDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot change directory to {path:?}: not a directory")]
    NotADirectory { path: PathBuf },
}

/// Result type for sandbox operations.
pub type SandboxResult<T> = std::result::Result<T, SandboxError>;
