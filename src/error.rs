//! Error types for the dispatch runtime.

use thiserror::Error;

/// Result type alias for hookshot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the hook and dispatch pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The hook backend refused to install.
    #[error("failed to install hook: {0}")]
    HookInstallFailed(String),

    /// The hook backend refused to uninstall.
    #[error("failed to uninstall hook: {0}")]
    HookUninstallFailed(String),

    /// The dispatcher was unloaded and must be loaded again before starting.
    #[error("hook is not loaded")]
    NotLoaded,

    /// A shortcut definition was rejected.
    #[error("invalid shortcut: {0}")]
    InvalidShortcut(String),

    /// The backend does not support the requested operation.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),

    /// I/O failure while reading or writing a recording.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A recording could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Other errors.
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "recorder")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
