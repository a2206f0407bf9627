use std::path::PathBuf;

/// Core error type for the relay.
///
/// Adapter crates map their specific errors into this type so the pipeline can
/// decide per class: fatal at startup (`Config`), fall back to defaults
/// (`StorageUnavailable`), report to the admin (`StorageWrite`) or log and drop
/// (`Dispatch`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage unavailable: {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("storage write failed: {path}: {reason}")]
    StorageWrite { path: PathBuf, reason: String },

    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
