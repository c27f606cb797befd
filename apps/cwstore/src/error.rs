//! # Application Errors
//!
//! Everything the CLI can fail on. Store failures are wrapped unchanged.

use cwstore_core::CwstoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] CwstoreError),

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path '{}' is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: toml::de::Error,
    },

    /// The knowledge file parsed but describes an invalid store.
    #[error("invalid knowledge: {0}")]
    InvalidKnowledge(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown point '{0}'")]
    UnknownPoint(String),

    #[error("no '{label}' link from '{from}' to '{to}'")]
    MissingLink {
        label: String,
        from: String,
        to: String,
    },

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
