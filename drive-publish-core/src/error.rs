//! Error types for publishing.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`PublishError`], for callers that branch on
/// the kind of failure rather than its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthFailure,
    SessionCreationFailure,
    ChunkTransferFailure,
    MalformedResponse,
    LookupFailure,
    ShareLinkFailure,
    InvalidInput,
    Io,
    Transport,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("token exchange did not yield an access token (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("failed to create upload session for {path} (HTTP {status}): {body}")]
    SessionCreation {
        path: String,
        status: u16,
        body: String,
    },

    #[error("chunk upload failed for {path} (HTTP {status}): {body}")]
    ChunkTransfer {
        path: PathBuf,
        status: u16,
        body: String,
    },

    #[error("all chunks of {path} were sent but the server never signalled completion")]
    IncompleteTransfer { path: PathBuf },

    #[error("malformed response while {context}: {body}")]
    MalformedResponse { context: &'static str, body: String },

    #[error("failed to resolve item id for {path} (HTTP {status}): {body}")]
    Lookup {
        path: String,
        status: u16,
        body: String,
    },

    #[error("failed to create share link (HTTP {status}): {body}")]
    ShareLink { status: u16, body: String },

    #[error("invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(u64),

    #[error("local path has no usable file name: {0}")]
    InvalidLocalPath(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Auth { .. } => ErrorKind::AuthFailure,
            PublishError::SessionCreation { .. } => ErrorKind::SessionCreationFailure,
            PublishError::ChunkTransfer { .. } | PublishError::IncompleteTransfer { .. } => {
                ErrorKind::ChunkTransferFailure
            }
            PublishError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            PublishError::Lookup { .. } => ErrorKind::LookupFailure,
            PublishError::ShareLink { .. } => ErrorKind::ShareLinkFailure,
            PublishError::InvalidChunkSize(_) | PublishError::InvalidLocalPath(_) => {
                ErrorKind::InvalidInput
            }
            PublishError::Io { .. } => ErrorKind::Io,
            PublishError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Only an authentication failure stops the whole run; everything else
    /// is scoped to a single file or to the share step.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::AuthFailure
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for publishing operations.
pub type Result<T> = std::result::Result<T, PublishError>;
