//! Normalized error taxonomy shared by every component.
//!
//! Providers speak their own status codes; everything that leaves a
//! provider, the downloader or the fingerprinter is one of these variants.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur anywhere in the subtitle pipeline.
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// Transport failure or timeout.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The provider accepted the request but has nothing for it.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad or expired credential, or a rate/quota limit.
    #[error("Authentication or quota failure ({provider}): {message}")]
    AuthOrQuotaFailure { provider: String, message: String },

    /// Provider-side fault, including status codes we do not know.
    #[error("Server failure ({provider}, code {code:?}): {message}")]
    ServerFailure {
        provider: String,
        code: Option<i64>,
        message: String,
    },

    /// Response did not match the expected schema.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The chooser cancelled the selection.
    #[error("Cancelled by user")]
    UserCancelled,

    /// Reading or writing a local file failed.
    #[error("Local I/O failure at {path}")]
    LocalIoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is too small to fingerprint.
    #[error("File too small to fingerprint: {size} bytes (need at least {minimum})")]
    TooSmall { size: u64, minimum: u64 },

    /// The caller asked for something the component cannot do.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Tag-only view of [`SubtitleError`], suitable for rendering and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkFailure,
    NotFound,
    AuthOrQuotaFailure,
    ServerFailure,
    MalformedResponse,
    UserCancelled,
    LocalIoFailure,
    TooSmall,
    InvalidRequest,
}

impl SubtitleError {
    /// Creates a local I/O failure for the given path.
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIoFailure {
            path: path.into(),
            source,
        }
    }

    /// Creates a server failure without a provider status code.
    pub fn server(provider: &str, message: impl Into<String>) -> Self {
        Self::ServerFailure {
            provider: provider.to_string(),
            code: None,
            message: message.into(),
        }
    }

    /// Creates an authentication/quota failure.
    pub fn auth(provider: &str, message: impl Into<String>) -> Self {
        Self::AuthOrQuotaFailure {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// The taxonomy tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkFailure(_) => ErrorKind::NetworkFailure,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AuthOrQuotaFailure { .. } => ErrorKind::AuthOrQuotaFailure,
            Self::ServerFailure { .. } => ErrorKind::ServerFailure,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::UserCancelled => ErrorKind::UserCancelled,
            Self::LocalIoFailure { .. } => ErrorKind::LocalIoFailure,
            Self::TooSmall { .. } => ErrorKind::TooSmall,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Whether resubmitting the same request could plausibly succeed.
    ///
    /// The core never retries on its own; this is input for caller policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure(_) | Self::ServerFailure { code: None, .. }
        )
    }
}
