//! Error taxonomy for Clipper.
//!
//! No error here is fatal: every failure leaves the last good in-memory
//! document in place. Callers decide how to surface each variant.

use thiserror::Error;

/// Why a call to the remote mirror failed.
///
/// The variants are distinct so callers can tell "fix your token" apart
/// from "wait for the rate limit" and "the file does not exist yet".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFailure {
    #[error("no access token configured")]
    MissingToken,
    #[error("access token rejected (401)")]
    Unauthorized,
    #[error("repository or file not found (404)")]
    NotFound,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("permission denied (403): {0}")]
    Forbidden(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode remote content: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ClipperError {
    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("failed to fetch remote mirror: {0}")]
    RemoteFetch(RemoteFailure),

    #[error("failed to update remote mirror: {0}")]
    RemoteWrite(RemoteFailure),

    #[error("cache entry '{key}' is corrupt: {reason}")]
    CacheCorruption { key: String, reason: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = ClipperError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_fields() {
        let err = ClipperError::Validation {
            missing: vec!["title", "category"],
        };
        assert_eq!(err.to_string(), "missing required fields: title, category");
    }

    #[test]
    fn test_remote_write_carries_status() {
        let err = ClipperError::RemoteWrite(RemoteFailure::Status {
            status: 422,
            message: "sha mismatch".into(),
        });
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("sha mismatch"));
    }
}
