//! Errors raised while talking to a remote API

use thiserror::Error;

/// Failure of a single API call.
///
/// Carries the requested URL and, when the server answered, the HTTP status so
/// callers can branch on the status without touching `reqwest` types.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),

    /// A header value contained characters HTTP does not allow
    #[error("invalid value for header {name}")]
    InvalidHeader { name: String },

    /// The request never produced a response
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The server answered 204 where a body was expected
    #[error("request to {url} returned no content")]
    NoContent { url: String },

    /// A JSON endpoint answered with some other media type
    #[error("received unexpected content type '{content_type}' from {url}")]
    UnexpectedContentType { url: String, content_type: String },

    /// The body could not be decoded into the expected shape
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RemoteError {
    /// HTTP status the server answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            RemoteError::NoContent { .. } => Some(204),
            RemoteError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            RemoteError::Transport { url, .. }
            | RemoteError::Status { url, .. }
            | RemoteError::NoContent { url }
            | RemoteError::UnexpectedContentType { url, .. }
            | RemoteError::Decode { url, .. } => Some(url),
            RemoteError::ClientInit(_) | RemoteError::InvalidHeader { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
