//! Errors surfaced by the motor backend client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401. The session has already been cleared and
    /// the unauthorized handler notified by the time the caller sees this.
    #[error("not authorized: session cleared, log in again")]
    Unauthorized,

    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid endpoint path: {0}")]
    InvalidUrl(String),

    #[error("failed to persist session: {0}")]
    Session(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
