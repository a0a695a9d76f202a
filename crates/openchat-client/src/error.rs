//! Client error tiers.
//!
//! - Transport: the network call itself failed (connect, status, timeout).
//! - Cancelled: the caller's cancellation token fired.
//! - Rejected: the server answered with `code != 200`.
//!
//! Cipher failures never show up here; the codec fails open.

use std::time::Duration;

use openchat_core::OpenChatError;
use thiserror::Error;

/// Failure of the HTTP exchange, carried as-is from the HTTP seam.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request cancelled")]
    Cancelled,
    /// Business failure; displays as the server's message.
    #[error("{message}")]
    Rejected { code: i64, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Core(#[from] OpenChatError),
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Server-provided business code, if this is an envelope rejection.
    pub fn rejection_code(&self) -> Option<i64> {
        match self {
            ClientError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}
