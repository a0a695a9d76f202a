//! Shared error type across openchat crates.

use thiserror::Error;

/// Stable error codes (safe to log or show to users).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Cipher failure (bad key, bad ciphertext, bad padding).
    Cipher,
    /// Configuration rejected by validation.
    InvalidConfig,
    /// Unsupported config or protocol version.
    UnsupportedVersion,
    /// Fingerprint engine could not produce an identifier.
    Fingerprint,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Cipher => "CIPHER",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Fingerprint => "FINGERPRINT",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, OpenChatError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum OpenChatError {
    #[error("cipher: {0}")]
    Cipher(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("fingerprint: {0}")]
    Fingerprint(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl OpenChatError {
    /// Map error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            OpenChatError::Cipher(_) => ErrorCode::Cipher,
            OpenChatError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            OpenChatError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            OpenChatError::Fingerprint(_) => ErrorCode::Fingerprint,
            OpenChatError::Internal(_) => ErrorCode::Internal,
        }
    }
}
