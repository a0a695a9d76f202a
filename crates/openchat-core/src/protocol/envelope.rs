//! Request/response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `code` value signalling business success.
pub const SUCCESS_CODE: i64 = 200;

/// Message used when a failed response carries none.
pub const DEFAULT_ERROR_MESSAGE: &str = "Error";

/// Outbound body wrapper: `{ "data": "<ciphertext>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    pub data: String,
}

impl Envelope {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

/// Inbound body: `{ "code": 200, "message"?: "...", "data"?: ... }`.
///
/// `data` is kept as a raw JSON value: on the wire it is ciphertext, after the
/// pipeline runs it is whatever the decrypted text parsed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(data: Option<Value>) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: None,
            data,
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// The message to surface for a failed response.
    pub fn error_message(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_ERROR_MESSAGE,
        }
    }

    /// True when `data` holds something worth decoding.
    pub fn has_payload(&self) -> bool {
        match &self.data {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// HTTP method of a logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Read call: parameters go to the query string, no body.
    #[default]
    Get,
    /// State-mutating call: body is always one [`Envelope`].
    Post,
}

impl Method {
    pub fn is_state_mutating(self) -> bool {
        matches!(self, Method::Post)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}
