//! Generic HTTP client seam.
//!
//! The pipeline only needs "send this method/url/body, give me status and
//! bytes back"; everything else (TLS, pooling) belongs to the implementation.

use async_trait::async_trait;
use bytes::Bytes;

use openchat_core::protocol::Method;

use crate::error::TransportError;

/// A fully encoded outbound call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: String,
    /// JSON body; `None` for read calls.
    pub body: Option<Bytes>,
}

/// A minimal HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform one request. Dropping the returned future aborts the call.
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}
