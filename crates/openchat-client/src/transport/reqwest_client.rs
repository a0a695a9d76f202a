//! [`reqwest`]-backed implementation of [`HttpClient`].

use async_trait::async_trait;

use openchat_core::protocol::Method;

use super::{HttpClient, HttpRequest, HttpResponse};
use crate::error::TransportError;

#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Client without a global timeout; the pipeline bounds each call itself.
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match req.method {
            Method::Get => self.inner.get(&req.url),
            Method::Post => self.inner.post(&req.url),
        };
        if let Some(body) = req.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_connect() {
                TransportError::Connect(e.to_string())
            } else {
                TransportError::Http(e)
            }
        })?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;

        Ok(HttpResponse { status, body })
    }
}
