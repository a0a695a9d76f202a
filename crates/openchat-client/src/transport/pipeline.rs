//! Transport pipeline.
//!
//! Outbound: POST bodies become exactly one `{ "data": ciphertext }` envelope;
//! GET parameters become an explicit query string.
//! Inbound: decrypt `data`, then `code != 200` turns into a rejection.
//!
//! Network failures and cancellation are not wrapped into business errors, so
//! callers can always tell the three tiers apart.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use openchat_core::cipher::CipherCodec;
use openchat_core::protocol::{append_query, Envelope, Method, ResponseEnvelope};
use openchat_core::OpenChatError;

use super::{HttpClient, HttpRequest, HttpResponse};
use crate::error::{ClientError, TransportError};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(15000);
const DEFAULT_POLL_GRACE: Duration = Duration::from_millis(5000);

/// One logical call.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Endpoint path relative to the API prefix, e.g. `/room/info`.
    pub url: String,
    pub method: Method,
    /// POST payload (encrypted). For GET, an object here is used as params
    /// when `params` is empty.
    pub data: Option<Value>,
    /// GET params, in order.
    pub params: Vec<(String, Value)>,
    pub signal: Option<CancellationToken>,
    /// Declared server hold time for long polls.
    pub timeout_secs: Option<u64>,
}

impl RequestConfig {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            ..Self::default()
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            ..Self::default()
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.push((key.into(), value));
        self
    }

    pub fn signal(mut self, token: Option<CancellationToken>) -> Self {
        self.signal = token;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

pub struct TransportPipeline {
    base_url: String,
    http: Arc<dyn HttpClient>,
    codec: CipherCodec,
    request_timeout: Duration,
    poll_grace: Duration,
}

impl TransportPipeline {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>, codec: CipherCodec) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            codec,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_grace: DEFAULT_POLL_GRACE,
        }
    }

    pub fn with_timeouts(mut self, request_timeout: Duration, poll_grace: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.poll_grace = poll_grace;
        self
    }

    pub fn codec(&self) -> &CipherCodec {
        &self.codec
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client-side bound for a call. A long poll is never cut shorter than
    /// its declared hold time plus grace.
    pub fn deadline(&self, timeout_secs: Option<u64>) -> Duration {
        match timeout_secs {
            Some(secs) => self
                .request_timeout
                .max(Duration::from_secs(secs).saturating_add(self.poll_grace)),
            None => self.request_timeout,
        }
    }

    /// Build the wire request for `cfg`.
    pub fn encode_request(&self, cfg: &RequestConfig) -> Result<HttpRequest, ClientError> {
        let path = format!("{}{}", self.base_url, cfg.url);

        match cfg.method {
            Method::Post => {
                let plain = match &cfg.data {
                    None | Some(Value::Null) => "{}".to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                let envelope = Envelope::new(self.codec.encrypt_text(&plain));
                let body = serde_json::to_vec(&envelope)
                    .map_err(|e| OpenChatError::Internal(format!("encode envelope: {e}")))?;
                Ok(HttpRequest {
                    method: Method::Post,
                    url: path,
                    body: Some(Bytes::from(body)),
                })
            }
            Method::Get => {
                let url = if cfg.params.is_empty() {
                    match &cfg.data {
                        Some(Value::Object(map)) => {
                            append_query(&path, map.iter().map(|(k, v)| (k.as_str(), v.clone())))
                        }
                        _ => path,
                    }
                } else {
                    append_query(&path, cfg.params.iter().map(|(k, v)| (k.as_str(), v.clone())))
                };
                Ok(HttpRequest {
                    method: Method::Get,
                    url,
                    body: None,
                })
            }
        }
    }

    /// Apply the inbound rules to a raw HTTP response.
    pub fn decode_response(&self, resp: HttpResponse) -> Result<ResponseEnvelope, ClientError> {
        if !resp.is_success() {
            return Err(TransportError::Status {
                status: resp.status,
                body: String::from_utf8_lossy(&resp.body).into_owned(),
            }
            .into());
        }

        let mut env: ResponseEnvelope = serde_json::from_slice(&resp.body)
            .map_err(|e| ClientError::MalformedResponse(format!("invalid envelope json: {e}")))?;

        if env.has_payload() {
            env.data = env.data.as_ref().map(|d| self.codec.decrypt(d));
        }

        if !env.is_success() {
            tracing::warn!(code = env.code, reason = env.error_message(), "request rejected");
            return Err(ClientError::Rejected {
                code: env.code,
                message: env.error_message().to_string(),
            });
        }

        Ok(env)
    }

    /// Perform one call: encode, send (bounded, cancellable), decode.
    pub async fn request(&self, cfg: RequestConfig) -> Result<ResponseEnvelope, ClientError> {
        let req = self.encode_request(&cfg)?;
        let limit = self.deadline(cfg.timeout_secs);

        tracing::debug!(
            endpoint = %cfg.url,
            method = cfg.method.as_str(),
            limit_ms = limit.as_millis() as u64,
            "outbound call"
        );

        let call = tokio::time::timeout(limit, self.http.execute(req));
        let outcome = match &cfg.signal {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(endpoint = %cfg.url, "call cancelled");
                        return Err(ClientError::Cancelled);
                    }
                    r = call => r,
                }
            }
            None => call.await,
        };

        let resp = outcome.map_err(|_| TransportError::TimedOut(limit))??;
        self.decode_response(resp)
    }

    /// Like [`request`](Self::request), decoding `data` into `T`.
    /// Returns `None` when the server sent no payload.
    pub async fn call<T: DeserializeOwned>(
        &self,
        cfg: RequestConfig,
    ) -> Result<Option<T>, ClientError> {
        let endpoint = cfg.url.clone();
        let env = self.request(cfg).await?;
        match env.data {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(v) => serde_json::from_value(v).map(Some).map_err(|e| {
                ClientError::MalformedResponse(format!("{endpoint}: unexpected payload: {e}"))
            }),
        }
    }
}
