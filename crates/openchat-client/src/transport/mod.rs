//! HTTP transport: the only layer that touches the wire format.
//!
//! - `http_client`: minimal async HTTP seam (reqwest in production, fakes in tests)
//! - `pipeline`: envelope encode -> bounded/cancellable call -> decrypt -> success contract

pub mod http_client;
pub mod pipeline;
pub mod reqwest_client;

pub use http_client::{HttpClient, HttpRequest, HttpResponse};
pub use pipeline::{RequestConfig, TransportPipeline};
pub use reqwest_client::ReqwestHttpClient;
