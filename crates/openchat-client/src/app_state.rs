//! Shared client state.
//!
//! Builds the pipeline, room API and identity resolver from one config.
//! Startup errors are returned, not panicked on.

use std::sync::Arc;

use openchat_core::error::Result;

use crate::api::ChatApi;
use crate::config::ClientConfig;
use crate::identity::{
    FingerprintEngine, HostFingerprintEngine, IdentityResolver, StaticFingerprintEngine,
};
use crate::longpoll::LongPollClient;
use crate::transport::{HttpClient, ReqwestHttpClient, TransportPipeline};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ClientConfig,
    api: ChatApi,
    identity: IdentityResolver,
}

impl AppState {
    /// Production wiring: reqwest transport, engine picked from `identity`.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let engine: Arc<dyn FingerprintEngine> = match &cfg.identity.fingerprint {
            Some(fp) => Arc::new(StaticFingerprintEngine::new(fp.clone())),
            None => Arc::new(HostFingerprintEngine::new()),
        };
        Self::with_parts(cfg, Arc::new(ReqwestHttpClient::new()), engine)
    }

    /// Wiring with injected transport and fingerprint engine.
    pub fn with_parts(
        cfg: ClientConfig,
        http: Arc<dyn HttpClient>,
        engine: Arc<dyn FingerprintEngine>,
    ) -> Result<Self> {
        cfg.validate()?;

        let codec = cfg.cipher.codec()?;
        let pipeline = Arc::new(
            TransportPipeline::new(&cfg.api.base_url, http, codec)
                .with_timeouts(cfg.api.request_timeout(), cfg.api.poll_grace()),
        );
        let poll = LongPollClient::new(Arc::clone(&pipeline))
            .with_default_timeout(cfg.poll.default_timeout_secs);
        let api = ChatApi::with_poll_client(pipeline, poll);

        tracing::debug!(base_url = %cfg.api.base_url, "client state ready");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                api,
                identity: IdentityResolver::new(engine),
            }),
        })
    }

    pub fn cfg(&self) -> &ClientConfig {
        &self.inner.cfg
    }

    pub fn api(&self) -> &ChatApi {
        &self.inner.api
    }

    pub fn identity(&self) -> &IdentityResolver {
        &self.inner.identity
    }
}
