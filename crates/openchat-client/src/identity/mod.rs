//! Device identity: memoized fingerprint + deterministic username.
//!
//! The resolver is an explicit context object. The engine and the resolved
//! identity each sit behind a `OnceCell`, so concurrent early callers wait on
//! the in-flight initialization instead of starting their own. A failed
//! initialization leaves the cell empty and the next caller retries.

pub mod engine;

use std::sync::Arc;

use tokio::sync::OnceCell;

use openchat_core::error::{OpenChatError, Result};
use openchat_core::Identity;

pub use engine::{FingerprintAgent, FingerprintEngine, HostFingerprintEngine, StaticFingerprintEngine};

pub struct IdentityResolver {
    engine: Arc<dyn FingerprintEngine>,
    agent: OnceCell<Arc<dyn FingerprintAgent>>,
    identity: OnceCell<Identity>,
}

impl IdentityResolver {
    pub fn new(engine: Arc<dyn FingerprintEngine>) -> Self {
        Self {
            engine,
            agent: OnceCell::new(),
            identity: OnceCell::new(),
        }
    }

    async fn agent(&self) -> Result<&Arc<dyn FingerprintAgent>> {
        self.agent
            .get_or_try_init(|| async {
                tracing::debug!("loading fingerprint engine");
                self.engine.load().await
            })
            .await
    }

    /// Resolve (once) and return the cached identity.
    pub async fn identity(&self) -> Result<&Identity> {
        self.identity
            .get_or_try_init(|| async {
                let agent = self.agent().await?;
                let fingerprint = agent.visitor_id().await?;
                let identity = Identity::from_fingerprint(fingerprint);
                tracing::info!(username = %identity.username, "identity resolved");
                Ok::<_, OpenChatError>(identity)
            })
            .await
    }

    pub async fn get_fingerprint(&self) -> Result<&str> {
        Ok(self.identity().await?.fingerprint.as_str())
    }

    pub async fn generate_username(&self) -> Result<&str> {
        Ok(self.identity().await?.username.as_str())
    }

    /// Identity if already resolved, without triggering resolution.
    pub fn cached(&self) -> Option<&Identity> {
        self.identity.get()
    }
}
