//! Fingerprint engines.
//!
//! An engine is loaded once and hands out an agent; the agent computes the
//! visitor id. Both steps are async so browser-style engines fit the same seam.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use openchat_core::error::{OpenChatError, Result};

/// Visitor ids are 32 lowercase hex characters.
const VISITOR_ID_BYTES: usize = 16;

#[async_trait]
pub trait FingerprintEngine: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn FingerprintAgent>>;
}

#[async_trait]
pub trait FingerprintAgent: Send + Sync {
    async fn visitor_id(&self) -> Result<String>;
}

/// Derives a stable id from host properties (host name, user, OS, arch).
#[derive(Debug, Clone, Default)]
pub struct HostFingerprintEngine {
    salt: Option<String>,
}

impl HostFingerprintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mix an extra component in (e.g. a profile name) to split identities.
    pub fn with_salt(salt: impl Into<String>) -> Self {
        Self {
            salt: Some(salt.into()),
        }
    }
}

#[async_trait]
impl FingerprintEngine for HostFingerprintEngine {
    async fn load(&self) -> Result<Arc<dyn FingerprintAgent>> {
        let mut components = Vec::new();

        let host = match env_first(&["HOSTNAME", "COMPUTERNAME"]) {
            Some(h) => Some(h),
            None => tokio::fs::read_to_string("/etc/hostname")
                .await
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };
        components.push(("host", host.unwrap_or_default()));
        components.push(("user", env_first(&["USER", "USERNAME"]).unwrap_or_default()));
        components.push(("os", std::env::consts::OS.to_string()));
        components.push(("arch", std::env::consts::ARCH.to_string()));
        if let Some(salt) = &self.salt {
            components.push(("salt", salt.clone()));
        }

        Ok(Arc::new(ComponentAgent { components }))
    }
}

fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| std::env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Hashes named components into a visitor id.
#[derive(Debug, Clone)]
pub struct ComponentAgent {
    components: Vec<(&'static str, String)>,
}

impl ComponentAgent {
    pub fn new(components: Vec<(&'static str, String)>) -> Self {
        Self { components }
    }
}

#[async_trait]
impl FingerprintAgent for ComponentAgent {
    async fn visitor_id(&self) -> Result<String> {
        if self.components.iter().all(|(_, v)| v.is_empty()) {
            return Err(OpenChatError::Fingerprint("no host components available".into()));
        }
        let mut hasher = Sha256::new();
        for (name, value) in &self.components {
            hasher.update(name.as_bytes());
            hasher.update(b"\x1f");
            hasher.update(value.as_bytes());
            hasher.update(b"\x1e");
        }
        let digest = hasher.finalize();
        Ok(hex::encode(&digest[..VISITOR_ID_BYTES]))
    }
}

/// Returns a fixed fingerprint (from config or tests).
#[derive(Debug, Clone)]
pub struct StaticFingerprintEngine {
    fingerprint: String,
}

impl StaticFingerprintEngine {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
        }
    }
}

#[async_trait]
impl FingerprintEngine for StaticFingerprintEngine {
    async fn load(&self) -> Result<Arc<dyn FingerprintAgent>> {
        if self.fingerprint.trim().is_empty() {
            return Err(OpenChatError::Fingerprint("static fingerprint is blank".into()));
        }
        Ok(Arc::new(StaticAgent(self.fingerprint.clone())))
    }
}

struct StaticAgent(String);

#[async_trait]
impl FingerprintAgent for StaticAgent {
    async fn visitor_id(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
