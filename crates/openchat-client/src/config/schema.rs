use std::time::Duration;

use serde::Deserialize;

use openchat_core::cipher::{CipherCodec, DEFAULT_KEY_HEX};
use openchat_core::error::{OpenChatError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub cipher: CipherSection,

    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub identity: IdentitySection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api: ApiSection::default(),
            cipher: CipherSection::default(),
            poll: PollSection::default(),
            identity: IdentitySection::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(OpenChatError::UnsupportedVersion);
        }

        self.api.validate()?;
        self.cipher.validate()?;
        self.poll.validate()?;
        self.identity.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// API prefix every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Added on top of a long poll's declared hold time.
    #[serde(default = "default_poll_grace_ms")]
    pub poll_grace_ms: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            poll_grace_ms: default_poll_grace_ms(),
        }
    }
}

impl ApiSection {
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| OpenChatError::InvalidConfig(format!("api.base_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OpenChatError::InvalidConfig(
                "api.base_url must be http or https".into(),
            ));
        }
        if !(1000..=120000).contains(&self.request_timeout_ms) {
            return Err(OpenChatError::InvalidConfig(
                "api.request_timeout_ms must be between 1000 and 120000".into(),
            ));
        }
        if self.poll_grace_ms > 30000 {
            return Err(OpenChatError::InvalidConfig(
                "api.poll_grace_ms must be at most 30000".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_grace(&self) -> Duration {
        Duration::from_millis(self.poll_grace_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CipherSection {
    #[serde(default = "default_key_hex")]
    pub key_hex: String,
}

impl Default for CipherSection {
    fn default() -> Self {
        Self {
            key_hex: default_key_hex(),
        }
    }
}

impl CipherSection {
    pub fn validate(&self) -> Result<()> {
        self.codec().map(|_| ())
    }

    pub fn codec(&self) -> Result<CipherCodec> {
        CipherCodec::from_hex(&self.key_hex)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    #[serde(default = "default_poll_timeout_secs")]
    pub default_timeout_secs: u64,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl PollSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.default_timeout_secs) {
            return Err(OpenChatError::InvalidConfig(
                "poll.default_timeout_secs must be between 1 and 300".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    /// Fixed fingerprint; when unset the host engine derives one.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl IdentitySection {
    pub fn validate(&self) -> Result<()> {
        if matches!(self.fingerprint.as_deref(), Some(fp) if fp.trim().is_empty()) {
            return Err(OpenChatError::InvalidConfig(
                "identity.fingerprint must not be blank".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".into()
}
fn default_request_timeout_ms() -> u64 {
    15000
}
fn default_poll_grace_ms() -> u64 {
    5000
}
fn default_key_hex() -> String {
    DEFAULT_KEY_HEX.into()
}
fn default_poll_timeout_secs() -> u64 {
    30
}
