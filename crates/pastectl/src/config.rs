//! Configuration loading and validation for `pastectl`.
//!
//! Values come from `PASTECTL_`-prefixed environment variables.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

/// Validated `pastectl` configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Paste server to talk to. When unset, pastes live in [`Config::local_dir`].
    #[serde(default)]
    pub server_url: Option<String>,

    /// Base URL that share links are built on.
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    /// Directory for locally stored pastes.
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Password used instead of prompting. Never logged.
    #[serde(default)]
    pub password: Option<String>,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_share_base_url() -> String {
    "http://localhost:8080".into()
}
fn default_local_dir() -> PathBuf {
    PathBuf::from(".pastes")
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            share_base_url: default_share_base_url(),
            local_dir: default_local_dir(),
            password: None,
            log_level: default_log_level(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("share_base_url", &self.share_base_url)
            .field("local_dir", &self.local_dir)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("PASTECTL"))
            .build()
            .context("failed to build pastectl configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise pastectl configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        self.share_base()?;
        if let Some(server_url) = &self.server_url {
            if server_url.trim().is_empty() {
                anyhow::bail!("PASTECTL_SERVER_URL must not be empty when set");
            }
        }
        if self.local_dir.as_os_str().is_empty() {
            anyhow::bail!("PASTECTL_LOCAL_DIR must not be empty");
        }
        Ok(())
    }

    /// The parsed share link base URL.
    pub fn share_base(&self) -> Result<Url> {
        let url = Url::parse(&self.share_base_url)
            .with_context(|| format!("PASTECTL_SHARE_BASE_URL is not a URL: {:?}", self.share_base_url))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("PASTECTL_SHARE_BASE_URL must be an http(s) URL");
        }
        Ok(url)
    }
}
