//! Configuration loading and validation for the paste server.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is missing or invalid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Storage backend selected by `STORE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; pastes are lost on restart.
    Memory,
    /// One JSON file per paste under `STORE_DIR`.
    File,
}

/// Validated paste server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Which storage backend to use.
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// Directory for the `file` backend. **Required** when `STORE_BACKEND=file`.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// How often (seconds) to purge expired pastes from the store.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Furthest into the future (seconds) a paste may be set to expire.
    #[serde(default = "default_max_ttl")]
    pub max_ttl_secs: u64,

    /// Maximum envelope length in hex characters.
    #[serde(default = "default_max_envelope_len")]
    pub max_envelope_len: usize,

    /// PEM certificate chain. Set together with `TLS_KEY_PATH` to serve HTTPS.
    #[serde(default)]
    pub tls_cert_path: Option<PathBuf>,

    /// PEM private key. Set together with `TLS_CERT_PATH` to serve HTTPS.
    #[serde(default)]
    pub tls_key_path: Option<PathBuf>,

    /// OTLP endpoint for span export. Logs only when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}
fn default_sweep_interval() -> u64 {
    60
}
fn default_max_ttl() -> u64 {
    30 * 24 * 3600
}
fn default_max_envelope_len() -> usize {
    2_000_000
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            store_backend: default_store_backend(),
            store_dir: None,
            sweep_interval_secs: default_sweep_interval(),
            max_ttl_secs: default_max_ttl(),
            max_envelope_len: default_max_envelope_len(),
            tls_cert_path: None,
            tls_key_path: None,
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or the combination
    /// is invalid.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.store_backend == StoreBackend::File && self.store_dir.is_none() {
            anyhow::bail!("STORE_DIR is required when STORE_BACKEND=file");
        }
        if self.sweep_interval_secs == 0 {
            anyhow::bail!("SWEEP_INTERVAL_SECS must be > 0");
        }
        if self.max_ttl_secs == 0 {
            anyhow::bail!("MAX_TTL_SECS must be > 0");
        }
        if self.max_envelope_len == 0 {
            anyhow::bail!("MAX_ENVELOPE_LEN must be > 0");
        }
        if self.tls_cert_path.is_some() != self.tls_key_path.is_some() {
            anyhow::bail!("TLS_CERT_PATH and TLS_KEY_PATH must be set together");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }

    /// Certificate and key paths, if HTTPS is configured.
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert_path.as_ref().zip(self.tls_key_path.as_ref())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty when set");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_store_backend(), StoreBackend::Memory);
        assert_eq!(default_sweep_interval(), 60);
        assert_eq!(default_max_ttl(), 2_592_000);
        assert_eq!(default_max_envelope_len(), 2_000_000);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_requires_dir_for_file_backend() {
        let cfg = Config {
            store_backend: StoreBackend::File,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            store_backend: StoreBackend::File,
            store_dir: Some("/var/lib/pastes".into()),
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_intervals() {
        let cfg = Config {
            sweep_interval_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            max_ttl_secs: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_half_tls_config() {
        let cfg = Config {
            tls_cert_path: Some("/run/tls/tls.crt".into()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            tls_cert_path: Some("/run/tls/tls.crt".into()),
            tls_key_path: Some("/run/tls/tls.key".into()),
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
        assert!(cfg.tls_paths().is_some());
    }

    #[test]
    fn validate_rejects_blank_otlp_endpoint() {
        let cfg = Config {
            otel_exporter_otlp_endpoint: Some("  ".into()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn backend_names_deserialise_lowercase() {
        let b: StoreBackend = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(b, StoreBackend::File);
    }
}
