//! Server configuration read from `SPENDWISE_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use spendwise_core::sync::DEFAULT_PROBE_TIMEOUT;
use spendwise_remote_store::DEFAULT_COLLECTION;
use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, expected: &'static str, value: &str) -> Self {
        Self::Invalid {
            key,
            expected,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub collection: String,
    pub probe_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    /// `None` runs on local storage only.
    pub remote: Option<RemoteConfig>,
    pub seed_sample_data: bool,
    pub storage_quota_bytes: Option<usize>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let listen_addr_raw =
            var("SPENDWISE_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr_raw.parse::<SocketAddr>().map_err(|_| {
            ConfigError::invalid("SPENDWISE_LISTEN_ADDR", "a socket address", &listen_addr_raw)
        })?;

        let data_dir = PathBuf::from(
            var("SPENDWISE_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let probe_timeout = match var("SPENDWISE_PROBE_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|_| {
                ConfigError::invalid("SPENDWISE_PROBE_TIMEOUT_MS", "milliseconds", &raw)
            })?),
            None => DEFAULT_PROBE_TIMEOUT,
        };

        let remote = var("SPENDWISE_REMOTE_URL").map(|base_url| RemoteConfig {
            base_url,
            token: var("SPENDWISE_REMOTE_TOKEN"),
            collection: var("SPENDWISE_REMOTE_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            probe_timeout,
        });

        let seed_sample_data = match var("SPENDWISE_SEED_SAMPLE_DATA") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::invalid("SPENDWISE_SEED_SAMPLE_DATA", "true or false", &raw)
            })?,
            None => true,
        };

        let storage_quota_bytes = var("SPENDWISE_STORAGE_QUOTA_BYTES")
            .map(|raw| {
                raw.parse::<usize>().map_err(|_| {
                    ConfigError::invalid("SPENDWISE_STORAGE_QUOTA_BYTES", "a byte count", &raw)
                })
            })
            .transpose()?;

        Ok(Self {
            listen_addr,
            data_dir,
            remote,
            seed_sample_data,
            storage_quota_bytes,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
