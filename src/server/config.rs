use std::net::IpAddr;
use std::path::PathBuf;

use crate::error::{CowifyError, Result};

/// Default upload limit: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// OpenAI credential, which is optional so the server can start without it;
/// the relay endpoint then answers with a configuration error.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: IpAddr,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// OpenAI API key. `None` when unset or blank.
    pub openai_api_key: Option<String>,
    /// OpenAI API base URL (default: `https://api.openai.com/v1`).
    pub openai_base_url: Option<String>,
    /// Directory served for every path not matched by a route.
    pub static_dir: PathBuf,
    /// Directory searched for the reference image.
    pub reference_dir: PathBuf,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            openai_api_key: None,
            openai_base_url: None,
            static_dir: PathBuf::from("public"),
            reference_dir: PathBuf::from("."),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                     |
    /// |--------------------|-----------------------------|
    /// | `HOST`             | `0.0.0.0`                   |
    /// | `PORT`             | `3000`                      |
    /// | `OPENAI_API_KEY`   | unset                       |
    /// | `OPENAI_BASE_URL`  | `https://api.openai.com/v1` |
    /// | `STATIC_DIR`       | `public`                    |
    /// | `REFERENCE_DIR`    | `.`                         |
    /// | `MAX_UPLOAD_BYTES` | `5242880`                   |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = match var("HOST") {
            Some(host) => host
                .parse()
                .map_err(|_| CowifyError::InvalidConfig(format!("HOST is not an IP address: {host}")))?,
            None => defaults.host,
        };

        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| CowifyError::InvalidConfig(format!("PORT must be a valid u16: {port}")))?,
            None => defaults.port,
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(limit) => limit.parse().map_err(|_| {
                CowifyError::InvalidConfig(format!("MAX_UPLOAD_BYTES must be a byte count: {limit}"))
            })?,
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            host,
            port,
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL"),
            static_dir: var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            reference_dir: var("REFERENCE_DIR").map_or(defaults.reference_dir, PathBuf::from),
            max_upload_bytes,
        })
    }
}
