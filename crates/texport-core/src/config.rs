//! Client configuration: credentials, endpoint, timeouts, retry budget.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://cloud.tenable.com";
pub const ACCESS_KEY_ENV: &str = "TEXPORT_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "TEXPORT_SECRET_KEY";

/// Validated configuration for a [`Client`](crate::Client).
///
/// Credentials come from the caller or the `TEXPORT_ACCESS_KEY` /
/// `TEXPORT_SECRET_KEY` environment variables; everything else defaults
/// sensibly and can be overridden via the optional config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub access_key: String,
    pub secret_key: String,
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Connection-establishment timeout.
    pub open_timeout: Duration,
    /// Retries after the first attempt, 0–10.
    pub max_retries: u32,
    /// Delay between export status polls.
    pub poll_interval: Duration,
    /// Total budget for waiting on one export job.
    pub export_timeout: Duration,
}

impl Config {
    /// Configuration with explicit credentials and default settings.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let config = Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            ..Self::defaults()
        };
        config.validate()?;
        Ok(config)
    }

    /// Credentials from the environment, settings from the optional config
    /// file (created with defaults on first run).
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            access_key: std::env::var(ACCESS_KEY_ENV).unwrap_or_default(),
            secret_key: std::env::var(SECRET_KEY_ENV).unwrap_or_default(),
            ..Self::defaults()
        };
        FileSettings::load_or_init()?.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            // Compile-time constant, parse cannot fail.
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url"),
            timeout: Duration::from_secs(30),
            open_timeout: Duration::from_secs(10),
            max_retries: 3,
            poll_interval: Duration::from_secs(2),
            export_timeout: Duration::from_secs(300),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "access_key is required (pass directly or set {ACCESS_KEY_ENV})"
            )));
        }
        if self.secret_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "secret_key is required (pass directly or set {SECRET_KEY_ENV})"
            )));
        }
        // Plain HTTP is only acceptable against loopback (local test
        // servers); anything remote must be HTTPS.
        let loopback = matches!(self.base_url.host_str(), Some("127.0.0.1" | "localhost" | "[::1]"));
        if self.base_url.scheme() != "https" && !loopback {
            return Err(Error::Config(format!(
                "base_url must use HTTPS: {}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() || self.open_timeout.is_zero() {
            return Err(Error::Config("timeouts must be positive".into()));
        }
        if self.max_retries > 10 {
            return Err(Error::Config(format!(
                "max_retries must be between 0 and 10, got {}",
                self.max_retries
            )));
        }
        Ok(())
    }
}

/// Optional overrides from `~/.config/texport/config.toml`. Credentials
/// deliberately have no file fallback; they stay in the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub open_timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub export_timeout_secs: Option<u64>,
}

impl FileSettings {
    pub fn path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("texport")
            .map_err(|e| Error::Config(format!("cannot resolve config dir: {e}")))?;
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(Error::Io)
    }

    /// Loads the settings file, writing a default one on first run.
    pub fn load_or_init() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let default = Self::default();
            let toml = toml::to_string_pretty(&default)
                .map_err(|e| Error::Config(format!("cannot serialize defaults: {e}")))?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, toml)?;
            tracing::info!("created default config at {}", path.display());
            return Ok(default);
        }
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data).map_err(|e| Error::Config(format!("bad config file: {e}")))
    }

    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            config.base_url = Url::parse(base_url)
                .map_err(|e| Error::Config(format!("base_url is not a valid URL: {e}")))?;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.open_timeout_secs {
            config.open_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.max_retries {
            config.max_retries = n;
        }
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.export_timeout_secs {
            config.export_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}
