//! Configuration for nbnak.
//!
//! An INI file (default `~/.nbnak.cfg`) with a single `[nbnak]` section:
//!
//! ```ini
//! [nbnak]
//! api_url = https://netbox.example.net/api
//! api_key = 0123456789abcdef0123456789abcdef01234567
//! search_domain = dc1.example.net
//! ```
//!
//! Optional keys: `timeout` (seconds), `insecure` (bool), `ca_cert` (path).
//! Command-line flags and `NBNAK_*` environment variables are passed in as
//! [`Overrides`] and take priority over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File, FileFormat};
use directories::BaseDirs;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use nbnak_api::{TlsMode, TransportConfig};

/// File name looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".nbnak.cfg";

const SECTION: &str = "nbnak";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("config file {} has no [nbnak] section", path.display())]
    MissingSection { path: PathBuf },

    #[error("missing required setting '{field}'")]
    Missing { field: &'static str },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("no API key configured")]
    NoCredentials,

    #[error("config loading failed: {0}")]
    Load(Box<config::ConfigError>),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::Load(Box::new(err))
    }
}

// ── Raw file shape ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ConfigFile {
    nbnak: Option<RawSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    api_url: Option<String>,
    api_key: Option<String>,
    search_domain: Option<String>,
    timeout: Option<u64>,
    insecure: Option<bool>,
    ca_cert: Option<PathBuf>,
}

// ── Public types ────────────────────────────────────────────────────

/// Values that replace whatever the file says.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub search_domain: Option<String>,
    pub timeout: Option<u64>,
    pub insecure: bool,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Url,
    pub api_key: SecretString,
    /// Suffix tried when a bare device name does not resolve.
    pub search_domain: Option<String>,
    pub timeout: Duration,
    pub tls: TlsMode,
}

impl Settings {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// `<home>/.nbnak.cfg`, if a home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILE_NAME))
}

/// Load and validate settings from `path`, applying `overrides`.
pub fn load(path: &Path, overrides: &Overrides) -> Result<Settings, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut builder =
        Config::builder().add_source(File::from(path).format(FileFormat::Ini).required(true));

    let string_overrides = [
        ("api_url", overrides.api_url.clone()),
        ("api_key", overrides.api_key.clone()),
        ("search_domain", overrides.search_domain.clone()),
        ("timeout", overrides.timeout.map(|t| t.to_string())),
        ("insecure", overrides.insecure.then(|| "true".to_owned())),
    ];
    for (key, value) in string_overrides {
        if let Some(value) = value {
            builder = builder.set_override(format!("{SECTION}.{key}"), value)?;
        }
    }

    let file: ConfigFile = builder.build()?.try_deserialize()?;
    let raw = file.nbnak.ok_or_else(|| ConfigError::MissingSection {
        path: path.to_path_buf(),
    })?;

    validate(raw)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn validate(raw: RawSettings) -> Result<Settings, ConfigError> {
    let url_str = non_empty(raw.api_url).ok_or(ConfigError::Missing { field: "api_url" })?;
    let api_url = Url::parse(&url_str).map_err(|e| ConfigError::Validation {
        field: "api_url",
        reason: format!("{e}: {url_str}"),
    })?;
    if !matches!(api_url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url",
            reason: format!("expected an http(s) URL, got {url_str}"),
        });
    }

    let api_key = non_empty(raw.api_key)
        .map(SecretString::from)
        .ok_or(ConfigError::NoCredentials)?;

    let tls = if raw.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ca_path) = raw.ca_cert {
        TlsMode::CustomCa(ca_path)
    } else {
        TlsMode::System
    };

    Ok(Settings {
        api_url,
        api_key,
        search_domain: non_empty(raw.search_domain),
        timeout: Duration::from_secs(raw.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        tls,
    })
}
