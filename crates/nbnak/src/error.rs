//! CLI error types with miette diagnostics.
//!
//! Every failure funnels into `CliError`, which `main` renders once and
//! turns into the process exit code.

use miette::Diagnostic;
use thiserror::Error;

use nbnak_config::ConfigError;
use nbnak_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_IMPLEMENTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Netbox")]
    #[diagnostic(
        code(nbnak::connection_failed),
        help("Check api_url in the config file and that Netbox is reachable.\nCause: {reason}")
    )]
    ConnectionFailed { reason: String },

    #[error("Request to Netbox timed out")]
    #[diagnostic(
        code(nbnak::timeout),
        help("Increase the timeout with --timeout or the `timeout` config key.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(nbnak::auth_failed),
        help("Verify api_key in the config file, or set NBNAK_API_KEY.")
    )]
    AuthFailed { message: String },

    #[error("No API key configured")]
    #[diagnostic(
        code(nbnak::no_credentials),
        help("Add `api_key = <token>` to the [nbnak] section, or set NBNAK_API_KEY.")
    )]
    NoCredentials,

    // ── Inventory data ───────────────────────────────────────────────
    #[error("Device not found. Tried: {tried}")]
    #[diagnostic(
        code(nbnak::device_not_found),
        help("Check the device name in Netbox, or set search_domain in the config file.")
    )]
    DeviceNotFound { tried: String },

    #[error("Cannot normalize interface {interface}: {reason}")]
    #[diagnostic(
        code(nbnak::invalid_interface),
        help("Fix the interface record in Netbox, or pass --skip-invalid to leave it out.")
    )]
    InvalidInterface { interface: String, reason: String },

    #[error("Netbox API error: {message}")]
    #[diagnostic(code(nbnak::api_error))]
    ApiError { message: String },

    // ── Unsupported ──────────────────────────────────────────────────
    #[error("'{feature}' is not yet implemented")]
    #[diagnostic(
        code(nbnak::not_implemented),
        help("Drop the --{feature} flag for now.")
    )]
    NotYetImplemented { feature: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid request: {reason}")]
    #[diagnostic(code(nbnak::validation))]
    Validation { reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(nbnak::no_config),
        help(
            "Create it with an [nbnak] section holding api_url and api_key,\n\
             or point --config at another file.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(nbnak::config))]
    Config(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotYetImplemented { .. } => exit_code::NOT_IMPLEMENTED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::DeviceNotFound { tried } => CliError::DeviceNotFound {
                tried: tried.join(", "),
            },
            CoreError::Port { interface, source } => CliError::InvalidInterface {
                interface,
                reason: source.to_string(),
            },
            CoreError::NotImplemented { feature } => CliError::NotYetImplemented { feature },
            CoreError::ValidationFailed { message } => CliError::Validation { reason: message },
            CoreError::Api { message, status } => CliError::ApiError {
                message: match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                },
            },
        }
    }
}

impl From<nbnak_api::Error> for CliError {
    fn from(err: nbnak_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::NoCredentials => CliError::NoCredentials,
            other => CliError::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_not_found_exits_one() {
        let err: CliError = CoreError::DeviceNotFound {
            tried: vec!["sw1".into(), "sw1.example.net".into()],
        }
        .into();
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Device not found. Tried: sw1, sw1.example.net");
    }

    #[test]
    fn unimplemented_users_has_own_code() {
        let err: CliError = CoreError::NotImplemented {
            feature: "users".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_IMPLEMENTED);
    }

    #[test]
    fn missing_config_names_path() {
        let err: CliError = ConfigError::NotFound {
            path: "/home/x/.nbnak.cfg".into(),
        }
        .into();
        assert!(matches!(err, CliError::NoConfig { ref path } if path == "/home/x/.nbnak.cfg"));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
