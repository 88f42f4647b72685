// ── Core error types ──
//
// Domain-level failures. Transport-layer errors from `nbnak-api` are folded
// into connection/auth/api variants by the `From` impl at the bottom, so
// the CLI only ever matches on this enum.

use thiserror::Error;

use crate::port::PortError;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Netbox: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Netbox request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found. Tried: {}", tried.join(", "))]
    DeviceNotFound { tried: Vec<String> },

    /// An interface record the normalizer does not understand.
    #[error("Interface {interface}: {source}")]
    Port {
        interface: String,
        #[source]
        source: PortError,
    },

    // ── Request errors ───────────────────────────────────────────────
    #[error("{feature} export is not implemented")]
    NotImplemented { feature: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },
}

impl CoreError {
    pub(crate) fn port(interface: &str, source: PortError) -> Self {
        Self::Port {
            interface: interface.to_owned(),
            source,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nbnak_api::Error> for CoreError {
    fn from(err: nbnak_api::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.is_connect() {
            return Self::ConnectionFailed {
                reason: err.to_string(),
            };
        }
        if err.is_auth() {
            return Self::AuthenticationFailed {
                message: err.to_string(),
            };
        }

        match err {
            nbnak_api::Error::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            nbnak_api::Error::Transport(e) => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            other => Self::Api {
                message: other.to_string(),
                status: None,
            },
        }
    }
}
