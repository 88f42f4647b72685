use thiserror::Error;

/// Top-level error type for the `nbnak-api` crate.
///
/// Covers transport, authentication, HTTP status and decoding failures.
/// `nbnak-core` maps these into domain-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API token was rejected (HTTP 401/403).
    #[error("Invalid API token (HTTP {status})")]
    InvalidToken { status: u16 },

    /// The token could not be encoded as a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status from Netbox.
    #[error("Netbox API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the token was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidToken { .. } | Self::Authentication { .. })
    }

    /// Returns `true` if the request timed out at the transport layer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if the server could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
