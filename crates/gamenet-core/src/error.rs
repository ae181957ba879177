// ── Core error types ──
//
// User-facing errors from gamenet-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<gamenet_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::validate::ValidationError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected to the server")]
    Disconnected,

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Client not found: {identifier}")]
    ClientNotFound { identifier: String },

    #[error("VHD not found: {identifier}")]
    VhdNotFound { identifier: String },

    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Cannot delete locked VHD {name}")]
    VhdLocked { name: String },

    #[error("Cannot reboot offline client {name}")]
    ClientOffline { name: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Operation rejected by server: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the failure happened before or during transport, as opposed
    /// to the server answering and refusing.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout | Self::Disconnected
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gamenet_api::Error> for CoreError {
    fn from(err: gamenet_api::Error) -> Self {
        match err {
            gamenet_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            gamenet_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            gamenet_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() || e.is_request() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            gamenet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            gamenet_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            gamenet_api::Error::Status { status: 404, message } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: message,
            },
            gamenet_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            gamenet_api::Error::Rejected { status, message } => CoreError::Rejected {
                message: if message.is_empty() {
                    format!("HTTP {status}")
                } else {
                    message
                },
            },
            gamenet_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            gamenet_api::Error::Markup(message) => {
                CoreError::Internal(format!("Unreadable page: {message}"))
            }
        }
    }
}
