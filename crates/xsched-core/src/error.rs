// ── Core error types ──
//
// User-facing errors from xsched-core. Consumers never see raw HTTP or
// JSON failures; the `From<xsched_api::Error>` impl translates them into
// domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to scheduler at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller disconnected")]
    ControllerDisconnected,

    #[error("Scheduler request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Polling ──────────────────────────────────────────────────────
    /// A poll cycle could not fetch status. The previous snapshot stays
    /// current.
    #[error("Status update failed: {source}")]
    UpdateFailed { source: Box<CoreError> },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Playlist not found: {name}")]
    PlaylistNotFound { name: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// The scheduler answered with a non-"ok" result; `message` is its text.
    #[error("Rejected by scheduler: {message}")]
    Rejected { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The underlying error, looking through [`CoreError::UpdateFailed`].
    pub fn root(&self) -> &CoreError {
        match self {
            Self::UpdateFailed { source } => source.root(),
            other => other,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.root(), Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<xsched_api::Error> for CoreError {
    fn from(err: xsched_api::Error) -> Self {
        match err {
            xsched_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            xsched_api::Error::SessionLost => CoreError::AuthenticationFailed {
                message: "Session lost -- re-authentication required".into(),
            },
            xsched_api::Error::Rejected { result } => {
                if result.eq_ignore_ascii_case(xsched_api::NOT_LOGGED_IN) {
                    CoreError::AuthenticationFailed {
                        message: format!("scheduler still reports \"{result}\" after re-login"),
                    }
                } else {
                    CoreError::Rejected { message: result }
                }
            }
            xsched_api::Error::Transport(ref e) => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map(|u| u.origin().ascii_serialization())
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            xsched_api::Error::Timeout { timeout_secs, .. } => CoreError::Timeout { timeout_secs },
            xsched_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            xsched_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unreadable scheduler reply: {message}"))
            }
        }
    }
}
