use thiserror::Error;

/// Top-level error type for the `xsched-api` crate.
///
/// Covers every failure mode of the sequencer protocol: transport,
/// decoding, the login handshake, and server-side rejections.
/// `xsched-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request exceeded its per-call timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout {
        timeout_secs: u64,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// The body could not be decoded as JSON, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The login handshake exhausted both address-resolution strategies.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The server reported that the session is gone mid-request.
    #[error("Session lost -- re-authentication required")]
    SessionLost,

    // ── Protocol ────────────────────────────────────────────────────
    /// The server answered with a non-"ok" result, passed through verbatim.
    #[error("Rejected by scheduler: {result}")]
    Rejected { result: String },
}

impl Error {
    /// Returns `true` if this error indicates the credential was refused
    /// or the session dropped.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::SessionLost => true,
            Self::Rejected { result } => result.eq_ignore_ascii_case(crate::client::NOT_LOGGED_IN),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Wrap a `reqwest` failure, promoting timeouts to [`Error::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_secs: timeout.as_secs(),
                source: err,
            }
        } else {
            Self::Transport(err)
        }
    }
}
