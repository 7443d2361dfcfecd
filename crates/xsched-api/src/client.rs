// Scheduler query/command client
//
// Wraps the transport and the auth session. Every call makes sure a
// session exists, tags the request with the caller reference, and retries
// exactly once when the server reports the session gone. Typed wrappers
// live in `queries.rs` and `commands.rs` as inherent methods.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{AuthSession, SessionState};
use crate::error::Error;
use crate::transport::{DEFAULT_LOGIN_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, Transport, TransportConfig};

pub const QUERY_ENDPOINT: &str = "xScheduleQuery";
pub const COMMAND_ENDPOINT: &str = "xScheduleCommand";

/// Reference tag sent with every request unless overridden.
pub const DEFAULT_REFERENCE: &str = "xsched";

/// `result` text the scheduler sends when the caller must log in again.
pub const NOT_LOGGED_IN: &str = "not logged in";

/// Client for the scheduler's `xScheduleQuery` / `xScheduleCommand` endpoints.
#[derive(Debug)]
pub struct XScheduleClient {
    transport: Transport,
    session: AuthSession,
    reference: String,
    request_timeout: Duration,
}

impl XScheduleClient {
    /// Create a client that owns a fresh HTTP connection pool.
    ///
    /// `base_url` is the scheduler root, e.g. `http://192.168.1.20:8080/`.
    pub fn new(
        base_url: Url,
        password: Option<SecretString>,
        reference: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let reference = reference.into();
        Ok(Self {
            transport: Transport::new(http, base_url),
            session: AuthSession::new(password, reference.clone(), transport.login_timeout),
            reference,
            request_timeout: transport.request_timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client` with default
    /// timeouts and reference tag.
    pub fn with_client(http: reqwest::Client, base_url: Url, password: Option<SecretString>) -> Self {
        Self {
            transport: Transport::new(http, base_url),
            session: AuthSession::new(password, DEFAULT_REFERENCE, DEFAULT_LOGIN_TIMEOUT),
            reference: DEFAULT_REFERENCE.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Current session epoch; see [`AuthSession::epoch`].
    pub fn session_epoch(&self) -> u64 {
        self.session.epoch()
    }

    /// Force a login handshake now.
    pub async fn login(&self) -> Result<(), Error> {
        self.session.login(&self.transport).await
    }

    /// Issue a named query and return the raw decoded reply.
    pub async fn query(&self, name: &str, parameters: &str) -> Result<Value, Error> {
        self.call(QUERY_ENDPOINT, "Query", name, parameters, None).await
    }

    /// Issue a named command and return the raw decoded reply.
    ///
    /// The reply is not checked: a non-"ok" `result` comes back as `Ok`.
    /// Use [`check_result`] or the typed wrappers for that.
    pub async fn command(&self, name: &str, parameters: &str, body: Option<&str>) -> Result<Value, Error> {
        self.call(COMMAND_ENDPOINT, "Command", name, parameters, body).await
    }

    async fn call(
        &self,
        endpoint: &str,
        key: &str,
        name: &str,
        parameters: &str,
        body: Option<&str>,
    ) -> Result<Value, Error> {
        self.session.ensure_logged_in(&self.transport).await?;

        let params = [
            (key, name),
            ("Parameters", parameters),
            ("Reference", self.reference.as_str()),
        ];

        match self.send_once(endpoint, &params, body).await {
            Err(Error::SessionLost) => {
                warn!(endpoint, name, "scheduler reported session loss, re-authenticating");
                self.session.mark_session_lost();
                self.session.ensure_logged_in(&self.transport).await?;
                // Second reply is returned as-is, even if it is another
                // "not logged in".
                self.transport
                    .request(endpoint, &params, body, self.request_timeout)
                    .await
            }
            other => other,
        }
    }

    async fn send_once(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<Value, Error> {
        let reply = self
            .transport
            .request(endpoint, params, body, self.request_timeout)
            .await?;
        if result_text(&reply) == Some(NOT_LOGGED_IN) {
            return Err(Error::SessionLost);
        }
        Ok(reply)
    }
}

fn result_text(value: &Value) -> Option<&str> {
    value.get("result").and_then(Value::as_str)
}

/// Turn a reply whose `result` is present and not `"ok"` into
/// [`Error::Rejected`] carrying the server's literal text.
///
/// Replies without a string `result` (status and list queries) pass.
pub fn check_result(value: Value) -> Result<Value, Error> {
    match result_text(&value) {
        Some(result) if result != "ok" => {
            debug!(result, "scheduler rejected request");
            Err(Error::Rejected {
                result: result.to_owned(),
            })
        }
        _ => Ok(value),
    }
}
