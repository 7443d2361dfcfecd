// Scheduler login handshake
//
// The scheduler has no session token. A client counts as logged in once it
// has presented md5(<address the server sees> + <password>) to
// `xScheduleLogin`. The server only discloses that address in its reply to
// a login attempt, so an unknown address costs one deliberately bad
// attempt before the real one.

use std::sync::RwLock;
use std::time::Duration;

use md5::{Digest, Md5};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::transport::Transport;

pub const LOGIN_ENDPOINT: &str = "xScheduleLogin";

/// Sent only to make the server reveal the caller's address.
const HINT_CREDENTIAL: &str = "bad";

/// Where the session stands from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No password configured: the scheduler needs no login.
    NoPasswordConfigured,
    LoggedOut,
    LoggedIn,
}

impl SessionState {
    /// `true` when requests can be sent without logging in first.
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::NoPasswordConfigured | Self::LoggedIn)
    }
}

/// Derive the login credential: lowercase hex `md5(ip + secret)`.
pub fn credential_for(ip: &str, secret: &SecretString) -> String {
    let mut hasher = Md5::new();
    hasher.update(ip.as_bytes());
    hasher.update(secret.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}

/// The two fields the login endpoint answers with.
#[derive(Debug, Default)]
struct LoginReply {
    result: Option<String>,
    ip: Option<String>,
}

impl LoginReply {
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Self {
            result: text("result"),
            ip: text("ip"),
        }
    }

    fn is_ok(&self) -> bool {
        self.result.as_deref() == Some("ok")
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    server_seen_ip: Option<String>,
    /// Bumped on every successful login; caches compare against it.
    epoch: u64,
    /// Completed handshakes, successful or not.
    attempts: u64,
    last_attempt_ok: bool,
}

/// Owns the credential scheme and the logged-in flag.
///
/// Handshakes are serialized: a caller that arrives while another
/// handshake is running waits for it and shares its outcome instead of
/// starting a second one.
#[derive(Debug)]
pub struct AuthSession {
    secret: Option<SecretString>,
    reference: String,
    login_timeout: Duration,
    inner: RwLock<SessionInner>,
    login_lock: Mutex<()>,
}

impl AuthSession {
    /// An empty secret is treated the same as no secret.
    pub fn new(secret: Option<SecretString>, reference: impl Into<String>, login_timeout: Duration) -> Self {
        let secret = secret.filter(|s| !s.expose_secret().is_empty());
        let state = if secret.is_some() {
            SessionState::LoggedOut
        } else {
            SessionState::NoPasswordConfigured
        };
        Self {
            secret,
            reference: reference.into(),
            login_timeout,
            inner: RwLock::new(SessionInner {
                state,
                server_seen_ip: None,
                epoch: 0,
                attempts: 0,
                last_attempt_ok: false,
            }),
            login_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.read().expect("session lock poisoned").state
    }

    /// The client address the server reported during the last handshake.
    pub fn server_seen_ip(&self) -> Option<String> {
        self.inner
            .read()
            .expect("session lock poisoned")
            .server_seen_ip
            .clone()
    }

    /// Session generation. Changes whenever a new login succeeds, so any
    /// list fetched under an older epoch may no longer match the server.
    pub fn epoch(&self) -> u64 {
        self.inner.read().expect("session lock poisoned").epoch
    }

    /// Force `LoggedIn -> LoggedOut` after the server reports the session gone.
    pub fn mark_session_lost(&self) {
        let mut inner = self.inner.write().expect("session lock poisoned");
        if inner.state == SessionState::LoggedIn {
            debug!("session marked lost");
            inner.state = SessionState::LoggedOut;
        }
    }

    /// Log in unless no password is configured or a session already exists.
    pub async fn ensure_logged_in(&self, transport: &Transport) -> Result<(), Error> {
        // Counter and state are read under one guard.
        let attempts_seen = {
            let inner = self.inner.read().expect("session lock poisoned");
            if inner.state.is_authenticated() {
                return Ok(());
            }
            inner.attempts
        };
        self.login_since(transport, attempts_seen).await
    }

    /// Run the login handshake, or join the one already in flight.
    pub async fn login(&self, transport: &Transport) -> Result<(), Error> {
        let attempts_seen = self.inner.read().expect("session lock poisoned").attempts;
        self.login_since(transport, attempts_seen).await
    }

    /// Handshake unless one completed after the caller saw `attempts_seen`;
    /// in that case its outcome is shared.
    async fn login_since(&self, transport: &Transport, attempts_seen: u64) -> Result<(), Error> {
        let Some(secret) = self.secret.as_ref() else {
            return Ok(());
        };

        let _guard = self.login_lock.lock().await;

        {
            let inner = self.inner.read().expect("session lock poisoned");
            if inner.attempts != attempts_seen {
                debug!(ok = inner.last_attempt_ok, "joined in-flight login");
                return if inner.last_attempt_ok {
                    Ok(())
                } else {
                    Err(Error::Authentication {
                        message: "concurrent login attempt was rejected".into(),
                    })
                };
            }
        }

        let result = self.handshake(transport, secret).await;

        let mut inner = self.inner.write().expect("session lock poisoned");
        inner.attempts += 1;
        inner.last_attempt_ok = result.is_ok();
        if result.is_ok() {
            inner.state = SessionState::LoggedIn;
            inner.epoch += 1;
            info!(epoch = inner.epoch, "logged in to scheduler");
        } else {
            inner.state = SessionState::LoggedOut;
        }
        result
    }

    /// Cached address first, then hint-and-retry.
    async fn handshake(&self, transport: &Transport, secret: &SecretString) -> Result<(), Error> {
        if let Some(ip) = self.server_seen_ip() {
            match self.attempt(transport, &credential_for(&ip, secret)).await {
                Ok(reply) if reply.is_ok() => {
                    debug!(%ip, "login with cached address succeeded");
                    return Ok(());
                }
                Ok(reply) => debug!(%ip, result = ?reply.result, "cached address rejected"),
                Err(e) => debug!(%ip, error = %e, "login with cached address failed"),
            }
        }

        let hint = self.attempt(transport, HINT_CREDENTIAL).await?;
        if hint.is_ok() {
            // The server accepted anything: it has no password set.
            warn!("scheduler accepted a placeholder credential; no password is enforced");
            return Ok(());
        }
        let ip = hint.ip.ok_or_else(|| Error::Authentication {
            message: "scheduler did not disclose the client address".into(),
        })?;
        debug!(%ip, "scheduler hinted client address");
        self.inner.write().expect("session lock poisoned").server_seen_ip = Some(ip.clone());

        let reply = self.attempt(transport, &credential_for(&ip, secret)).await?;
        if reply.is_ok() {
            Ok(())
        } else {
            Err(Error::Authentication {
                message: format!(
                    "credential for {ip} rejected (result: {})",
                    reply.result.as_deref().unwrap_or("<none>")
                ),
            })
        }
    }

    async fn attempt(&self, transport: &Transport, credential: &str) -> Result<LoginReply, Error> {
        let value = transport
            .request(
                LOGIN_ENDPOINT,
                &[("Credential", credential), ("Reference", &self.reference)],
                None,
                self.login_timeout,
            )
            .await?;
        Ok(LoginReply::from_value(&value))
    }
}
