// ── Runtime connection configuration ──
//
// Describes *how* to reach one scheduler and how fast to poll it.
// Never touches disk: the CLI builds a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use xsched_api::TransportConfig;
use xsched_api::transport::{DEFAULT_LOGIN_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};

use crate::error::CoreError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_POLL_ACTIVE: Duration = Duration::from_secs(2);
pub const DEFAULT_POLL_IDLE: Duration = Duration::from_secs(2);
pub const DEFAULT_LISTS_REFRESH: Duration = Duration::from_secs(15);

/// Configuration for connecting to a single scheduler.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Scheduler root, e.g. `http://192.168.1.20:8080/`.
    pub url: Url,
    /// Shared secret. `None` when the scheduler has no password set.
    pub password: Option<SecretString>,
    /// Tag sent as `Reference=` on every request.
    pub reference: String,
    /// Poll cadence while a playlist is playing or paused.
    pub poll_interval_active: Duration,
    /// Poll cadence while idle.
    pub poll_interval_idle: Duration,
    /// Maximum age of the cached playlist and step lists.
    pub lists_refresh: Duration,
    pub login_timeout: Duration,
    pub request_timeout: Duration,
    /// Spawn the background poll task on connect. Off for one-shot use.
    pub polling_enabled: bool,
}

impl ControllerConfig {
    /// Config for `http://{host}:{port}/` with every other knob at its default.
    pub fn new(host: &str, port: u16) -> Result<Self, CoreError> {
        Ok(Self {
            url: scheduler_url(host, port)?,
            ..Self::default()
        })
    }

    pub fn with_password(mut self, password: Option<SecretString>) -> Self {
        self.password = password;
        self
    }

    /// Transport settings derived from the timeouts above.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            login_timeout: self.login_timeout,
            request_timeout: self.request_timeout,
            ..TransportConfig::default()
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://127.0.0.1:8080/").expect("static URL is valid"),
            password: None,
            reference: xsched_api::DEFAULT_REFERENCE.into(),
            poll_interval_active: DEFAULT_POLL_ACTIVE,
            poll_interval_idle: DEFAULT_POLL_IDLE,
            lists_refresh: DEFAULT_LISTS_REFRESH,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            polling_enabled: true,
        }
    }
}

/// Build the scheduler root URL. Bare IPv6 literals get bracketed.
pub fn scheduler_url(host: &str, port: u16) -> Result<Url, CoreError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(CoreError::Config {
            message: "scheduler host is empty".into(),
        });
    }
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    Url::parse(&format!("http://{host}:{port}/")).map_err(|e| CoreError::Config {
        message: format!("invalid scheduler address {host}:{port}: {e}"),
    })
}
