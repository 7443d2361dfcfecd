//! Shared configuration for xsched tools.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! and translation to `xsched_core::ControllerConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use xsched_core::config::{DEFAULT_LISTS_REFRESH, DEFAULT_POLL_ACTIVE, DEFAULT_POLL_IDLE, DEFAULT_PORT};
use xsched_core::{ControllerConfig, scheduler_url};

/// Keyring service name; entries are keyed `<profile>/password`.
pub const KEYRING_SERVICE: &str = "xsched";

/// Environment variable consulted for the password after `password_env`.
pub const PASSWORD_ENV: &str = "XSCHED_PASSWORD";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "XSCHED_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named scheduler profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Resolve `requested` (or the default profile) to a name and profile.
    pub fn profile(&self, requested: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = self.active_profile_name(requested);
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::ProfileNotFound { name })
    }

    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }
}

/// Global defaults. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_login_timeout")]
    pub login_timeout: u64,

    /// Poll cadence while playing or paused.
    #[serde(default = "default_poll_active")]
    pub poll_active: u64,

    #[serde(default = "default_poll_idle")]
    pub poll_idle: u64,

    /// Maximum age of cached playlist and step lists.
    #[serde(default = "default_lists_refresh")]
    pub lists_refresh: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            login_timeout: default_login_timeout(),
            poll_active: default_poll_active(),
            poll_idle: default_poll_idle(),
            lists_refresh: default_lists_refresh(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    15
}
fn default_login_timeout() -> u64 {
    10
}
fn default_poll_active() -> u64 {
    DEFAULT_POLL_ACTIVE.as_secs()
}
fn default_poll_idle() -> u64 {
    DEFAULT_POLL_IDLE.as_secs()
}
fn default_lists_refresh() -> u64 {
    DEFAULT_LISTS_REFRESH.as_secs()
}

/// A named scheduler profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Scheduler host name or IP address.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Plaintext password. Prefer the keyring or `password_env`.
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,

    /// `Reference=` tag sent with each request.
    pub reference: Option<String>,

    pub timeout: Option<u64>,
    pub poll_active: Option<u64>,
    pub poll_idle: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: None,
            password_env: None,
            reference: None,
            timeout: None,
            poll_active: None,
            poll_idle: None,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `XSCHED_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "xsched", "xsched").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("xsched");
    p
}

// ── Config loading ──────────────────────────────────────────────────

const CLI_ENV_KEYS: &[&str] = &["config", "password", "profile", "host", "port", "output", "timeout"];

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if it exists), then `XSCHED_*` variables with
/// `__` separating nested keys (`XSCHED_DEFAULTS__TIMEOUT=30`).
/// Variables the CLI reads as flags are not config keys.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("XSCHED_")
                .ignore(CLI_ENV_KEYS)
                .split("__"),
        );

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

/// Resolve the scheduler password for a profile.
///
/// Order: the variable named by `password_env`, `XSCHED_PASSWORD`, the
/// system keyring, plaintext in the file. `None` means the scheduler has
/// no password and requests go out unauthenticated.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_password_with(
        profile,
        |name| std::env::var(name).ok(),
        || keyring_password(profile_name),
    )
}

fn resolve_password_with(
    profile: &Profile,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's password_env -> env var lookup
    if let Some(value) = profile.password_env.as_deref().and_then(&env) {
        return Some(SecretString::from(value));
    }

    // 2. Global env var
    if let Some(value) = env(PASSWORD_ENV) {
        return Some(SecretString::from(value));
    }

    // 3. System keyring
    if let Some(value) = keyring() {
        return Some(SecretString::from(value));
    }

    // 4. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

fn keyring_password(profile_name: &str) -> Option<String> {
    match keyring_entry(profile_name).and_then(|entry| entry.get_password()) {
        Ok(password) => Some(password),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            debug!(profile = profile_name, error = %e, "keyring lookup failed");
            None
        }
    }
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile and the global defaults.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url = scheduler_url(&profile.host, profile.port).map_err(|e| ConfigError::Validation {
        field: "host".into(),
        reason: e.to_string(),
    })?;

    let poll_active = profile.poll_active.unwrap_or(defaults.poll_active);
    let poll_idle = profile.poll_idle.unwrap_or(defaults.poll_idle);
    if poll_active == 0 || poll_idle == 0 {
        return Err(ConfigError::Validation {
            field: "poll interval".into(),
            reason: "must be at least one second".into(),
        });
    }

    let mut config = ControllerConfig {
        url,
        password: resolve_password(profile, profile_name),
        poll_interval_active: Duration::from_secs(poll_active),
        poll_interval_idle: Duration::from_secs(poll_idle),
        lists_refresh: Duration::from_secs(defaults.lists_refresh),
        login_timeout: Duration::from_secs(defaults.login_timeout),
        request_timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        ..ControllerConfig::default()
    };
    if let Some(reference) = profile.reference.as_deref().filter(|r| !r.is_empty()) {
        reference.clone_into(&mut config.reference);
    }
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "garage"

[defaults]
poll_active = 1

[profiles.garage]
host = "192.168.1.20"
password_env = "GARAGE_PW"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("garage"));
        assert_eq!(cfg.defaults.poll_active, 1);
        assert_eq!(cfg.defaults.lists_refresh, 15);

        let (name, profile) = cfg.profile(None).unwrap();
        assert_eq!(name, "garage");
        assert_eq!(profile.port, 8080);
        assert_eq!(profile.password_env.as_deref(), Some("GARAGE_PW"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults, Defaults::default());
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), Profile::new("show.local", 8081));

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"], Profile::new("show.local", 8081));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile(Some("attic")),
            Err(ConfigError::ProfileNotFound { ref name }) if name == "attic"
        ));
    }

    #[test]
    fn password_env_wins() {
        let mut profile = Profile::new("h", 8080);
        profile.password_env = Some("SHOW_PW".into());
        profile.password = Some("plain".into());

        let env = |name: &str| match name {
            "SHOW_PW" => Some("from-profile-env".to_owned()),
            PASSWORD_ENV => Some("from-global-env".to_owned()),
            _ => None,
        };
        let pw = resolve_password_with(&profile, env, || Some("from-keyring".into())).unwrap();
        assert_eq!(pw.expose_secret(), "from-profile-env");
    }

    #[test]
    fn keyring_before_plaintext() {
        let mut profile = Profile::new("h", 8080);
        profile.password = Some("plain".into());

        let pw = resolve_password_with(&profile, no_env, || Some("from-keyring".into())).unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&profile, no_env, || None).unwrap();
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn no_password_anywhere_is_none() {
        let profile = Profile::new("h", 8080);
        assert!(resolve_password_with(&profile, no_env, || None).is_none());
    }

    #[test]
    fn profile_translates_to_controller_config() {
        let mut profile = Profile::new("10.0.0.9", 9000);
        profile.timeout = Some(4);
        profile.poll_idle = Some(10);
        profile.reference = Some("garage".into());

        let config = profile_to_controller_config(&profile, "t", &Defaults::default()).unwrap();
        assert_eq!(config.url.as_str(), "http://10.0.0.9:9000/");
        assert_eq!(config.request_timeout, Duration::from_secs(4));
        assert_eq!(config.poll_interval_active, Duration::from_secs(2));
        assert_eq!(config.poll_interval_idle, Duration::from_secs(10));
        assert_eq!(config.reference, "garage");
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let mut profile = Profile::new("10.0.0.9", 9000);
        profile.poll_active = Some(0);
        assert!(matches!(
            profile_to_controller_config(&profile, "t", &Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn empty_host_rejected() {
        let profile = Profile::new("", 8080);
        assert!(matches!(
            profile_to_controller_config(&profile, "t", &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "host"
        ));
    }
}
