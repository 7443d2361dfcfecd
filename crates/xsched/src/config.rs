//! CLI-side config resolution: profile lookup plus `GlobalOpts` overrides.
//!
//! Core never sees these types -- it receives a pre-built `ControllerConfig`.

use std::time::Duration;

use secrecy::SecretString;
use xsched_config::{Config, profile_to_controller_config};
use xsched_core::ControllerConfig;
use xsched_core::config::DEFAULT_PORT;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
///
/// Precedence per setting: flag (or its env var) > profile > defaults.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = xsched_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut controller = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            let mut profile = profile.clone();
            if let Some(ref host) = global.host {
                profile.host.clone_from(host);
            }
            if let Some(port) = global.port {
                profile.port = port;
            }
            profile_to_controller_config(&profile, &profile_name, &cfg.defaults)?
        }
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            let host = global.host.as_deref().ok_or_else(|| CliError::NoConfig {
                path: xsched_config::config_path().display().to_string(),
            })?;
            let profile = xsched_config::Profile::new(host, global.port.unwrap_or(DEFAULT_PORT));
            profile_to_controller_config(&profile, &profile_name, &cfg.defaults)?
        }
    };

    if let Some(ref password) = global.password {
        controller.password = (!password.is_empty()).then(|| SecretString::from(password.clone()));
    }
    if let Some(timeout) = global.timeout {
        if timeout == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least one second".into(),
            });
        }
        controller.request_timeout = Duration::from_secs(timeout);
    }

    tracing::debug!(
        profile = %profile_name,
        url = %controller.url,
        authenticated = controller.password.is_some(),
        "resolved scheduler config"
    );
    Ok(controller)
}
