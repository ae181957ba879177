//! CLI-side configuration: global flags layered over `gamenet-config`
//! profiles, producing a `gamenet_core::ControllerConfig`.
//!
//! Core never sees these types -- it receives a pre-built `ControllerConfig`.

use std::time::Duration;

use gamenet_config::{self as cfg, Config, Profile};
use gamenet_core::{AuthCredentials, ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build a `ControllerConfig` from the config file, profile, and CLI
/// overrides. Flags win over the profile.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let config = cfg::load_config_or_default();
    let profile_name = active_profile_name(global, &config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        // No profile: flags and env vars alone.
        None => Profile::default(),
    };
    profile.inherit_defaults(&config.defaults);

    resolve_profile(&profile, &profile_name, global)
}

/// Translate a profile + global flags into a `ControllerConfig`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    // 1. Server URL (flag > env > profile)
    let server = global.server.as_deref().unwrap_or(&profile.server);
    if server.is_empty() {
        return Err(CliError::NoConfig {
            path: cfg::config_path().display().to_string(),
        });
    }
    let url = cfg::parse_server_url(server)?;

    // 2. Credentials (flag > env > profile)
    let auth = match global.username.as_ref().or(profile.username.as_ref()) {
        Some(username) => AuthCredentials::Credentials {
            username: username.clone(),
            password: cfg::resolve_password(profile, profile_name)?,
        },
        None => AuthCredentials::None,
    };

    // 3. Profile tuning, then flag overrides
    let mut config = cfg::apply_profile(ControllerConfig::new(url), profile, auth);
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}
