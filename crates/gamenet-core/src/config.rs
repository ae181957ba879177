// ── Runtime connection configuration ──
//
// These types describe *how* to talk to a management server.
// They carry credential data and tuning, but never touch disk.
// The CLI/TUI constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

/// How to authenticate with the server.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Form login with a session cookie.
    Credentials {
        username: String,
        password: SecretString,
    },
    /// No login (server in open mode, or a session established elsewhere).
    None,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on a LAN server).
    DangerAcceptInvalid,
}

/// What a client detail panel shows when live stats cannot be had.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatsFallback {
    /// Fill the panel with random placeholder values, labelled as simulated.
    #[default]
    Simulated,
    /// Show an explicit "not available" state.
    Unavailable,
}

/// Configuration for connecting to a single management server.
///
/// Built by CLI/TUI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Server URL (e.g., `http://192.168.1.10:5000`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout. A slow request never delays the next poll tick.
    pub timeout: Duration,
    /// Status poll interval.
    pub poll_interval: Duration,
    /// Delay between a successful reboot request and the follow-up refresh.
    pub reboot_refresh_delay: Duration,
    /// Startup delay before the dashboard traffic chart is filled.
    pub traffic_delay: Duration,
    /// Stats fallback policy for client detail panels.
    pub stats_fallback: StatsFallback,
}

impl ControllerConfig {
    /// Config for `url` with no login and default tuning.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            auth: AuthCredentials::None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(10),
            reboot_refresh_delay: Duration::from_secs(2),
            traffic_delay: Duration::from_secs(1),
            stats_fallback: StatsFallback::default(),
        }
    }
}
