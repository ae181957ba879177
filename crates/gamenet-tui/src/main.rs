//! `gamenet-tui`: live terminal console for a GameNet management server.
//!
//! Three screens, navigable with number keys: Dashboard, Clients and VHD.
//! A background data bridge connects the controller, runs the status
//! poller and forwards every snapshot into the action loop.
//!
//! Logs go to a file (default `/tmp/gamenet-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gamenet_config::{self as cfg, Profile};
use gamenet_core::{Controller, ControllerConfig, TlsVerification};

use crate::app::App;

/// Terminal console for GameNet diskless clients.
#[derive(Parser, Debug)]
#[command(name = "gamenet-tui", version, about)]
struct Cli {
    /// Server profile to use
    #[arg(short = 'p', long, env = "GAMENET_PROFILE")]
    profile: Option<String>,

    /// Management server URL (overrides profile)
    #[arg(short = 's', long, env = "GAMENET_SERVER")]
    server: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long, env = "GAMENET_INSECURE")]
    insecure: bool,

    /// Status poll interval in seconds (overrides profile)
    #[arg(short = 'i', long)]
    interval: Option<u64>,

    /// Log file path
    #[arg(long, default_value = "/tmp/gamenet-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. The returned guard flushes on drop and must live
/// as long as the app.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("gamenet_tui={log_level},gamenet_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("gamenet-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Resolve the controller config: profile from the shared config file,
/// then command-line overrides.
fn build_config(cli: &Cli) -> Result<ControllerConfig> {
    let config = cfg::load_config_or_default();
    let profile_name = cli
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned());

    let mut profile = match config.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if cli.profile.is_some() => {
            return Err(eyre!("profile '{profile_name}' not found"));
        }
        None => Profile::default(),
    };
    profile.inherit_defaults(&config.defaults);
    if let Some(server) = &cli.server {
        profile.server.clone_from(server);
    }
    if profile.server.is_empty() {
        return Err(eyre!(
            "no server configured; run `gamenet config init` or pass --server"
        ));
    }

    let mut controller_config = cfg::profile_to_controller_config(&profile, &profile_name)?;
    if cli.insecure {
        controller_config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = cli.interval {
        controller_config.poll_interval = Duration::from_secs(secs.max(1));
    }
    Ok(controller_config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = build_config(&cli)?;
    info!(server = %config.url, "starting gamenet-tui");

    let mut app = App::new(Controller::new(config));
    app.run().await?;

    Ok(())
}
