//! Shared helpers for command handlers.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use gamenet_core::{BootMode, Confirmation};

use crate::cli::BootModeArg;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Prompt(e.to_string()))?;
    Ok(confirmed)
}

/// Ask a core-issued confirmation.
pub fn ask(confirmation: &Confirmation, yes_flag: bool) -> Result<bool, CliError> {
    confirm(&confirmation.message, yes_flag)
}

/// A stderr spinner, hidden in quiet mode.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

impl From<BootModeArg> for BootMode {
    fn from(arg: BootModeArg) -> Self {
        match arg {
            BootModeArg::Uefi => BootMode::Uefi,
            BootModeArg::Legacy => BootMode::Legacy,
        }
    }
}
