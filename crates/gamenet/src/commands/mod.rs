//! Command dispatch: bridges CLI args -> page controllers -> output formatting.

pub mod clients;
pub mod config_cmd;
pub mod dashboard;
pub mod mac;
pub mod util;
pub mod vhd;

use gamenet_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Clients(args) => clients::handle(controller, args, global).await,
        Command::Dashboard(args) => dashboard::handle(controller, args, global).await,
        Command::Vhd(args) => vhd::handle(controller, args, global).await,
        // Offline commands are handled before a connection is made
        Command::Mac(_) | Command::Config(_) | Command::Completions(_) => Err(
            CliError::Internal("offline command reached server dispatch".into()),
        ),
    }
}
