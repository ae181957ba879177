//! Offline MAC address helpers.

use gamenet_core::mac;

use crate::cli::{GlobalOpts, MacArgs, MacCommand};
use crate::error::CliError;
use crate::output;

pub fn handle(args: MacArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        MacCommand::Format { input } => {
            output::print_output(&mac::format_input(&input), global.quiet);
            Ok(())
        }

        MacCommand::Validate { mac } => {
            let parsed = mac::validate(&mac).map_err(|e| CliError::Validation {
                field: "mac".into(),
                reason: e.message,
            })?;
            output::print_output(parsed.as_str(), global.quiet);
            Ok(())
        }
    }
}
