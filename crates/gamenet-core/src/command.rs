// ── Command API ──
//
// All write operations flow through a unified `Command` enum.
// The controller routes each variant to the matching form endpoint.

use gamenet_api::models::{ClientForm, VhdEditForm, VhdForm};

use crate::error::CoreError;
use crate::model::{ClientId, VhdId};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the management server.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Client operations ────────────────────────────────────────────
    RebootClient { id: ClientId },
    DeleteClient { id: ClientId },
    AddClient(ClientForm),
    EditClient { id: ClientId, form: ClientForm },

    // ── VHD operations ───────────────────────────────────────────────
    AddVhd(VhdForm),
    EditVhd { id: VhdId, form: VhdEditForm },
    DeleteVhd { id: VhdId },
    CloneVhd { id: VhdId, new_name: String },
}

impl Command {
    /// Short description for logs and notifications.
    pub fn describe(&self) -> String {
        match self {
            Self::RebootClient { id } => format!("reboot client {id}"),
            Self::DeleteClient { id } => format!("delete client {id}"),
            Self::AddClient(form) => format!("add client {}", form.name),
            Self::EditClient { id, .. } => format!("edit client {id}"),
            Self::AddVhd(form) => format!("add VHD {}", form.name),
            Self::EditVhd { id, .. } => format!("edit VHD {id}"),
            Self::DeleteVhd { id } => format!("delete VHD {id}"),
            Self::CloneVhd { id, new_name } => format!("clone VHD {id} as {new_name}"),
        }
    }
}

/// Result of a successfully executed command.
///
/// The server answers form posts with a redirect and no body, so there is
/// nothing to return beyond acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
}
