// ── User-facing prompts and notices ──
//
// Page controllers never talk to the terminal. They hand back a
// `Confirmation` to ask before a destructive action and a `Notice` to
// report its outcome; the CLI and TUI decide how to show them.

use serde::Serialize;

use crate::model::{ClientId, VhdId};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A one-line message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// The action a confirmation prompt guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Reboot requested from the clients page.
    RebootClient { id: ClientId },
    /// Reboot requested from the dashboard table.
    DashboardReboot { id: ClientId },
    DeleteClient { id: ClientId },
    DeleteVhd { id: VhdId },
}

/// A yes/no question to put to the user before acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub message: String,
    pub action: PendingAction,
}
