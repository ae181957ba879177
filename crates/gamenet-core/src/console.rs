// ── Console abstraction ──
//
// The seam between page logic and the server. `Controller` implements it
// over HTTP; tests implement it in memory. Page controllers and the status
// poller are written against this trait only.

use std::future::Future;

use crate::command::{Command, CommandResult};
use crate::error::CoreError;
use crate::model::{Client, ClientId, ClientStats, VhdImage};

/// Reads and writes a page controller needs from the server.
pub trait Console: Send + Sync {
    /// Current status of every client.
    fn fetch_status(&self) -> impl Future<Output = Result<Vec<Client>, CoreError>> + Send;

    /// Latest stats sample. `Ok(None)` means the server answered without one.
    fn fetch_stats(
        &self,
        id: &ClientId,
    ) -> impl Future<Output = Result<Option<ClientStats>, CoreError>> + Send;

    /// Every VHD image with its attributes.
    fn fetch_vhds(&self) -> impl Future<Output = Result<Vec<VhdImage>, CoreError>> + Send;

    /// Run a write operation.
    fn execute(
        &self,
        command: Command,
    ) -> impl Future<Output = Result<CommandResult, CoreError>> + Send;
}
