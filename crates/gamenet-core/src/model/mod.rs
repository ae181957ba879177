// ── Domain model ──
//
// Read-only views of server-owned entities. The console never mutates
// these directly; changes go through commands and come back via polling.

pub mod client;
pub mod vhd;

pub use client::{Client, ClientId, ClientStats};
pub use vhd::{VhdId, VhdImage, timestamp_display};
