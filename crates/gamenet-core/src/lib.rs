//! Domain layer between `gamenet-api` and UI consumers (CLI / TUI).
//!
//! This crate owns the business logic and domain model for the GameNet
//! console:
//!
//! - **[`Controller`]**: Connection facade. [`connect()`](Controller::connect)
//!   logs in and spawns the command processor;
//!   [`disconnect()`](Controller::disconnect) stops it. Implements
//!   [`Console`].
//!
//! - **[`Console`]**: The seam page logic is written against: status,
//!   stats, and VHD reads plus [`Command`] execution.
//!
//! - **[`StatusPoller`]**: Fetches client status immediately and then on
//!   an interval, publishing ordered snapshots through a `watch` channel.
//!   Stale responses are dropped.
//!
//! - **Page controllers**: [`ClientsPage`], [`Dashboard`], and
//!   [`VhdPage`] hold per-page state and expose the async operations each
//!   page performs. They return [`Confirmation`]s and [`Notice`]s rather
//!   than touching the terminal.
//!
//! - **Input handling** ([`mac`], [`validate`]): MAC address masking and
//!   form validation, run before anything is sent.

pub mod clients_page;
pub mod command;
pub mod config;
pub mod console;
pub mod controller;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod mac;
pub mod model;
pub mod notice;
pub mod poller;
pub mod stats;
pub mod validate;
pub mod vhd_page;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clients_page::{ClientDetail, ClientRow, ClientsPage, DetailView, RebootOutcome};
pub use command::{Command, CommandResult};
pub use config::{AuthCredentials, ControllerConfig, StatsFallback, TlsVerification};
pub use console::Console;
pub use controller::{ConnectionState, Controller};
pub use dashboard::{Dashboard, StatusCounts, TrafficChart, TrafficSeries};
pub use error::CoreError;
pub use filter::Searchable;
pub use mac::MacAddress;
pub use model::{Client, ClientId, ClientStats, VhdId, VhdImage};
pub use notice::{Confirmation, Notice, NoticeLevel, PendingAction};
pub use poller::{PollOutcome, StatusPoller, StatusSnapshot};
pub use stats::StatsView;
pub use validate::{ClientInput, FormField, ValidationError, VhdEditInput, VhdInput};
pub use vhd_page::{CloneDialog, DeleteControl, VhdDetail, VhdPage};

pub use gamenet_api::models::BootMode;
