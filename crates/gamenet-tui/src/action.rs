//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::time::Duration;

use gamenet_core::{
    Client, ClientId, Confirmation, DetailView, Notice, StatsView, StatusSnapshot, TrafficSeries,
    VhdId, VhdImage,
};

use crate::screen::ScreenId;

#[derive(Clone)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,

    // ── Data (from the data bridge and spawned requests) ─────────
    StatusUpdated(StatusSnapshot),
    /// Full client list returned by a write; replaces every row.
    ClientsReloaded(Vec<Client>),
    VhdsLoaded(Vec<VhdImage>),
    TrafficLoaded(TrafficSeries),

    // ── Client detail ─────────────────────────────────────────────
    OpenClientDetail(ClientId),
    ClientDetailLoaded(DetailView),
    ClientStatsLoaded(ClientId, StatsView),
    CloseDetail,

    // ── Confirmations ─────────────────────────────────────────────
    ShowConfirm(Confirmation),
    ConfirmYes,
    ConfirmNo,
    /// The user accepted a VHD delete; the VHD screen resolves the image.
    VhdDeleteConfirmed(VhdId),
    DeleteVhd(VhdImage),

    // ── Clone dialog ──────────────────────────────────────────────
    SubmitClone { id: VhdId, name: String },

    // ── Refresh ───────────────────────────────────────────────────
    /// Ask the poller for a one-off fetch after the delay.
    RefreshStatus(Duration),
    ReloadVhds,

    // ── Connection ────────────────────────────────────────────────
    Connected,
    Connecting,
    Disconnected(String),

    // ── Search ────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    SearchInput(String),

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    Notify(Notice),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quit => write!(f, "Quit"),
            Self::Tick => write!(f, "Tick"),
            Self::Render => write!(f, "Render"),
            Self::Resize(w, h) => write!(f, "Resize({w}, {h})"),
            Self::SwitchScreen(s) => write!(f, "SwitchScreen({s})"),
            Self::GoBack => write!(f, "GoBack"),
            Self::StatusUpdated(s) => {
                write!(f, "StatusUpdated(#{}, {} clients)", s.sequence, s.clients.len())
            }
            Self::ClientsReloaded(c) => write!(f, "ClientsReloaded({})", c.len()),
            Self::VhdsLoaded(v) => write!(f, "VhdsLoaded({})", v.len()),
            Self::TrafficLoaded(_) => write!(f, "TrafficLoaded"),
            Self::OpenClientDetail(id) => write!(f, "OpenClientDetail({id})"),
            Self::ClientDetailLoaded(_) => write!(f, "ClientDetailLoaded"),
            Self::ClientStatsLoaded(id, _) => write!(f, "ClientStatsLoaded({id})"),
            Self::CloseDetail => write!(f, "CloseDetail"),
            Self::ShowConfirm(c) => write!(f, "ShowConfirm({:?})", c.action),
            Self::ConfirmYes => write!(f, "ConfirmYes"),
            Self::ConfirmNo => write!(f, "ConfirmNo"),
            Self::VhdDeleteConfirmed(id) => write!(f, "VhdDeleteConfirmed({id})"),
            Self::DeleteVhd(v) => write!(f, "DeleteVhd({})", v.id),
            Self::SubmitClone { id, .. } => write!(f, "SubmitClone({id})"),
            Self::RefreshStatus(d) => write!(f, "RefreshStatus({d:?})"),
            Self::ReloadVhds => write!(f, "ReloadVhds"),
            Self::Connected => write!(f, "Connected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Disconnected(e) => write!(f, "Disconnected({e})"),
            Self::OpenSearch => write!(f, "OpenSearch"),
            Self::CloseSearch => write!(f, "CloseSearch"),
            Self::SearchInput(q) => write!(f, "SearchInput({q})"),
            Self::ToggleHelp => write!(f, "ToggleHelp"),
            Self::Notify(n) => write!(f, "Notify({:?})", n.level),
        }
    }
}
