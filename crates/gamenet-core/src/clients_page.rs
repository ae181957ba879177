// ── Clients page controller ──
//
// Owns the clients table: the row set loaded at page open, the search
// query, and the open detail panel. Poll ticks patch loaded rows in place
// and never add or remove them; only a reload changes the row set.
//
// State transitions are synchronous. Operations that talk to the server
// are associated async functions that take a `Console` and return values
// the caller feeds back in, so a UI can run them on a task of its own.

use std::time::Duration;

use tracing::{debug, warn};

use crate::command::Command;
use crate::config::StatsFallback;
use crate::console::Console;
use crate::error::CoreError;
use crate::filter::Searchable;
use crate::model::{Client, ClientId};
use crate::notice::{Confirmation, Notice, PendingAction};
use crate::stats::StatsView;
use crate::validate::{self, ClientInput};

pub const CLIENT_NOT_FOUND: &str = "Client not found.";
pub const CLIENT_DETAIL_ERROR: &str = "Error loading client details.";
pub const REBOOT_PROMPT: &str = "Are you sure you want to reboot this client?";
pub const REBOOT_SENT: &str = "Reboot command sent successfully";
pub const REBOOT_FAILED: &str = "Failed to send reboot command";
pub const REBOOT_ERROR: &str = "Error sending reboot command";

/// One table row. `can_reboot` tracks whether the reboot control is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRow {
    pub client: Client,
    pub can_reboot: bool,
}

impl From<Client> for ClientRow {
    fn from(client: Client) -> Self {
        let can_reboot = client.is_online;
        Self { client, can_reboot }
    }
}

/// An open detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDetail {
    pub client: Client,
    /// `None` for offline clients, which have no stats section.
    pub stats: Option<StatsView>,
}

/// Result of opening a detail panel.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Found(ClientDetail),
    NotFound,
    Error,
}

impl DetailView {
    /// Panel text for the two failure states.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Found(_) => None,
            Self::NotFound => Some(CLIENT_NOT_FOUND),
            Self::Error => Some(CLIENT_DETAIL_ERROR),
        }
    }
}

/// Outcome of a reboot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebootOutcome {
    pub notice: Notice,
    /// When to refresh status, if the request was accepted.
    pub refresh_after: Option<Duration>,
}

/// Clients page state.
#[derive(Debug, Clone, Default)]
pub struct ClientsPage {
    rows: Vec<ClientRow>,
    query: String,
    detail: Option<DetailView>,
}

impl ClientsPage {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Row set ──────────────────────────────────────────────────────

    /// Replace the row set (page open or reload).
    pub fn load(&mut self, clients: Vec<Client>) {
        self.rows = clients.into_iter().map(ClientRow::from).collect();
    }

    pub fn rows(&self) -> &[ClientRow] {
        &self.rows
    }

    pub fn row(&self, id: &ClientId) -> Option<&ClientRow> {
        self.rows.iter().find(|r| &r.client.id == id)
    }

    /// Patch loaded rows from a poll result, matched by id.
    ///
    /// Updates status, IP, VHD name, and the reboot control. Clients the
    /// page has not loaded are ignored and missing ones are left as they
    /// were. Returns the number of rows whose content changed.
    pub fn apply_status(&mut self, clients: &[Client]) -> usize {
        let mut changed = 0;
        for row in &mut self.rows {
            let Some(fresh) = clients.iter().find(|c| c.id == row.client.id) else {
                continue;
            };
            let before = row.clone();
            row.client.is_online = fresh.is_online;
            row.client.ip_address.clone_from(&fresh.ip_address);
            row.client.vhd_name.clone_from(&fresh.vhd_name);
            row.can_reboot = fresh.is_online;
            if *row != before {
                changed += 1;
            }
        }
        if changed > 0 {
            debug!(changed, "patched client rows");
        }
        changed
    }

    // ── Search ───────────────────────────────────────────────────────

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into().to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Rows matching the current query, in loaded order.
    pub fn visible_rows(&self) -> Vec<&ClientRow> {
        self.rows
            .iter()
            .filter(|r| r.client.matches(&self.query))
            .collect()
    }

    // ── Detail panel ─────────────────────────────────────────────────

    /// Fetch the client list and build a detail panel for `id`.
    ///
    /// Online clients start with a loading stats section; follow up with
    /// [`fetch_stats`](Self::fetch_stats).
    pub async fn fetch_detail<C: Console>(console: &C, id: &ClientId) -> DetailView {
        match console.fetch_status().await {
            Ok(clients) => match clients.into_iter().find(|c| &c.id == id) {
                Some(client) => {
                    let stats = client.is_online.then_some(StatsView::Loading);
                    DetailView::Found(ClientDetail { client, stats })
                }
                None => DetailView::NotFound,
            },
            Err(e) => {
                warn!(error = %e, %id, "loading client details failed");
                DetailView::Error
            }
        }
    }

    /// Fetch stats for an open panel, applying the fallback policy.
    pub async fn fetch_stats<C: Console>(
        console: &C,
        id: &ClientId,
        fallback: StatsFallback,
    ) -> StatsView {
        StatsView::resolve(console.fetch_stats(id).await, fallback)
    }

    pub fn open_detail(&mut self, view: DetailView) {
        self.detail = Some(view);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// Fill the stats section, if the panel for `id` is still open.
    pub fn set_stats(&mut self, id: &ClientId, stats: StatsView) -> bool {
        match &mut self.detail {
            Some(DetailView::Found(detail)) if &detail.client.id == id && detail.stats.is_some() => {
                detail.stats = Some(stats);
                true
            }
            _ => false,
        }
    }

    // ── Reboot ───────────────────────────────────────────────────────

    /// Prompt for a reboot. Offline rows have no reboot control.
    pub fn request_reboot(&self, id: &ClientId) -> Option<Confirmation> {
        let row = self.row(id)?;
        row.can_reboot.then(|| Confirmation {
            message: REBOOT_PROMPT.into(),
            action: PendingAction::RebootClient { id: id.clone() },
        })
    }

    /// Send the reboot request. No retry; an accepted request schedules a
    /// status refresh after `refresh_delay`.
    pub async fn reboot<C: Console>(
        console: &C,
        id: &ClientId,
        refresh_delay: Duration,
    ) -> RebootOutcome {
        let result = console
            .execute(Command::RebootClient { id: id.clone() })
            .await;
        match result {
            Ok(_) => RebootOutcome {
                notice: Notice::success(REBOOT_SENT),
                refresh_after: Some(refresh_delay),
            },
            Err(e) => {
                warn!(error = %e, %id, "reboot request failed");
                let message = if e.is_transport() {
                    REBOOT_ERROR
                } else {
                    REBOOT_FAILED
                };
                RebootOutcome {
                    notice: Notice::error(message),
                    refresh_after: None,
                }
            }
        }
    }

    // ── Delete ───────────────────────────────────────────────────────

    pub fn request_delete(&self, id: &ClientId) -> Option<Confirmation> {
        let row = self.row(id)?;
        Some(Confirmation {
            message: delete_prompt(&row.client.name),
            action: PendingAction::DeleteClient { id: id.clone() },
        })
    }

    /// Delete a client, then fetch the full list for a reload.
    ///
    /// Rows are never removed optimistically: the caller replaces the row
    /// set with the returned list.
    pub async fn delete<C: Console>(console: &C, id: &ClientId) -> Result<Vec<Client>, CoreError> {
        console
            .execute(Command::DeleteClient { id: id.clone() })
            .await?;
        console.fetch_status().await
    }

    // ── Create / edit ────────────────────────────────────────────────

    /// Validate and submit a new client, then fetch the list for a reload.
    /// Nothing is sent when validation fails.
    pub async fn create<C: Console>(console: &C, input: &ClientInput) -> Result<Vec<Client>, CoreError> {
        let form = validate::client_form(input)?;
        console.execute(Command::AddClient(form)).await?;
        console.fetch_status().await
    }

    /// Validate and submit changes to a client, then fetch the list.
    pub async fn edit<C: Console>(
        console: &C,
        id: &ClientId,
        input: &ClientInput,
    ) -> Result<Vec<Client>, CoreError> {
        let form = validate::client_form(input)?;
        console
            .execute(Command::EditClient {
                id: id.clone(),
                form,
            })
            .await?;
        console.fetch_status().await
    }
}

pub fn delete_prompt(name: &str) -> String {
    format!("Are you sure you want to delete client \"{name}\"? This action cannot be undone.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{FakeConsole, Failure, client, sample};
    use crate::validate::FormField;

    fn page() -> ClientsPage {
        let mut page = ClientsPage::new();
        page.load(vec![
            client(1, "Alice", true),
            client(2, "Bob", false),
            client(3, "Carol", true),
        ]);
        page
    }

    #[test]
    fn search_filters_by_name() {
        let mut page = page();
        page.set_query("alice");
        let names: Vec<&str> = page
            .visible_rows()
            .iter()
            .map(|r| r.client.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice"]);
    }

    #[test]
    fn search_filters_by_ip_prefix() {
        let mut page = page();
        page.set_query("10.0.0");
        assert_eq!(page.visible_rows().len(), 2);
    }

    #[test]
    fn poll_patch_flips_row_online_in_place() {
        let mut page = page();
        assert!(!page.row(&ClientId::from(2_u64)).unwrap().can_reboot);

        let mut fresh = vec![client(2, "Bob", true), client(99, "Stranger", true)];
        fresh[0].vhd_name = "Win11".into();
        let changed = page.apply_status(&fresh);

        assert_eq!(changed, 1);
        let rows: Vec<&str> = page.rows().iter().map(|r| r.client.name.as_str()).collect();
        assert_eq!(rows, vec!["Alice", "Bob", "Carol"]);

        let bob = page.row(&ClientId::from(2_u64)).unwrap();
        assert!(bob.client.is_online);
        assert!(bob.can_reboot);
        assert_eq!(bob.client.ip_display(), "10.0.0.2");
        assert_eq!(bob.client.vhd_name, "Win11");
    }

    #[test]
    fn poll_patch_going_offline_clears_ip() {
        let mut page = page();
        page.apply_status(&[client(1, "Alice", false)]);
        let alice = page.row(&ClientId::from(1_u64)).unwrap();
        assert_eq!(alice.client.ip_display(), "-");
        assert!(!alice.can_reboot);
    }

    #[tokio::test]
    async fn detail_for_absent_id_is_not_found() {
        let console = FakeConsole::with_clients(vec![client(1, "Alice", true)]);
        let view = ClientsPage::fetch_detail(&console, &ClientId::from("42")).await;
        assert_eq!(view, DetailView::NotFound);
        assert_eq!(view.message(), Some(CLIENT_NOT_FOUND));
    }

    #[tokio::test]
    async fn detail_fetch_failure_is_error() {
        let console = FakeConsole::default();
        console.fail_status();
        let view = ClientsPage::fetch_detail(&console, &ClientId::from("1")).await;
        assert_eq!(view.message(), Some(CLIENT_DETAIL_ERROR));
    }

    #[tokio::test]
    async fn online_detail_loads_stats_in_second_step() {
        let console = FakeConsole::with_clients(vec![client(1, "Alice", true)]);
        console.set_stats(1, Some(sample()));
        let id = ClientId::from(1_u64);

        let mut page = page();
        let view = ClientsPage::fetch_detail(&console, &id).await;
        let DetailView::Found(ref detail) = view else {
            panic!("expected detail, got {view:?}");
        };
        assert_eq!(detail.stats, Some(StatsView::Loading));
        page.open_detail(view);

        let stats = ClientsPage::fetch_stats(&console, &id, StatsFallback::Simulated).await;
        assert!(page.set_stats(&id, stats));
        let Some(DetailView::Found(detail)) = page.detail() else {
            panic!("panel closed");
        };
        assert!(matches!(detail.stats, Some(StatsView::Live(_))));
    }

    #[tokio::test]
    async fn offline_detail_has_no_stats_section() {
        let console = FakeConsole::with_clients(vec![client(2, "Bob", false)]);
        let view = ClientsPage::fetch_detail(&console, &ClientId::from(2_u64)).await;
        let DetailView::Found(detail) = view else {
            panic!("expected detail");
        };
        assert_eq!(detail.stats, None);
    }

    #[tokio::test]
    async fn stats_failure_still_populates_panel() {
        let console = FakeConsole::default();
        console.fail_stats();
        let stats =
            ClientsPage::fetch_stats(&console, &ClientId::from(1_u64), StatsFallback::Simulated)
                .await;
        let sample = stats.stats().unwrap();
        assert!(sample.cpu_usage > 0.0);
        assert!(sample.memory_usage_mb > 0.0);
        assert!(sample.network_rx_mbps >= 0.0);
        assert!(sample.network_tx_mbps >= 0.0);
        assert!(stats.is_simulated());
    }

    #[test]
    fn reboot_prompt_only_for_online_rows() {
        let page = page();
        let prompt = page.request_reboot(&ClientId::from(1_u64)).unwrap();
        assert_eq!(prompt.message, REBOOT_PROMPT);
        assert!(page.request_reboot(&ClientId::from(2_u64)).is_none());
    }

    #[tokio::test]
    async fn reboot_success_schedules_refresh() {
        let console = FakeConsole::default();
        let outcome =
            ClientsPage::reboot(&console, &ClientId::from(1_u64), Duration::from_secs(2)).await;
        assert_eq!(outcome.notice, Notice::success(REBOOT_SENT));
        assert_eq!(outcome.refresh_after, Some(Duration::from_secs(2)));
        assert_eq!(console.executed().len(), 1);
    }

    #[tokio::test]
    async fn reboot_messages_distinguish_rejection_from_transport() {
        let console = FakeConsole::default();
        console.fail_execute(Failure::Rejected);
        let outcome =
            ClientsPage::reboot(&console, &ClientId::from(1_u64), Duration::from_secs(2)).await;
        assert_eq!(outcome.notice, Notice::error(REBOOT_FAILED));
        assert_eq!(outcome.refresh_after, None);

        console.fail_execute(Failure::Transport);
        let outcome =
            ClientsPage::reboot(&console, &ClientId::from(1_u64), Duration::from_secs(2)).await;
        assert_eq!(outcome.notice, Notice::error(REBOOT_ERROR));
    }

    #[test]
    fn delete_prompt_names_client() {
        let page = page();
        let prompt = page.request_delete(&ClientId::from(3_u64)).unwrap();
        assert_eq!(
            prompt.message,
            "Are you sure you want to delete client \"Carol\"? This action cannot be undone."
        );
    }

    #[tokio::test]
    async fn delete_reloads_from_server() {
        let console = FakeConsole::with_clients(vec![client(1, "Alice", true)]);
        let mut page = page();

        let fresh = ClientsPage::delete(&console, &ClientId::from(3_u64)).await.unwrap();
        // Nothing changes until the caller reloads.
        assert_eq!(page.rows().len(), 3);
        page.load(fresh);
        assert_eq!(page.rows().len(), 1);
        assert!(matches!(
            console.executed().as_slice(),
            [Command::DeleteClient { .. }]
        ));
    }

    #[tokio::test]
    async fn invalid_mac_blocks_submission() {
        let console = FakeConsole::default();
        let err = ClientsPage::create(
            &console,
            &ClientInput {
                name: "PC-09".into(),
                mac_address: "AA:BB:CC".into(),
                ..ClientInput::default()
            },
        )
        .await
        .unwrap_err();

        let CoreError::Validation(v) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(v.field, FormField::MacAddress);
        assert!(console.executed().is_empty());
        assert_eq!(console.status_calls(), 0);
    }

    #[tokio::test]
    async fn create_submits_masked_mac() {
        let console = FakeConsole::default();
        console.set_clients(vec![client(5, "PC-05", false)]);
        let rows = ClientsPage::create(
            &console,
            &ClientInput {
                name: "PC-05".into(),
                mac_address: "aabbccddee05".into(),
                ..ClientInput::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 1);
        let executed = console.executed();
        let [Command::AddClient(form)] = executed.as_slice() else {
            panic!("expected one add");
        };
        assert_eq!(form.mac_address, "AA:BB:CC:DD:EE:05");
    }
}
