//! Client command handlers.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use gamenet_core::{
    Client, ClientId, ClientInput, ClientStats, ClientsPage, Console, Controller, DetailView,
    Notice, StatsView, StatusPoller,
};

use crate::cli::{ClientEditArgs, ClientFormArgs, ClientsArgs, ClientsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "VHD")]
    vhd: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl From<&Client> for ClientRow {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            mac: c.mac_address.clone(),
            ip: c.ip_display().to_owned(),
            vhd: c.vhd_name.clone(),
            status: c.status_label(),
        }
    }
}

// ── Detail report ───────────────────────────────────────────────────

/// `clients get` payload: the status record plus its stats sample.
#[derive(Serialize)]
struct ClientReport {
    #[serde(flatten)]
    client: Client,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<ClientStats>,
    /// `live`, `simulated` or `unavailable`; absent for offline clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    stats_source: Option<&'static str>,
}

impl ClientReport {
    fn new(client: Client, view: Option<StatsView>) -> Self {
        let stats_source = view.as_ref().map(|v| match v {
            StatsView::Live(_) => "live",
            StatsView::Simulated(_) => "simulated",
            StatsView::Loading | StatsView::Unavailable => "unavailable",
        });
        let stats = view.as_ref().and_then(StatsView::stats).cloned();
        Self {
            client,
            stats,
            stats_source,
        }
    }
}

fn detail(r: &ClientReport) -> String {
    let c = &r.client;
    let mut lines = vec![
        format!("ID:        {}", c.id),
        format!("Name:      {}", c.name),
        format!("MAC:       {}", c.mac_address),
        format!("IP:        {}", c.ip_display()),
        format!("VHD:       {}", c.vhd_name),
        format!("Status:    {}", c.status_label()),
    ];
    match (&r.stats, r.stats_source) {
        (Some(s), source) => {
            lines.push(String::new());
            if source == Some("simulated") {
                lines.push("Stats (simulated):".into());
            } else {
                lines.push("Stats:".into());
            }
            lines.push(format!("  CPU:       {}", s.cpu_display()));
            lines.push(format!("  Memory:    {}", s.memory_display()));
            lines.push(format!("  Download:  {}", s.download_display()));
            lines.push(format!("  Upload:    {}", s.upload_display()));
            lines.push(format!("  Updated:   {}", s.updated_display()));
        }
        (None, Some(_)) => {
            lines.push(String::new());
            lines.push(gamenet_core::stats::STATS_UNAVAILABLE_MESSAGE.into());
        }
        (None, None) => {}
    }
    lines.join("\n")
}

fn not_found(identifier: &str) -> CliError {
    CliError::NotFound {
        resource_type: "client".into(),
        identifier: identifier.to_owned(),
        list_command: "clients list".into(),
    }
}

fn render_clients(global: &GlobalOpts, clients: &[&Client]) -> Result<String, CliError> {
    output::render_list(
        &global.output,
        clients,
        |c| ClientRow::from(*c),
        |c| c.id.to_string(),
    )
}

/// Load the clients page from a fresh status fetch.
async fn load_page(controller: &Controller) -> Result<ClientsPage, CliError> {
    let mut page = ClientsPage::new();
    page.load(controller.fetch_status().await?);
    Ok(page)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List(list) => {
            let mut page = load_page(controller).await?;
            if let Some(query) = list.filter {
                page.set_query(query);
            }
            let rows: Vec<&Client> = page.visible_rows().into_iter().map(|r| &r.client).collect();
            let out = render_clients(global, &rows)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Get { client } => {
            let id = ClientId::new(&client);
            let found = match ClientsPage::fetch_detail(controller, &id).await {
                DetailView::Found(found) => found,
                DetailView::NotFound => return Err(not_found(&client)),
                view @ DetailView::Error => {
                    return Err(CliError::ApiError {
                        message: view.message().unwrap_or_default().into(),
                    });
                }
            };
            let stats = match found.stats {
                Some(_) => Some(
                    ClientsPage::fetch_stats(controller, &id, controller.config().stats_fallback)
                        .await,
                ),
                None => None,
            };
            let report = ClientReport::new(found.client, stats);
            let out = output::render_single(&global.output, &report, detail, |r| {
                r.client.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Add(form) => {
            let input = client_input(form);
            let name = input.name.trim().to_owned();
            ClientsPage::create(controller, &input).await?;
            output::print_notice(
                &Notice::success(format!("Client \"{name}\" added")),
                &global.color,
                global.quiet,
            );
            Ok(())
        }

        ClientsCommand::Edit { client, form } => {
            let id = ClientId::new(&client);
            let page = load_page(controller).await?;
            let current = page.row(&id).ok_or_else(|| not_found(&client))?;
            let input = merge_edit(&current.client, form);
            ClientsPage::edit(controller, &id, &input).await?;
            output::print_notice(
                &Notice::success(format!("Client \"{}\" updated", input.name.trim())),
                &global.color,
                global.quiet,
            );
            Ok(())
        }

        ClientsCommand::Reboot { client } => reboot(controller, &client, global).await,

        ClientsCommand::Delete { client } => {
            let id = ClientId::new(&client);
            let page = load_page(controller).await?;
            let confirmation = page.request_delete(&id).ok_or_else(|| not_found(&client))?;
            if !util::ask(&confirmation, global.yes)? {
                return Ok(());
            }
            ClientsPage::delete(controller, &id).await?;
            output::print_notice(&Notice::success("Client deleted"), &global.color, global.quiet);
            Ok(())
        }

        ClientsCommand::Watch { interval } => {
            let interval = interval.map_or(controller.config().poll_interval, Duration::from_secs);
            watch(controller, interval, global).await
        }
    }
}

fn client_input(form: ClientFormArgs) -> ClientInput {
    ClientInput {
        name: form.name,
        mac_address: form.mac,
        vhd_id: form.vhd,
        is_persistent: form.persistent,
        boot_mode: form.boot_mode.into(),
        post_boot_script: None,
    }
}

/// Fill the name and MAC from the client's current record when unset.
/// The status feed carries nothing else, so the remaining fields are
/// required flags.
fn merge_edit(current: &Client, form: ClientEditArgs) -> ClientInput {
    let vhd_id = Some(form.vhd)
        .filter(|vhd| !vhd.trim().is_empty() && !vhd.trim().eq_ignore_ascii_case("none"));
    let post_boot_script = Some(form.post_boot_script).filter(|s| !s.trim().is_empty());
    ClientInput {
        name: form.name.unwrap_or_else(|| current.name.clone()),
        mac_address: form.mac.unwrap_or_else(|| current.mac_address.clone()),
        vhd_id,
        is_persistent: form.persistent,
        boot_mode: form.boot_mode.into(),
        post_boot_script,
    }
}

async fn reboot(controller: &Controller, client: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let id = ClientId::new(client);
    let mut page = load_page(controller).await?;
    let row = page.row(&id).ok_or_else(|| not_found(client))?;
    let name = row.client.name.clone();

    let Some(confirmation) = page.request_reboot(&id) else {
        return Err(CliError::Refused {
            message: format!("client \"{name}\" is offline"),
        });
    };
    if !util::ask(&confirmation, global.yes)? {
        return Ok(());
    }

    let outcome =
        ClientsPage::reboot(controller, &id, controller.config().reboot_refresh_delay).await;
    let Some(delay) = outcome.refresh_after else {
        return Err(CliError::ApiError {
            message: outcome.notice.message,
        });
    };
    output::print_notice(&outcome.notice, &global.color, global.quiet);

    // Status refresh after the client has had time to drop off
    let pb = util::spinner("Refreshing status...", global.quiet);
    tokio::time::sleep(delay).await;
    let refreshed = controller.fetch_status().await;
    pb.finish_and_clear();
    match refreshed {
        Ok(clients) => {
            page.apply_status(&clients);
            if let Some(row) = page.row(&id) {
                output::print_notice(
                    &Notice::info(format!("{name}: {}", row.client.status_label())),
                    &global.color,
                    global.quiet,
                );
            }
        }
        Err(e) => tracing::warn!(error = %e, "status refresh after reboot failed"),
    }
    Ok(())
}

/// Print the client table on every applied poll until Ctrl-C.
///
/// The first snapshot loads the row set; later ones only patch it.
async fn watch(
    controller: &Controller,
    interval: Duration,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let poller = StatusPoller::new(controller.clone(), interval, cancel.clone());
    let mut snapshots = poller.stream();
    let task = poller.start();

    let mut page = ClientsPage::new();
    let mut loaded = false;
    let mut last_sequence = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = snapshots.next() => {
                let Some(snapshot) = next else { break };
                if !snapshot.is_loaded() || snapshot.sequence == last_sequence {
                    continue;
                }
                last_sequence = snapshot.sequence;
                if loaded {
                    page.apply_status(&snapshot.clients);
                } else {
                    page.load(snapshot.clients.to_vec());
                    loaded = true;
                }

                let rows: Vec<&Client> = page.rows().iter().map(|r| &r.client).collect();
                let out = render_clients(global, &rows)?;
                if matches!(global.output, OutputFormat::Table) && !global.quiet {
                    let at = snapshot
                        .fetched_at
                        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
                        .unwrap_or_default();
                    println!("── {at} ──");
                }
                output::print_output(&out, global.quiet);
            }
        }
    }

    cancel.cancel();
    let _ = task.await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_client(online: bool) -> Client {
        Client {
            id: ClientId::from(7_u64),
            name: "PC-07".into(),
            mac_address: "AA:BB:CC:DD:EE:07".into(),
            ip_address: online.then(|| "10.0.0.7".into()),
            vhd_name: "Win11-Games".into(),
            is_online: online,
        }
    }

    fn sample_stats() -> ClientStats {
        ClientStats {
            cpu_usage: 12.5,
            memory_usage_mb: 2048.0,
            network_rx_mbps: 3.2,
            network_tx_mbps: 1.1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn report_labels_simulated_stats() {
        let report = ClientReport::new(
            sample_client(true),
            Some(StatsView::Simulated(sample_stats())),
        );
        assert_eq!(report.stats_source, Some("simulated"));
        assert!(detail(&report).contains("Stats (simulated):"));
    }

    #[test]
    fn offline_report_has_no_stats_section() {
        let report = ClientReport::new(sample_client(false), None);
        let text = detail(&report);
        assert!(!text.contains("Stats"));
        assert!(text.contains("Offline"));
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("stats_source").is_none());
    }

    #[test]
    fn unavailable_stats_print_message() {
        let report = ClientReport::new(sample_client(true), Some(StatsView::Unavailable));
        assert!(detail(&report).contains(gamenet_core::stats::STATS_UNAVAILABLE_MESSAGE));
    }

    #[test]
    fn edit_keeps_unset_fields() {
        let current = sample_client(true);
        let form = ClientEditArgs {
            name: None,
            mac: Some("aabbccddee08".into()),
            vhd: "3".into(),
            persistent: true,
            boot_mode: crate::cli::BootModeArg::Legacy,
            post_boot_script: "C:\\scripts\\login.bat".into(),
        };
        let input = merge_edit(&current, form);
        assert_eq!(input.name, "PC-07");
        assert_eq!(input.mac_address, "aabbccddee08");
        assert_eq!(input.vhd_id.as_deref(), Some("3"));
        assert!(input.is_persistent);
        assert_eq!(input.boot_mode, gamenet_core::BootMode::Legacy);
        assert_eq!(input.post_boot_script.as_deref(), Some("C:\\scripts\\login.bat"));
    }

    #[test]
    fn edit_none_and_empty_values_clear_fields() {
        let form = ClientEditArgs {
            name: Some("PC-07b".into()),
            mac: None,
            vhd: "None".into(),
            persistent: false,
            boot_mode: crate::cli::BootModeArg::Uefi,
            post_boot_script: String::new(),
        };
        let input = merge_edit(&sample_client(false), form);
        assert_eq!(input.name, "PC-07b");
        assert_eq!(input.vhd_id, None);
        assert_eq!(input.post_boot_script, None);
    }

    #[test]
    fn edit_requires_every_server_replaced_field() {
        use clap::Parser;

        let partial = crate::cli::Cli::try_parse_from([
            "gamenet", "clients", "edit", "7", "--name", "PC-07b",
        ]);
        assert!(partial.is_err());

        let full = crate::cli::Cli::try_parse_from([
            "gamenet",
            "clients",
            "edit",
            "7",
            "--name",
            "PC-07b",
            "--vhd",
            "none",
            "--persistent",
            "false",
            "--boot-mode",
            "uefi",
            "--post-boot-script",
            "",
        ]);
        assert!(full.is_ok());
    }
}
