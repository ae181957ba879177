//! Dashboard overview: status counts, the client table and the traffic
//! summary.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;

use gamenet_core::{Client, Console, Controller, Dashboard, StatusCounts, TrafficSeries};

use crate::cli::{DashboardArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DashboardRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "VHD")]
    vhd: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl From<&Client> for DashboardRow {
    fn from(c: &Client) -> Self {
        Self {
            name: c.name.clone(),
            ip: c.ip_display().to_owned(),
            vhd: c.vhd_name.clone(),
            status: c.status_label(),
        }
    }
}

#[derive(Serialize)]
struct Overview<'a> {
    counts: StatusCounts,
    clients: &'a [Client],
    #[serde(skip_serializing_if = "Option::is_none")]
    traffic: Option<&'a TrafficSeries>,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

fn peak(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

fn traffic_summary(series: &TrafficSeries) -> String {
    let title = if series.simulated {
        "Traffic, last 24h (simulated):"
    } else {
        "Traffic, last 24h:"
    };
    [
        title.to_owned(),
        format!(
            "  Download  avg {:.1} Mbps  peak {:.1} Mbps",
            mean(&series.download),
            peak(&series.download)
        ),
        format!(
            "  Upload    avg {:.1} Mbps  peak {:.1} Mbps",
            mean(&series.upload),
            peak(&series.upload)
        ),
    ]
    .join("\n")
}

fn render_overview(overview: &Overview<'_>) -> String {
    let c = overview.counts;
    let mut sections = vec![
        format!(
            "Online: {}   Offline: {}   Total: {}",
            c.online, c.offline, c.total
        ),
        output::render_table(
            &overview
                .clients
                .iter()
                .map(DashboardRow::from)
                .collect::<Vec<_>>(),
        ),
    ];
    if let Some(series) = overview.traffic {
        sections.push(traffic_summary(series));
    }
    sections.join("\n\n")
}

pub async fn handle(
    controller: &Controller,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut dashboard = Dashboard::new();
    dashboard.update(&controller.fetch_status().await?);

    if !args.no_traffic {
        let series = Dashboard::load_traffic(Duration::ZERO).await;
        dashboard.traffic_mut().update(series);
    }

    let overview = Overview {
        counts: dashboard.counts(),
        clients: dashboard.clients(),
        traffic: dashboard.traffic().series.as_ref(),
    };
    let out = match global.output {
        OutputFormat::Plain => {
            let c = overview.counts;
            format!("{} {} {}", c.online, c.offline, c.total)
        }
        _ => output::render_single(&global.output, &overview, render_overview, |_| String::new())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_marks_simulated_series() {
        let series = TrafficSeries {
            download: vec![10.0, 20.0, 30.0],
            upload: vec![5.0, 5.0, 5.0],
            simulated: true,
        };
        let text = traffic_summary(&series);
        assert!(text.contains("(simulated)"));
        assert!(text.contains("avg 20.0 Mbps  peak 30.0 Mbps"));
        assert!(text.contains("avg 5.0 Mbps  peak 5.0 Mbps"));
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert!(mean(&[]).abs() < f64::EPSILON);
    }
}
