// ── Dashboard controller ──
//
// The dashboard shows a status table of every client, rebuilt wholesale
// from each poll snapshot, plus summary counts and a 24-hour traffic
// chart. The chart has no server feed: it is filled once, shortly after
// the page opens, with placeholder values flagged as simulated.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::command::Command;
use crate::console::Console;
use crate::model::{Client, ClientId};
use crate::notice::{Confirmation, PendingAction};

/// Number of hourly buckets in the traffic chart.
pub const TRAFFIC_BUCKETS: usize = 24;

/// Online/offline tallies for the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub online: usize,
    pub offline: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn tally(clients: &[Client]) -> Self {
        let online = clients.iter().filter(|c| c.is_online).count();
        Self {
            online,
            offline: clients.len() - online,
            total: clients.len(),
        }
    }
}

/// One chart series pair, one value per hourly bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSeries {
    pub download: Vec<f64>,
    pub upload: Vec<f64>,
    /// Placeholder data rather than measurements.
    pub simulated: bool,
}

/// The 24-hour traffic chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficChart {
    pub labels: Vec<String>,
    pub series: Option<TrafficSeries>,
}

impl Default for TrafficChart {
    fn default() -> Self {
        Self {
            labels: (0..TRAFFIC_BUCKETS).map(|h| format!("{h}:00")).collect(),
            series: None,
        }
    }
}

impl TrafficChart {
    pub fn update(&mut self, series: TrafficSeries) {
        self.series = Some(series);
    }

    pub fn is_filled(&self) -> bool {
        self.series.is_some()
    }
}

/// Placeholder traffic: download 10-60, upload 5-25 per bucket.
pub fn simulate_traffic<R: Rng + ?Sized>(rng: &mut R) -> TrafficSeries {
    let download = (0..TRAFFIC_BUCKETS)
        .map(|_| rng.random_range(10.0..60.0))
        .collect();
    let upload = (0..TRAFFIC_BUCKETS)
        .map(|_| rng.random_range(5.0..25.0))
        .collect();
    TrafficSeries {
        download,
        upload,
        simulated: true,
    }
}

/// Dashboard state.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    clients: Vec<Client>,
    counts: StatusCounts,
    traffic: TrafficChart,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the table and counts from a full status list.
    pub fn update(&mut self, clients: &[Client]) {
        self.clients = clients.to_vec();
        self.counts = StatusCounts::tally(clients);
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn counts(&self) -> StatusCounts {
        self.counts
    }

    pub fn traffic(&self) -> &TrafficChart {
        &self.traffic
    }

    pub fn traffic_mut(&mut self) -> &mut TrafficChart {
        &mut self.traffic
    }

    /// Prompt for a reboot. Offline clients have no reboot control.
    pub fn request_reboot(&self, id: &ClientId) -> Option<Confirmation> {
        let client = self.clients.iter().find(|c| &c.id == id)?;
        client.is_online.then(|| Confirmation {
            message: format!("Are you sure you want to reboot {}?", client.name),
            action: PendingAction::DashboardReboot { id: id.clone() },
        })
    }

    /// Send a reboot request.
    ///
    /// Returns the delay after which the caller should refresh status, or
    /// `None` when the request failed. Failure is logged and nothing else.
    pub async fn reboot<C: Console>(
        console: &C,
        id: &ClientId,
        refresh_delay: Duration,
    ) -> Option<Duration> {
        match console
            .execute(Command::RebootClient { id: id.clone() })
            .await
        {
            Ok(_) => {
                info!(%id, "reboot requested from dashboard");
                Some(refresh_delay)
            }
            Err(e) => {
                warn!(error = %e, %id, "dashboard reboot failed");
                None
            }
        }
    }

    /// Wait `delay`, then produce placeholder traffic for the chart.
    pub async fn load_traffic(delay: Duration) -> TrafficSeries {
        tokio::time::sleep(delay).await;
        simulate_traffic(&mut rand::rng())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::testing::{FakeConsole, Failure, client};

    #[test]
    fn update_rebuilds_table_and_counts() {
        let mut dash = Dashboard::new();
        dash.update(&[client(1, "A", true), client(2, "B", false), client(3, "C", true)]);
        assert_eq!(
            dash.counts(),
            StatusCounts {
                online: 2,
                offline: 1,
                total: 3
            }
        );

        dash.update(&[client(4, "D", false)]);
        assert_eq!(dash.clients().len(), 1);
        assert_eq!(dash.counts().online, 0);
    }

    #[test]
    fn reboot_prompt_names_client() {
        let mut dash = Dashboard::new();
        dash.update(&[client(1, "PC-01", true), client(2, "PC-02", false)]);

        let prompt = dash.request_reboot(&ClientId::from(1_u64)).unwrap();
        assert_eq!(prompt.message, "Are you sure you want to reboot PC-01?");
        assert_eq!(
            prompt.action,
            PendingAction::DashboardReboot {
                id: ClientId::from(1_u64)
            }
        );
        assert!(dash.request_reboot(&ClientId::from(2_u64)).is_none());
    }

    #[tokio::test]
    async fn reboot_refreshes_only_on_success() {
        let console = FakeConsole::default();
        let delay = Duration::from_secs(2);
        let id = ClientId::from(1_u64);

        assert_eq!(Dashboard::reboot(&console, &id, delay).await, Some(delay));

        console.fail_execute(Failure::Transport);
        assert_eq!(Dashboard::reboot(&console, &id, delay).await, None);
    }

    #[test]
    fn chart_has_hourly_labels() {
        let chart = TrafficChart::default();
        assert_eq!(chart.labels.len(), TRAFFIC_BUCKETS);
        assert_eq!(chart.labels[0], "0:00");
        assert_eq!(chart.labels[23], "23:00");
        assert!(!chart.is_filled());
    }

    #[test]
    fn simulated_traffic_is_flagged_and_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let series = simulate_traffic(&mut rng);
        assert!(series.simulated);
        assert_eq!(series.download.len(), TRAFFIC_BUCKETS);
        assert!(series.download.iter().all(|v| (10.0..60.0).contains(v)));
        assert!(series.upload.iter().all(|v| (5.0..25.0).contains(v)));
    }

    #[tokio::test(start_paused = true)]
    async fn traffic_loads_after_delay() {
        let mut dash = Dashboard::new();
        let series = Dashboard::load_traffic(Duration::from_secs(1)).await;
        dash.traffic_mut().update(series);
        assert!(dash.traffic().is_filled());
    }
}
