// ── Client stats panel state ──
//
// A detail panel for an online client shows a stats section that starts
// out loading and is filled by a second request. When the server has no
// sample (or the request fails) the panel is still filled, either with
// labelled placeholder values or an explicit "not available" state.

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::config::StatsFallback;
use crate::error::CoreError;
use crate::model::ClientStats;

pub const STATS_UNAVAILABLE_MESSAGE: &str = "Statistics are not available for this client.";

/// What the stats section of a client detail panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsView {
    /// Request in flight.
    Loading,
    /// A real sample from the server.
    Live(ClientStats),
    /// Placeholder values; always rendered with a "simulated" label.
    Simulated(ClientStats),
    /// No sample and no placeholder.
    Unavailable,
}

impl StatsView {
    /// Resolve a stats fetch into a view.
    ///
    /// `Ok(None)` is a 2xx answer carrying an `{error}` body.
    pub fn resolve(
        result: Result<Option<ClientStats>, CoreError>,
        fallback: StatsFallback,
    ) -> Self {
        Self::resolve_with(result, fallback, &mut rand::rng())
    }

    /// [`resolve`](Self::resolve) with an explicit random source.
    pub fn resolve_with<R: Rng + ?Sized>(
        result: Result<Option<ClientStats>, CoreError>,
        fallback: StatsFallback,
        rng: &mut R,
    ) -> Self {
        match result {
            Ok(Some(stats)) => Self::Live(stats),
            Ok(None) => {
                debug!("server has no stats sample");
                Self::fallback(fallback, rng)
            }
            Err(e) => {
                debug!(error = %e, "stats fetch failed");
                Self::fallback(fallback, rng)
            }
        }
    }

    fn fallback<R: Rng + ?Sized>(policy: StatsFallback, rng: &mut R) -> Self {
        match policy {
            StatsFallback::Simulated => Self::Simulated(simulate(rng)),
            StatsFallback::Unavailable => Self::Unavailable,
        }
    }

    /// The sample to display, real or simulated.
    pub fn stats(&self) -> Option<&ClientStats> {
        match self {
            Self::Live(s) | Self::Simulated(s) => Some(s),
            Self::Loading | Self::Unavailable => None,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated(_))
    }
}

/// Placeholder sample: CPU 10-60 %, memory 1-3 GB, download 0-20 Mbps,
/// upload 0-5 Mbps, stamped now.
pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> ClientStats {
    ClientStats {
        cpu_usage: rng.random_range(10.0..60.0),
        memory_usage_mb: rng.random_range(1024.0..3072.0),
        network_rx_mbps: rng.random_range(0.0..20.0),
        network_tx_mbps: rng.random_range(0.0..5.0),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn failure() -> CoreError {
        CoreError::ConnectionFailed {
            url: "http://10.0.0.1:5000".into(),
            reason: "connection refused".into(),
        }
    }

    #[test]
    fn failure_with_simulated_policy_fills_every_field() {
        let mut rng = StdRng::seed_from_u64(7);
        let view = StatsView::resolve_with(Err(failure()), StatsFallback::Simulated, &mut rng);

        assert!(view.is_simulated());
        let stats = view.stats().expect("simulated stats");
        assert!((10.0..60.0).contains(&stats.cpu_usage));
        assert!((1024.0..3072.0).contains(&stats.memory_usage_mb));
        assert!((0.0..20.0).contains(&stats.network_rx_mbps));
        assert!((0.0..5.0).contains(&stats.network_tx_mbps));
        for text in [
            stats.cpu_display(),
            stats.memory_display(),
            stats.download_display(),
            stats.upload_display(),
        ] {
            assert!(text.chars().next().is_some_and(|c| c.is_ascii_digit()), "{text}");
        }
    }

    #[test]
    fn error_payload_falls_back_too() {
        let mut rng = StdRng::seed_from_u64(1);
        let view = StatsView::resolve_with(Ok(None), StatsFallback::Simulated, &mut rng);
        assert!(view.is_simulated());
    }

    #[test]
    fn unavailable_policy_shows_no_numbers() {
        let mut rng = StdRng::seed_from_u64(1);
        let view = StatsView::resolve_with(Err(failure()), StatsFallback::Unavailable, &mut rng);
        assert_eq!(view, StatsView::Unavailable);
        assert!(view.stats().is_none());
    }

    #[test]
    fn live_sample_is_kept() {
        let sample = ClientStats {
            cpu_usage: 5.0,
            memory_usage_mb: 512.0,
            network_rx_mbps: 1.0,
            network_tx_mbps: 1.0,
            timestamp: Utc::now(),
        };
        let view = StatsView::resolve(Ok(Some(sample.clone())), StatsFallback::Unavailable);
        assert_eq!(view, StatsView::Live(sample));
    }
}
