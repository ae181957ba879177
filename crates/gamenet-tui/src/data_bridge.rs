//! Data bridge: connects the controller's status poller to TUI actions.
//!
//! Runs as a background task. Connects, starts the poller, then forwards
//! every published snapshot and connection-state change as an [`Action`].
//! Refresh requests from the app come back in over a second channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use gamenet_core::{Console, ConnectionState, Controller, Dashboard, Notice};

use crate::action::Action;

/// Requests from the app loop to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeRequest {
    /// One-off status fetch after the delay.
    Refresh(Duration),
    ReloadVhds,
}

pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    mut requests: mpsc::UnboundedReceiver<BridgeRequest>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::Connecting);

    if let Err(e) = controller.connect().await {
        warn!(error = %e, "failed to connect to management server");
        let _ = action_tx.send(Action::Disconnected(format!("{e}")));
        return;
    }

    let _ = action_tx.send(Action::Connected);

    let poller = controller.poller().await;
    let mut snapshots = poller.subscribe();
    let mut conn_state = controller.connection_state();
    let poll_task = poller.start();

    reload_vhds(&controller, &action_tx).await;

    // The chart fills once, after a short delay, with placeholder data.
    let traffic_delay = controller.config().traffic_delay;
    let traffic_tx = action_tx.clone();
    tokio::spawn(async move {
        let series = Dashboard::load_traffic(traffic_delay).await;
        let _ = traffic_tx.send(Action::TrafficLoaded(series));
    });

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = snapshots.changed() => {
                let snapshot = snapshots.borrow_and_update().clone();
                debug!(sequence = snapshot.sequence, "dispatching StatusUpdated");
                let _ = action_tx.send(Action::StatusUpdated(snapshot));
            }

            Some(request) = requests.recv() => match request {
                BridgeRequest::Refresh(delay) => {
                    poller.refresh_after(delay);
                }
                BridgeRequest::ReloadVhds => reload_vhds(&controller, &action_tx).await,
            },

            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                match state {
                    ConnectionState::Connected => {
                        let _ = action_tx.send(Action::Connected);
                    }
                    ConnectionState::Connecting => {
                        let _ = action_tx.send(Action::Connecting);
                    }
                    ConnectionState::Disconnected => {
                        let _ = action_tx.send(Action::Disconnected("disconnected".into()));
                    }
                    ConnectionState::Failed => {
                        let _ = action_tx.send(Action::Disconnected("connection failed".into()));
                    }
                }
            }
        }
    }

    controller.disconnect().await;
    let _ = poll_task.await;
    debug!("data bridge shut down");
}

async fn reload_vhds(controller: &Controller, action_tx: &mpsc::UnboundedSender<Action>) {
    match controller.fetch_vhds().await {
        Ok(images) => {
            let _ = action_tx.send(Action::VhdsLoaded(images));
        }
        Err(e) => {
            warn!(error = %e, "loading VHD images failed");
            let _ = action_tx.send(Action::Notify(Notice::error(format!(
                "Error loading VHD images: {e}"
            ))));
        }
    }
}
