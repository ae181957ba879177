// ── Controller abstraction ──
//
// Lifecycle management for a management server connection. Handles
// login, command routing through a single processor task, and the HTTP
// side of the `Console` trait that page controllers and the status
// poller are written against.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{AuthCredentials, ControllerConfig, TlsVerification};
use crate::console::Console;
use crate::error::CoreError;
use crate::model::{Client, ClientId, ClientStats, VhdImage};
use crate::poller::StatusPoller;

use gamenet_api::models::{RecordId, StatsPayload};
use gamenet_api::transport::{TlsMode, TransportConfig};
use gamenet_api::ConsoleClient;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the HTTP session
/// and the command processor; reads go straight to the server.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    /// Token for the current connection; replaced on reconnect.
    cancel: Mutex<CancellationToken>,
    client: Mutex<Option<Arc<ConsoleClient>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to log in and start the
    /// command processor.
    pub fn new(config: ControllerConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel: Mutex::new(CancellationToken::new()),
                client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the server.
    ///
    /// Builds the HTTP client, logs in when credentials are configured,
    /// and spawns the command processor.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        let config = &self.inner.config;
        let transport = build_transport(config);

        let client = match ConsoleClient::new(config.url.clone(), &transport) {
            Ok(client) => client,
            Err(e) => {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                return Err(e.into());
            }
        };

        if let AuthCredentials::Credentials { username, password } = &config.auth {
            if let Err(e) = client.login(username, password).await {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                return Err(e.into());
            }
            debug!(username = %username, "session established");
        }

        *self.inner.client.lock().await = Some(Arc::new(client));

        let cancel = CancellationToken::new();
        *self.inner.cancel.lock().await = cancel.clone();

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let controller = self.clone();
            let handle = tokio::spawn(command_processor_task(controller, rx, cancel));
            self.inner.task_handles.lock().await.push(handle);
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!(url = %config.url, "connected to management server");
        Ok(())
    }

    /// Disconnect from the server.
    ///
    /// Stops the command processor, logs out if session-based, and resets
    /// the connection state to [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        self.inner.cancel.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        if matches!(self.inner.config.auth, AuthCredentials::Credentials { .. }) {
            if let Some(ref client) = *self.inner.client.lock().await {
                if let Err(e) = client.logout().await {
                    warn!(error = %e, "logout failed (non-fatal)");
                }
            }
        }

        *self.inner.client.lock().await = None;

        // The previous receiver was consumed by the processor task.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the server.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::Disconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// A status poller over this connection, using the configured
    /// interval. It stops when the connection is closed.
    pub async fn poller(&self) -> StatusPoller<Controller> {
        let cancel = self.inner.cancel.lock().await.child_token();
        StatusPoller::new(self.clone(), self.inner.config.poll_interval, cancel)
    }

    async fn client(&self) -> Result<Arc<ConsoleClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)
    }
}

// ── Reads ────────────────────────────────────────────────────────

impl Console for Controller {
    async fn fetch_status(&self) -> Result<Vec<Client>, CoreError> {
        let client = self.client().await?;
        let records = client.list_client_status().await?;
        Ok(records.into_iter().map(Client::from).collect())
    }

    async fn fetch_stats(&self, id: &ClientId) -> Result<Option<ClientStats>, CoreError> {
        let client = self.client().await?;
        match client.client_stats(&RecordId::from(id)).await? {
            StatsPayload::Stats(record) => Ok(Some(ClientStats::from(record))),
            StatsPayload::Error(body) => {
                debug!(%id, error = %body.error, "server has no stats for client");
                Ok(None)
            }
        }
    }

    async fn fetch_vhds(&self) -> Result<Vec<VhdImage>, CoreError> {
        let client = self.client().await?;
        let attrs = client.list_vhds().await?;
        Ok(attrs.into_iter().map(VhdImage::from).collect())
    }

    async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        Controller::execute(self, command).await
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Process commands from the mpsc channel, one at a time.
async fn command_processor_task(
    controller: Controller,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to the matching form endpoint.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client().await?;
    let description = cmd.describe();

    let result = match cmd {
        // ── Client operations ────────────────────────────────────
        Command::RebootClient { id } => client.reboot_client(&RecordId::from(&id)).await,
        Command::DeleteClient { id } => client.delete_client(&RecordId::from(&id)).await,
        Command::AddClient(form) => client.add_client(&form).await,
        Command::EditClient { id, form } => {
            client.edit_client(&RecordId::from(&id), &form).await
        }

        // ── VHD operations ───────────────────────────────────────
        Command::AddVhd(form) => client.add_vhd(&form).await,
        Command::EditVhd { id, form } => client.edit_vhd(&RecordId::from(&id), &form).await,
        Command::DeleteVhd { id } => client.delete_vhd(&RecordId::from(&id)).await,
        Command::CloneVhd { id, new_name } => {
            client.clone_vhd(&RecordId::from(&id), &new_name).await
        }
    };

    match result {
        Ok(()) => {
            debug!(command = %description, "command accepted");
            Ok(CommandResult::Ok)
        }
        Err(e) => {
            warn!(command = %description, error = %e, "command failed");
            Err(e.into())
        }
    }
}

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        cookie_jar: None, // ConsoleClient::new adds one automatically
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
