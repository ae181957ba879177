// In-memory `Console` used by unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::command::{Command, CommandResult};
use crate::console::Console;
use crate::error::CoreError;
use crate::model::{Client, ClientId, ClientStats, VhdId, VhdImage};

pub(crate) fn client(id: u64, name: &str, online: bool) -> Client {
    Client {
        id: ClientId::from(id),
        name: name.into(),
        mac_address: format!("AA:BB:CC:DD:EE:{id:02X}"),
        ip_address: online.then(|| format!("10.0.0.{id}")),
        vhd_name: "Win10 Gaming".into(),
        is_online: online,
    }
}

pub(crate) fn vhd(id: &str, name: &str, locked: bool) -> VhdImage {
    VhdImage {
        id: VhdId::from(id),
        name: name.into(),
        description: None,
        size: "50.0".into(),
        file_path: Some(format!("/srv/vhd/{name}.vhdx")),
        windows_version: Some("Windows 10".into()),
        is_template: false,
        is_locked: locked,
        created_at: None,
        modified_at: None,
    }
}

pub(crate) fn sample() -> ClientStats {
    ClientStats {
        cpu_usage: 42.0,
        memory_usage_mb: 2048.0,
        network_rx_mbps: 3.0,
        network_tx_mbps: 1.0,
        timestamp: Utc::now(),
    }
}

/// One scripted answer to `fetch_status`.
pub(crate) enum StatusReply {
    After(Duration, Vec<Client>),
    Fail,
    Hang,
}

/// How a scripted failure presents.
#[derive(Clone, Copy)]
pub(crate) enum Failure {
    Transport,
    Rejected,
}

impl Failure {
    fn error(self) -> CoreError {
        match self {
            Self::Transport => CoreError::ConnectionFailed {
                url: "http://fake".into(),
                reason: "connection refused".into(),
            },
            Self::Rejected => CoreError::Rejected {
                message: "HTTP 500".into(),
            },
        }
    }
}

#[derive(Default)]
struct FakeInner {
    clients: Mutex<Vec<Client>>,
    script: Mutex<VecDeque<StatusReply>>,
    status_fails: Mutex<bool>,
    stats: Mutex<HashMap<ClientId, Option<ClientStats>>>,
    stats_fail: Mutex<bool>,
    vhds: Mutex<Vec<VhdImage>>,
    executed: Mutex<Vec<Command>>,
    execute_failure: Mutex<Option<Failure>>,
    status_calls: AtomicUsize,
}

#[derive(Clone, Default)]
pub(crate) struct FakeConsole {
    inner: Arc<FakeInner>,
}

impl FakeConsole {
    pub fn with_clients(clients: Vec<Client>) -> Self {
        let fake = Self::default();
        *fake.inner.clients.lock().unwrap() = clients;
        fake
    }

    pub fn set_clients(&self, clients: Vec<Client>) {
        *self.inner.clients.lock().unwrap() = clients;
    }

    pub fn set_vhds(&self, vhds: Vec<VhdImage>) {
        *self.inner.vhds.lock().unwrap() = vhds;
    }

    pub fn set_stats(&self, id: u64, stats: Option<ClientStats>) {
        self.inner
            .stats
            .lock()
            .unwrap()
            .insert(ClientId::from(id), stats);
    }

    pub fn fail_status(&self) {
        *self.inner.status_fails.lock().unwrap() = true;
    }

    pub fn fail_stats(&self) {
        *self.inner.stats_fail.lock().unwrap() = true;
    }

    pub fn fail_execute(&self, failure: Failure) {
        *self.inner.execute_failure.lock().unwrap() = Some(failure);
    }

    pub fn script_status(&self, replies: impl IntoIterator<Item = StatusReply>) {
        self.inner.script.lock().unwrap().extend(replies);
    }

    pub fn status_calls(&self) -> usize {
        self.inner.status_calls.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<Command> {
        self.inner.executed.lock().unwrap().clone()
    }
}

impl Console for FakeConsole {
    async fn fetch_status(&self) -> Result<Vec<Client>, CoreError> {
        self.inner.status_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.inner.script.lock().unwrap().pop_front();
        match reply {
            Some(StatusReply::After(delay, clients)) => {
                tokio::time::sleep(delay).await;
                Ok(clients)
            }
            Some(StatusReply::Fail) => Err(Failure::Transport.error()),
            Some(StatusReply::Hang) => std::future::pending().await,
            None => {
                if *self.inner.status_fails.lock().unwrap() {
                    return Err(Failure::Transport.error());
                }
                Ok(self.inner.clients.lock().unwrap().clone())
            }
        }
    }

    async fn fetch_stats(&self, id: &ClientId) -> Result<Option<ClientStats>, CoreError> {
        if *self.inner.stats_fail.lock().unwrap() {
            return Err(Failure::Transport.error());
        }
        let found = self.inner.stats.lock().unwrap().get(id).cloned();
        match found {
            Some(stats) => Ok(stats),
            None => Err(CoreError::NotFound {
                entity_type: "stats".into(),
                identifier: id.to_string(),
            }),
        }
    }

    async fn fetch_vhds(&self) -> Result<Vec<VhdImage>, CoreError> {
        Ok(self.inner.vhds.lock().unwrap().clone())
    }

    async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        let failure = *self.inner.execute_failure.lock().unwrap();
        if let Some(failure) = failure {
            return Err(failure.error());
        }
        self.inner.executed.lock().unwrap().push(command);
        Ok(CommandResult::Ok)
    }
}
