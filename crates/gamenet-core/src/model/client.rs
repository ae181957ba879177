// ── Diskless client domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a registered client.
///
/// Ids arrive as JSON numbers from the status API and as strings from UI
/// attributes; both are normalised to the same text so `5` and `"5"` are
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for ClientId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// A diskless client as reported by the server's status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub mac_address: String,
    /// Present only while the client is online.
    pub ip_address: Option<String>,
    pub vhd_name: String,
    pub is_online: bool,
}

impl Client {
    /// IP address cell text: the address, or `-` when there is none.
    pub fn ip_display(&self) -> &str {
        self.ip_address.as_deref().unwrap_or("-")
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_online { "Online" } else { "Offline" }
    }
}

/// One performance sample for a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientStats {
    pub cpu_usage: f64,
    pub memory_usage_mb: f64,
    pub network_rx_mbps: f64,
    pub network_tx_mbps: f64,
    pub timestamp: DateTime<Utc>,
}

impl ClientStats {
    /// `37.5%`
    pub fn cpu_display(&self) -> String {
        format!("{:.1}%", self.cpu_usage)
    }

    /// Memory in gigabytes, `2.5 GB`.
    pub fn memory_display(&self) -> String {
        format!("{:.1} GB", self.memory_usage_mb / 1024.0)
    }

    pub fn download_display(&self) -> String {
        format!("{:.1} Mbps", self.network_rx_mbps)
    }

    pub fn upload_display(&self) -> String {
        format!("{:.1} Mbps", self.network_tx_mbps)
    }

    /// Local wall-clock time of the sample.
    pub fn updated_display(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_normalise_numbers_and_strings() {
        assert_eq!(ClientId::from(5_u64), ClientId::from("5"));
        assert_eq!(ClientId::from(" 5 "), ClientId::from("5"));
    }

    #[test]
    fn stats_display_formats() {
        let stats = ClientStats {
            cpu_usage: 37.26,
            memory_usage_mb: 2560.0,
            network_rx_mbps: 12.0,
            network_tx_mbps: 0.44,
            timestamp: Utc::now(),
        };
        assert_eq!(stats.cpu_display(), "37.3%");
        assert_eq!(stats.memory_display(), "2.5 GB");
        assert_eq!(stats.download_display(), "12.0 Mbps");
        assert_eq!(stats.upload_display(), "0.4 Mbps");
    }
}
