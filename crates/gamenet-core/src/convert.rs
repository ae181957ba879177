// ── API-to-domain type conversions ──
//
// Bridges raw `gamenet_api` wire types into canonical `gamenet_core::model`
// domain types. Each `From` impl normalizes ids, parses strings into
// strong types, and fills defaults for missing optional data.

use chrono::{DateTime, NaiveDateTime, Utc};

use gamenet_api::models::{ClientStatsRecord, ClientStatusRecord, RecordId, VhdAttributes};

use crate::model::{Client, ClientId, ClientStats, VhdId, VhdImage};

// ── Helpers ────────────────────────────────────────────────────────

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse the timestamp shapes the server renders: ISO-8601 with or without
/// an offset, or Python's `str(datetime)` form. Blank or unreadable input
/// gives `None`.
pub(crate) fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// The server records sample times with `utcnow()`, so naive values are UTC.
fn parse_utc(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_naive).map(|n| n.and_utc())
}

/// `data-vhd-template` / `data-vhd-locked` are true only when exactly `true`.
fn attr_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Clients ─────────────────────────────────────────────────────────

impl From<ClientStatusRecord> for Client {
    fn from(r: ClientStatusRecord) -> Self {
        Self {
            id: ClientId::new(r.id.as_key()),
            name: r.name,
            mac_address: r.mac_address,
            ip_address: non_empty(r.ip_address),
            vhd_name: r.vhd_name,
            is_online: r.is_online,
        }
    }
}

impl From<&ClientId> for RecordId {
    fn from(id: &ClientId) -> Self {
        match id.as_str().parse::<u64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(id.as_str().to_owned()),
        }
    }
}

impl From<ClientStatsRecord> for ClientStats {
    fn from(r: ClientStatsRecord) -> Self {
        Self {
            cpu_usage: r.cpu_usage.unwrap_or_default(),
            memory_usage_mb: r.memory_usage_mb.unwrap_or_default(),
            network_rx_mbps: r.network_rx_mbps.unwrap_or_default(),
            network_tx_mbps: r.network_tx_mbps.unwrap_or_default(),
            timestamp: parse_utc(r.timestamp.as_deref()).unwrap_or_else(Utc::now),
        }
    }
}

// ── VHD images ──────────────────────────────────────────────────────

impl From<VhdAttributes> for VhdImage {
    fn from(a: VhdAttributes) -> Self {
        Self {
            id: VhdId::new(&a.id),
            name: a.name,
            description: non_empty(a.description),
            size: a.size.unwrap_or_default(),
            file_path: non_empty(a.path),
            windows_version: non_empty(a.windows),
            is_template: attr_flag(a.template.as_deref()),
            is_locked: attr_flag(a.locked.as_deref()),
            created_at: a.created.as_deref().and_then(parse_naive),
            modified_at: a.modified.as_deref().and_then(parse_naive),
        }
    }
}

impl From<&VhdId> for RecordId {
    fn from(id: &VhdId) -> Self {
        match id.as_str().parse::<u64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(id.as_str().to_owned()),
        }
    }
}
