// Wire types for the management server.
//
// JSON records mirror the `/api/clients/*` payloads. Form types mirror
// the HTML forms the server accepts; boolean checkboxes are omitted when
// false because the server treats field presence as `true`.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier as emitted by the server: a JSON number or a string.
///
/// Ids are compared loosely, so `5` and `"5"` are the same record.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl RecordId {
    /// Canonical textual form used for comparison and URL building.
    pub fn as_key(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        }
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl Eq for RecordId {}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

fn no_vhd_assigned() -> String {
    "No VHD assigned".into()
}

/// One row of `GET /api/clients/status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientStatusRecord {
    pub id: RecordId,
    pub name: String,
    pub mac_address: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default = "no_vhd_assigned")]
    pub vhd_name: String,
}

/// Successful body of `GET /api/clients/stats/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientStatsRecord {
    #[serde(default)]
    pub cpu_usage: Option<f64>,
    #[serde(default)]
    pub memory_usage_mb: Option<f64>,
    #[serde(default)]
    pub network_rx_mbps: Option<f64>,
    #[serde(default)]
    pub network_tx_mbps: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `{ "error": "..." }` body the stats endpoint sends when it has nothing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsErrorRecord {
    pub error: String,
}

/// Either shape the stats endpoint may answer with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StatsPayload {
    Error(StatsErrorRecord),
    Stats(ClientStatsRecord),
}

/// `data-vhd-*` attributes attached to one row of the `/vhd` page.
///
/// Values are raw attribute strings; interpretation happens in core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VhdAttributes {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub size: Option<String>,
    pub path: Option<String>,
    pub windows: Option<String>,
    pub template: Option<String>,
    pub locked: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

// ── Forms ───────────────────────────────────────────────────────────

/// Firmware boot mode offered to a diskless client.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum BootMode {
    #[default]
    #[serde(rename = "UEFI")]
    #[strum(serialize = "UEFI")]
    Uefi,
    Legacy,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Body of `POST /clients/add` and `POST /clients/edit/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientForm {
    pub name: String,
    pub mac_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vhd_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_persistent: bool,
    pub boot_mode: BootMode,
    /// Only honoured by the edit endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_boot_script: Option<String>,
}

/// Body of `POST /vhd/add`.
#[derive(Debug, Clone, Serialize)]
pub struct VhdForm {
    pub name: String,
    pub description: String,
    pub size_gb: f64,
    pub windows_version: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_template: bool,
}

impl Default for VhdForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            size_gb: 50.0,
            windows_version: String::new(),
            is_template: false,
        }
    }
}

/// Body of `POST /vhd/edit/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VhdEditForm {
    pub name: String,
    pub description: String,
    pub windows_version: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_template: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_locked: bool,
}

/// Body of `POST /vhd/clone/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct CloneForm {
    pub new_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_id_compares_loosely() {
        let num: RecordId = serde_json::from_str("5").unwrap();
        let text: RecordId = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(num, text);
        assert_eq!(num.to_string(), "5");
    }

    #[test]
    fn status_record_defaults_vhd_name() {
        let record: ClientStatusRecord = serde_json::from_str(
            r#"{"id": 1, "name": "PC-01", "mac_address": "AA:BB:CC:DD:EE:FF", "ip_address": null, "is_online": false}"#,
        )
        .unwrap();
        assert_eq!(record.vhd_name, "No VHD assigned");
        assert!(record.ip_address.is_none());
    }

    #[test]
    fn stats_payload_detects_error_shape() {
        let payload: StatsPayload =
            serde_json::from_str(r#"{"error": "No stats available for this client"}"#).unwrap();
        assert!(matches!(payload, StatsPayload::Error(_)));

        let payload: StatsPayload = serde_json::from_str(
            r#"{"cpu_usage": 12.5, "memory_usage_mb": 2048, "network_rx_mbps": 1.0, "network_tx_mbps": 0.5, "timestamp": "2024-06-15T10:30:00"}"#,
        )
        .unwrap();
        assert!(matches!(payload, StatsPayload::Stats(_)));
    }

    #[test]
    fn false_checkboxes_are_omitted() {
        let form = VhdEditForm {
            name: "Win10".into(),
            is_locked: true,
            ..VhdEditForm::default()
        };
        let value = serde_json::to_value(&form).unwrap();
        assert!(value.get("is_template").is_none());
        assert_eq!(value["is_locked"], serde_json::json!(true));
    }

    #[test]
    fn boot_mode_wire_names() {
        assert_eq!(BootMode::Uefi.to_string(), "UEFI");
        assert_eq!("legacy".parse::<BootMode>().unwrap(), BootMode::Legacy);
        assert_eq!(serde_json::to_value(BootMode::Uefi).unwrap(), "UEFI");
    }
}
