// ── VHD image domain types ──

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier of a VHD image, compared loosely like [`ClientId`](super::ClientId).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VhdId(String);

impl VhdId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VhdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VhdId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A virtual hard disk image served to diskless clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VhdImage {
    pub id: VhdId,
    pub name: String,
    pub description: Option<String>,
    /// Raw size text as rendered by the server (e.g. `80.0`).
    pub size: String,
    pub file_path: Option<String>,
    pub windows_version: Option<String>,
    pub is_template: bool,
    /// Locked images cannot be deleted.
    pub is_locked: bool,
    pub created_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
}

impl VhdImage {
    /// Size in gigabytes, if the server rendered a number.
    pub fn size_gb(&self) -> Option<f64> {
        self.size.trim().parse().ok()
    }

    /// `80.0 GB`, or `Unknown` when the page carried no size.
    pub fn size_display(&self) -> String {
        match self.size.trim() {
            "" => "Unknown".to_owned(),
            size => format!("{size} GB"),
        }
    }

    pub fn description_display(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "No description",
        }
    }

    pub fn windows_display(&self) -> &str {
        match self.windows_version.as_deref() {
            Some(w) if !w.is_empty() => w,
            _ => "Unknown",
        }
    }
}

/// Render a timestamp, or `Unknown` when it was missing or unreadable.
pub fn timestamp_display(ts: Option<&NaiveDateTime>) -> String {
    ts.map_or_else(
        || "Unknown".to_owned(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}
