// ── OLT inventory types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Reachability of an OLT as reported by its status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// An OLT managed through the device-control API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub status: DeviceStatus,
}

/// A service profile (VLAN binding) available on one OLT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceProfile {
    pub id: u32,
    pub vlan_tag: u16,
}
