// ── ONU domain types ──

use serde::{Deserialize, Serialize};
use strum::Display;

use super::device::ServiceProfile;
use super::fsp::Fsp;

/// Live status of a registered ONU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OnuStatus {
    Online,
    Offline,
}

impl OnuStatus {
    /// Anything other than `online` (case-insensitive) is offline.
    pub fn from_remote(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("online") => Self::Online,
            _ => Self::Offline,
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// An unregistered ONU reported by an autofind scan.
///
/// `ontid` stays `None` until a registration assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnuCandidate {
    pub number: Option<String>,
    pub serial_number: String,
    pub vendor_serial: Option<String>,
    pub fsp: String,
    pub ontid: Option<String>,
    pub model: Option<String>,
    pub vendor_id: Option<String>,
}

impl OnuCandidate {
    /// A bare candidate for manual registration without a prior scan.
    pub fn manual(serial_number: impl Into<String>, fsp: impl Into<String>) -> Self {
        Self {
            number: None,
            serial_number: serial_number.into(),
            vendor_serial: None,
            fsp: fsp.into(),
            ontid: None,
            model: None,
            vendor_id: None,
        }
    }
}

/// A registered ONU found by serial-number lookup.
///
/// Reflects the OLT at lookup time only; re-fetch after any mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub status: OnuStatus,
    pub description: Option<String>,
    pub fsp: Option<String>,
    pub serial_number: Option<String>,
    pub ontid: Option<String>,
    pub vendor_serial: Option<String>,
    pub line_profile: Option<String>,
}

/// A validated registration, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    pub description: String,
    pub serial_number: String,
    pub fsp: Fsp,
    pub native_vlan: bool,
    pub service: ServiceProfile,
}
