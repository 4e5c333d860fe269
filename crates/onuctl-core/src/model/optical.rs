// ── Optical telemetry ──

use serde::{Deserialize, Serialize};

/// The `(fsp, ontid)` pair a reading is requested for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpticalTarget {
    pub fsp: String,
    pub ontid: String,
}

/// Receive power in dBm, tagged with the ONU it was read from.
///
/// Either side may be absent when the OLT has no measurement (ONU offline,
/// LOS, or an optics module without DDM).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalReading {
    pub target: OpticalTarget,
    pub onu_rx: Option<f64>,
    pub olt_rx: Option<f64>,
}
