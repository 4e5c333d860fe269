// ── API-to-domain type conversions ──
//
// Bridges `onuctl_api::types` wire records into `onuctl_core::model` types
// and back for request bodies. Field renaming only; no values are invented
// beyond defaults for fields the server omitted.

use onuctl_api::types::{
    AddOnuRequest, AutofindRecord, DeleteOnuRequest, DeviceRecord, OnuLocator, OpticalRecord,
    ServiceRecord, SnRecord,
};

use crate::model::{
    Device, DeviceStatus, OnuCandidate, OnuStatus, OpticalReading, OpticalTarget,
    RegistrationRequest, SearchResult, ServiceProfile,
};

// ── Inventory ──────────────────────────────────────────────────────

/// Devices start offline; the status side-channel promotes them.
impl From<DeviceRecord> for Device {
    fn from(rec: DeviceRecord) -> Self {
        Self {
            id: rec.id,
            name: rec.name,
            vendor: rec.vendor,
            model: rec.model,
            status: DeviceStatus::Offline,
        }
    }
}

impl From<ServiceRecord> for ServiceProfile {
    fn from(rec: ServiceRecord) -> Self {
        Self {
            id: rec.id,
            vlan_tag: rec.vlan,
        }
    }
}

// ── ONU ────────────────────────────────────────────────────────────

impl From<AutofindRecord> for OnuCandidate {
    fn from(rec: AutofindRecord) -> Self {
        Self {
            number: rec.number,
            serial_number: rec.sn,
            vendor_serial: rec.vendor_sn,
            fsp: rec.fsp,
            ontid: rec.ontid,
            model: rec.model,
            vendor_id: rec.vendor_id,
        }
    }
}

impl From<SnRecord> for SearchResult {
    fn from(rec: SnRecord) -> Self {
        Self {
            status: OnuStatus::from_remote(rec.status.as_deref()),
            description: rec.description,
            fsp: rec.fsp,
            serial_number: rec.sn,
            ontid: rec.ontid,
            vendor_serial: rec.vendor_sn,
            line_profile: rec.line_profile,
        }
    }
}

impl From<&RegistrationRequest> for AddOnuRequest {
    fn from(req: &RegistrationRequest) -> Self {
        Self {
            description: req.description.clone(),
            sn: req.serial_number.clone(),
            fsp: req.fsp.to_string(),
            nativevlan: req.native_vlan,
            service_id: req.service.id,
            interface: req.fsp.interface(),
            port: req.fsp.port().to_owned(),
        }
    }
}

/// Delete body for a stale registration: the candidate's serial plus the
/// location and description the OLT reported for it.
pub(crate) fn stale_delete_request(serial_number: &str, stale: &SearchResult) -> DeleteOnuRequest {
    DeleteOnuRequest::Record {
        sn: serial_number.to_owned(),
        ontid: stale.ontid.clone().unwrap_or_default(),
        fsp: stale.fsp.clone().unwrap_or_default(),
        description: stale.description.clone().unwrap_or_default(),
    }
}

// ── Optical ────────────────────────────────────────────────────────

impl From<&OpticalTarget> for OnuLocator {
    fn from(target: &OpticalTarget) -> Self {
        Self {
            fsp: target.fsp.clone(),
            ontid: target.ontid.clone(),
        }
    }
}

pub(crate) fn optical_reading(target: OpticalTarget, rec: OpticalRecord) -> OpticalReading {
    OpticalReading {
        target,
        onu_rx: rec.onu_rx,
        olt_rx: rec.olt_rx,
    }
}
