// ── Domain model ──
//
// Canonical representations of OLT inventory and ONU state. Wire field
// names (`SN`, `FSP`, `VendorSN`, ...) stop at the API crate; everything
// here uses descriptive names.

pub mod device;
pub mod fsp;
pub mod onu;
pub mod optical;

pub use device::{Device, DeviceStatus, ServiceProfile};
pub use fsp::Fsp;
pub use onu::{OnuCandidate, OnuStatus, RegistrationRequest, SearchResult};
pub use optical::{OpticalReading, OpticalTarget};
