// onuctl-core: ONU provisioning and diagnostics orchestration on top of onuctl-api.

pub mod config;
pub mod convert;
pub mod discovery;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod model;
pub mod optical;
pub mod orchestrator;
pub mod provision;
pub mod search;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{OltConfig, TlsVerification};
pub use discovery::{DiscoveryScanner, ScanOutcome};
pub use error::CoreError;
pub use inventory::Inventory;
pub use lifecycle::{LifecycleAction, LifecycleController, LifecycleOp, LifecycleState, PendingAction};
pub use optical::{FetchOutcome, OpticalPoller, OpticalState};
pub use orchestrator::Orchestrator;
pub use provision::{
    ConflictCheck, ConflictResolver, DeleteAttempt, ProvisionInput, ProvisionReport, Registrar,
};
pub use search::SearchEngine;
pub use session::{Session, SessionManager, TOKEN_TTL};

pub use model::{
    Device, DeviceStatus, Fsp, OnuCandidate, OnuStatus, OpticalReading, OpticalTarget,
    RegistrationRequest, SearchResult, ServiceProfile,
};
