// ── Orchestrator facade ──
//
// Single entry point for front ends. Owns one API client and the session
// for it, and wires every component to that client. Each operation pulls
// the current session (tearing it down if the TTL lapsed), runs the
// component, and drops the session again if the server rejected the token.

use std::sync::Arc;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use onuctl_api::transport::{TlsMode, TransportConfig};
use onuctl_api::OltClient;

use crate::config::{OltConfig, TlsVerification};
use crate::discovery::{DiscoveryScanner, ScanOutcome};
use crate::error::CoreError;
use crate::inventory::Inventory;
use crate::lifecycle::{LifecycleAction, LifecycleController, PendingAction};
use crate::model::{Device, SearchResult, ServiceProfile};
use crate::optical::{FetchOutcome, OpticalPoller};
use crate::provision::{ProvisionInput, ProvisionReport, Registrar};
use crate::search::SearchEngine;
use crate::session::{Session, SessionManager};

/// Cheaply cloneable handle to every orchestrator component.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    config: OltConfig,
    sessions: SessionManager,
    inventory: Inventory,
    scanner: DiscoveryScanner,
    search: SearchEngine,
    registrar: Registrar,
    optical: OpticalPoller,
    lifecycle: LifecycleController,
}

impl Orchestrator {
    /// Build the API client from `config` and wire up every component.
    /// Makes no network calls.
    pub fn new(config: OltConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = OltClient::new(config.url.as_str(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client (tests, custom transports).
    pub fn with_client(config: OltConfig, client: OltClient) -> Self {
        Self {
            inner: Arc::new(OrchestratorInner {
                sessions: SessionManager::new(client.clone(), config.login_timeout),
                inventory: Inventory::new(client.clone()),
                scanner: DiscoveryScanner::new(client.clone(), config.scan_timeout),
                search: SearchEngine::new(client.clone()),
                registrar: Registrar::new(client.clone()),
                optical: OpticalPoller::new(client.clone()),
                lifecycle: LifecycleController::new(client),
                config,
            }),
        }
    }

    pub fn config(&self) -> &OltConfig {
        &self.inner.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    pub fn optical(&self) -> &OpticalPoller {
        &self.inner.optical
    }

    pub fn lifecycle(&self) -> &LifecycleController {
        &self.inner.lifecycle
    }

    // ── Session ──────────────────────────────────────────────────

    pub async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, CoreError> {
        self.inner.sessions.sign_in(username, password).await
    }

    pub fn sign_out(&self) {
        self.inner.optical.reset();
        self.inner.sessions.sign_out();
    }

    pub fn restore(&self, session: Session) -> Result<Session, CoreError> {
        self.inner.sessions.restore(session)
    }

    pub fn session(&self) -> Result<Session, CoreError> {
        self.inner.sessions.current()
    }

    /// Tear the session down when the server says it is gone.
    fn settle<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if matches!(result, Err(CoreError::AuthExpired)) {
            debug!("token rejected, signing out");
            self.sign_out();
        }
        result
    }

    // ── Inventory ────────────────────────────────────────────────

    pub async fn list_devices(&self) -> Result<Vec<Device>, CoreError> {
        let session = self.session()?;
        let result = self.inner.inventory.list_devices(&session).await;
        self.settle(result)
    }

    pub async fn list_services(&self, device_id: &str) -> Result<Vec<ServiceProfile>, CoreError> {
        let session = self.session()?;
        let result = self.inner.inventory.list_services(device_id, &session).await;
        self.settle(result)
    }

    // ── Discovery / search / provisioning ────────────────────────

    pub async fn auto_find(
        &self,
        device_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, CoreError> {
        let session = self.session()?;
        let result = self
            .inner
            .scanner
            .auto_find(device_id, &session, cancel)
            .await;
        self.settle(result)
    }

    pub async fn lookup(&self, device_id: &str, sn: &str) -> Result<Option<SearchResult>, CoreError> {
        let session = self.session()?;
        let result = self.inner.search.lookup(device_id, &session, sn).await;
        self.settle(result)
    }

    /// Operator search. A new search invalidates any optical reading held
    /// for the previous result.
    pub async fn search(&self, device_id: &str, sn: &str) -> Result<Option<SearchResult>, CoreError> {
        crate::search::validate_search_sn(sn)?;
        let session = self.session()?;
        self.inner.optical.reset();
        let result = self.inner.search.search(device_id, &session, sn).await;
        self.settle(result)
    }

    pub async fn provision(
        &self,
        device_id: &str,
        input: ProvisionInput,
    ) -> Result<ProvisionReport, CoreError> {
        crate::model::RegistrationRequest::build(&input)?;
        let session = self.session()?;
        let result = self
            .inner
            .registrar
            .provision(device_id, &session, input)
            .await;
        self.settle(result)
    }

    // ── Diagnostics ──────────────────────────────────────────────

    pub async fn fetch_optical(
        &self,
        device_id: &str,
        fsp: Option<&str>,
        ontid: Option<&str>,
    ) -> Result<FetchOutcome, CoreError> {
        let session = self.session()?;
        let result = self
            .inner
            .optical
            .fetch(device_id, &session, fsp, ontid)
            .await;
        self.settle(result)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Dispatch a confirmed destructive action.
    pub async fn execute(&self, device_id: &str, action: &LifecycleAction) -> Result<(), CoreError> {
        let session = self.session()?;
        let result = self
            .inner
            .lifecycle
            .execute(device_id, &session, action)
            .await;
        self.settle(result)
    }

    /// Dispatch an action staged with `lifecycle().stage(..)`.
    pub async fn confirm(&self, pending: PendingAction<'_>) -> Result<(), CoreError> {
        let session = self.session()?;
        let result = pending.confirm(&session).await;
        self.settle(result)
    }
}

fn build_transport(config: &OltConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
