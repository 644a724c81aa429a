//! # Managed Service Lifecycle
//!
//! Long-lived background components (the metadata aggregator's reaper, the
//! registry synchronizer's loops) share one lifecycle:
//!
//! ```text
//! Unstarted ──start()──→ Started ──close()──→ Stopped
//! ```
//!
//! Both transitions are single-shot. A second `start` or a second `close`
//! fails without side effects, and a stopped service never restarts.
//!
//! ## Example Implementation
//!
//! ```rust,ignore
//! use shared_types::{Service, ServiceError, StateMachine};
//! use async_trait::async_trait;
//!
//! pub struct MyService { state: StateMachine }
//!
//! #[async_trait]
//! impl Service for MyService {
//!     fn name(&self) -> &str { "MyService" }
//!     async fn start(&self) -> Result<(), ServiceError> { self.state.start_once(self.name()) }
//!     async fn close(&self) -> Result<(), ServiceError> { self.state.stop_once(self.name()) }
//!     fn health_report(&self) -> HealthReport { self.state.health_report(self.name()) }
//! }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{name} has already been started")]
    AlreadyStarted { name: String },

    #[error("{name} has already been stopped")]
    AlreadyStopped { name: String },

    #[error("{name} has not been started")]
    NotStarted { name: String },

    #[error("{name} is not running (state: {state})")]
    NotRunning { name: String, state: ServiceState },
}

/// Lifecycle state of a managed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceState {
    #[default]
    Unstarted,
    Started,
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstarted => write!(f, "Unstarted"),
            Self::Started => write!(f, "Started"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Health of each named component; `Ok` means healthy.
pub type HealthReport = BTreeMap<String, Result<(), ServiceError>>;

/// Single-shot start/stop guard.
///
/// Transitions are checked and applied under one lock, so two concurrent
/// `start_once` calls cannot both succeed.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: Mutex<ServiceState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    /// Move `Unstarted -> Started`.
    pub fn start_once(&self, name: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        match *state {
            ServiceState::Unstarted => {
                *state = ServiceState::Started;
                Ok(())
            }
            ServiceState::Started => Err(ServiceError::AlreadyStarted {
                name: name.to_string(),
            }),
            ServiceState::Stopped => Err(ServiceError::AlreadyStopped {
                name: name.to_string(),
            }),
        }
    }

    /// Move `Started -> Stopped`.
    pub fn stop_once(&self, name: &str) -> Result<(), ServiceError> {
        let mut state = self.state.lock();
        match *state {
            ServiceState::Started => {
                *state = ServiceState::Stopped;
                Ok(())
            }
            ServiceState::Unstarted => Err(ServiceError::NotStarted {
                name: name.to_string(),
            }),
            ServiceState::Stopped => Err(ServiceError::AlreadyStopped {
                name: name.to_string(),
            }),
        }
    }

    /// `Ok` only while started.
    pub fn healthy(&self, name: &str) -> Result<(), ServiceError> {
        match self.state() {
            ServiceState::Started => Ok(()),
            state => Err(ServiceError::NotRunning {
                name: name.to_string(),
                state,
            }),
        }
    }

    /// Single-entry health report for `name`.
    pub fn health_report(&self, name: &str) -> HealthReport {
        let mut report = HealthReport::new();
        report.insert(name.to_string(), self.healthy(name));
        report
    }
}

/// Contract implemented by every managed background service.
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable component name used in logs and health reports.
    fn name(&self) -> &str;

    /// Spawn background work. Fails if already started or stopped.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Signal background work to stop and wait for it to exit.
    /// Fails if never started or already stopped.
    async fn close(&self) -> Result<(), ServiceError>;

    /// Health of this service and any components it owns.
    fn health_report(&self) -> HealthReport;

    /// `Ok` while the service is running.
    fn ready(&self) -> Result<(), ServiceError> {
        let name = self.name().to_string();
        self.health_report()
            .remove(&name)
            .unwrap_or(Err(ServiceError::NotStarted { name }))
    }
}
