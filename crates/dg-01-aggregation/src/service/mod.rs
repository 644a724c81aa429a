//! # Workflow Metadata Aggregator Service
//!
//! Concurrency-safe threshold aggregation of workflow metadata with
//! time-based eviction.
//!
//! ## Locking
//!
//! One `RwLock` guards all maps. `collect` and the reaper take it for
//! writing, `aggregate` for reading. Validation and digest computation run
//! before the lock is taken.
//!
//! ## Ordering
//!
//! Each digest group gets a sequence number when first created. Results are
//! ordered by that number, newest first, no matter when a group crossed the
//! threshold.


use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{HealthReport, Service, ServiceError, ServiceState, StateMachine};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MetadataAggregatorConfig;
use crate::domain::{Digestible, NodeSet, WorkflowMetadata};
use crate::error::{AggregationError, AggregationResult};
use crate::metrics;
use crate::ports::inbound::MetadataAggregatorApi;

/// Service name used in logs and health reports
pub const SERVICE_NAME: &str = "WorkflowMetadataAggregator";

/// One digest group.
#[derive(Debug, Clone)]
struct ObservationGroup {
    observation: WorkflowMetadata,
    nodes: NodeSet,
    sequence: u64,
}

/// Maps guarded by the aggregator's lock.
#[derive(Debug, Default)]
struct AggregatorState {
    /// digest -> group
    observations: HashMap<String, ObservationGroup>,
    /// node -> digest -> last seen
    observed_at: HashMap<String, HashMap<String, Instant>>,
    next_sequence: u64,
}

impl AggregatorState {
    fn record(
        &mut self,
        digest: String,
        observation: &WorkflowMetadata,
        node_address: &str,
        now: Instant,
    ) {
        self.observed_at
            .entry(node_address.to_string())
            .or_default()
            .insert(digest.clone(), now);

        let next_sequence = &mut self.next_sequence;
        let group = self.observations.entry(digest).or_insert_with(|| {
            *next_sequence += 1;
            ObservationGroup {
                observation: observation.clone(),
                nodes: NodeSet::new(),
                sequence: *next_sequence,
            }
        });
        group.nodes.add(node_address);
    }

    fn agreed(&self, threshold: usize) -> Vec<WorkflowMetadata> {
        let mut agreed: Vec<&ObservationGroup> = self
            .observations
            .values()
            .filter(|group| group.nodes.len() >= threshold)
            .collect();
        agreed.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        agreed
            .into_iter()
            .map(|group| group.observation.clone())
            .collect()
    }

    /// Drop every (node, digest) pair last seen more than `ttl` before
    /// `now`. Returns the number of pairs dropped.
    fn reap(&mut self, now: Instant, ttl: Duration) -> usize {
        let mut expired = Vec::new();
        for (node, digests) in &self.observed_at {
            for (digest, seen) in digests {
                if now.saturating_duration_since(*seen) > ttl {
                    expired.push((node.clone(), digest.clone()));
                }
            }
        }

        for (node, digest) in &expired {
            if let Some(digests) = self.observed_at.get_mut(node) {
                digests.remove(digest);
                if digests.is_empty() {
                    self.observed_at.remove(node);
                }
            }

            match self.observations.get_mut(digest) {
                Some(group) => {
                    group.nodes.remove(node);
                    if group.nodes.is_empty() {
                        self.observations.remove(digest);
                    }
                }
                None => {
                    warn!(node = %node, digest = %digest, "[dg-01] Expired observation has no digest group");
                }
            }
        }

        expired.len()
    }
}

/// Threshold aggregator for workflow metadata reported by gateway nodes.
///
/// Unlike `ResponseAggregator`, a node may back several digests at once;
/// each (node, digest) pair expires on its own.
pub struct WorkflowMetadataAggregator {
    config: MetadataAggregatorConfig,
    state: Arc<RwLock<AggregatorState>>,
    lifecycle: StateMachine,
    shutdown: CancellationToken,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl WorkflowMetadataAggregator {
    pub fn new(config: MetadataAggregatorConfig) -> AggregationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: Arc::new(RwLock::new(AggregatorState::default())),
            lifecycle: StateMachine::new(),
            shutdown: CancellationToken::new(),
            reaper: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &MetadataAggregatorConfig {
        &self.config
    }

    /// Lifecycle state (`Unstarted`, `Started`, `Stopped`).
    pub fn state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    /// Number of digest groups currently tracked.
    pub fn group_count(&self) -> usize {
        self.state.read().observations.len()
    }

    /// Number of nodes with at least one live observation.
    pub fn tracked_node_count(&self) -> usize {
        self.state.read().observed_at.len()
    }

    /// Run one eviction pass now. The background reaper calls this on
    /// every tick.
    pub fn reap_observations(&self) -> usize {
        reap_shared(&self.state, self.config.observation_ttl)
    }

    #[cfg(test)]
    fn members(&self, digest: &str) -> Option<NodeSet> {
        self.state
            .read()
            .observations
            .get(digest)
            .map(|group| group.nodes.clone())
    }

    #[cfg(test)]
    fn last_seen(&self, node_address: &str, digest: &str) -> Option<Instant> {
        self.state
            .read()
            .observed_at
            .get(node_address)
            .and_then(|digests| digests.get(digest).copied())
    }
}

fn reap_shared(state: &RwLock<AggregatorState>, ttl: Duration) -> usize {
    let (expired, remaining) = {
        let mut state = state.write();
        let expired = state.reap(Instant::now(), ttl);
        (expired, state.observations.len())
    };

    if expired > 0 {
        debug!(expired, remaining, "[dg-01] Reaped expired observations");
    }
    metrics::record_observations_expired(expired);
    metrics::set_observation_groups(remaining);
    expired
}

async fn run_reaper(
    state: Arc<RwLock<AggregatorState>>,
    interval: Duration,
    ttl: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                reap_shared(&state, ttl);
            }
        }
    }
    debug!("[dg-01] Reaper stopped");
}

impl MetadataAggregatorApi for WorkflowMetadataAggregator {
    fn collect(
        &self,
        observation: &WorkflowMetadata,
        node_address: &str,
    ) -> AggregationResult<()> {
        observation.workflow_selector.validate()?;
        if node_address.is_empty() {
            return Err(AggregationError::EmptyNodeAddress);
        }
        let digest = observation.digest()?;

        self.state
            .write()
            .record(digest, observation, node_address, Instant::now());
        Ok(())
    }

    fn aggregate(&self) -> AggregationResult<Vec<WorkflowMetadata>> {
        Ok(self.state.read().agreed(self.config.threshold))
    }
}

#[async_trait]
impl Service for WorkflowMetadataAggregator {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.lifecycle.start_once(SERVICE_NAME)?;

        let handle = tokio::spawn(run_reaper(
            Arc::clone(&self.state),
            self.config.cleanup_interval,
            self.config.observation_ttl,
            self.shutdown.clone(),
        ));
        *self.reaper.lock() = Some(handle);

        info!(
            threshold = self.config.threshold,
            interval_ms = self.config.cleanup_interval.as_millis() as u64,
            "[dg-01] Metadata aggregator started"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), ServiceError> {
        self.lifecycle.stop_once(SERVICE_NAME)?;
        self.shutdown.cancel();

        let handle = self.reaper.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "[dg-01] Reaper task ended abnormally");
            }
        }

        info!("[dg-01] Metadata aggregator stopped");
        Ok(())
    }

    fn health_report(&self) -> HealthReport {
        self.lifecycle.health_report(SERVICE_NAME)
    }
}
