//! End-to-end flows across the gateway subsystems.

pub mod aggregation_flow;
pub mod registry_sync;
pub mod telemetry;
