//! # Shared Types Crate
//!
//! Identifiers and lifecycle primitives shared by the DON gateway subsystems.
//!
//! ## Contents
//!
//! - **Entities**: `PeerId`, `Bytes32`, `DonId` and the hex text encoding used
//!   wherever raw 32-byte identifiers are persisted or logged.
//! - **Service lifecycle**: the `Service` trait implemented by every long-lived
//!   background component, plus the `StateMachine` guard that makes `start`
//!   and `close` single-shot.

pub mod entities;
pub mod service;

pub use entities::*;
pub use service::{HealthReport, Service, ServiceError, ServiceState, StateMachine};
