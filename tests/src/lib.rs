//! # DON Gateway Test Suite
//!
//! Cross-subsystem tests that exercise the crates through their public
//! APIs only.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks
//! └── src/integration/  # end-to-end flows
//!     ├── aggregation_flow.rs
//!     ├── registry_sync.rs
//!     └── telemetry.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dg-tests
//! cargo test -p dg-tests integration::registry_sync
//! cargo bench -p dg-tests
//! ```

pub mod integration;
