//! Ports (hexagonal boundaries) for the Aggregation subsystem.

pub mod inbound;

pub use inbound::MetadataAggregatorApi;
