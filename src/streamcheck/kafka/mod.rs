//! Kafka admin-client plumbing for the cluster probe.

pub mod properties;
