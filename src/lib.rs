//! # streamcheck
//!
//! Connectivity validation for the services of a streaming platform:
//! a Kafka broker cluster, a Confluent-style schema registry, a Kafka
//! Connect-style connector framework and a ksqlDB-style streaming-SQL
//! engine. Each probe answers one question — "with these settings, can
//! we actually reach and use this service?" — and resolves to a
//! structured [`ValidationOutcome`] instead of letting raw failures
//! propagate to the caller.
//!
//! ## Features
//!
//! - **Layered property assembly**: security material, caller
//!   overrides and fast-fail tuning merged in a fixed, auditable
//!   precedence order
//! - **Trust material checking**: PEM trust bundles loaded and
//!   sanity-checked before a configuration is accepted
//! - **Uniform probe protocol**: construct → one cheap capability
//!   call → map → release, shared by all four services
//! - **Failover-aware HTTP clients**: registry, connect and ksql
//!   endpoints tried in order behind one gateway abstraction
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streamcheck::{validate_cluster_connection, ClusterConnectionSpec};
//!
//! #[tokio::main]
//! async fn main() {
//!     let spec = ClusterConnectionSpec {
//!         bootstrap_servers: "localhost:9092".to_string(),
//!         ..Default::default()
//!     };
//!     let outcome = validate_cluster_connection(&spec).await;
//!     if outcome.failed {
//!         eprintln!("cluster unreachable: {:?}", outcome.message);
//!     }
//! }
//! ```

pub mod streamcheck;

pub use streamcheck::clients::connect::{ConnectApi, ConnectClient, ConnectorPlugin};
pub use streamcheck::clients::ksql::{KsqlApi, KsqlClient, KsqlResponseTable};
pub use streamcheck::clients::registry::{
    CompatibilityLevel, SchemaRegistryApi, SchemaRegistryClient,
};
pub use streamcheck::clients::{BasicAuth, ClientBuildError, ClientError};
pub use streamcheck::config::{
    ClusterConnectionSpec, HttpServiceSpec, KeyMaterialConfig, TrustMaterialConfig,
};
pub use streamcheck::failover::{Failover, FailoverError};
pub use streamcheck::kafka::properties::{build_cluster_properties, EffectiveProperties};
pub use streamcheck::security::validate_trust_material;
pub use streamcheck::validation::{
    validate_cluster_connection, validate_connect, validate_ksql, validate_schema_registry,
    ValidationOutcome,
};
