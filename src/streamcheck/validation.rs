//! Connectivity validation probes.
//!
//! One uniform protocol, instantiated four times: construct a client,
//! perform one cheap capability call, map the result to a pass/fail
//! outcome, release the client. Every entry point resolves to a
//! [`ValidationOutcome`] value; nothing above this boundary ever sees a
//! propagated error.
//!
//! Message exposure is asymmetric on purpose: admin-client failures can
//! carry cause chains unsuitable for display, so the cluster probe logs
//! the real error and returns a generic message, while the HTTP
//! services' errors are descriptive and surfaced verbatim.

use crate::streamcheck::clients::connect::ConnectApi;
use crate::streamcheck::clients::ksql::{KsqlApi, KsqlResponseTable, INTROSPECTION_STATEMENT};
use crate::streamcheck::clients::registry::SchemaRegistryApi;
use crate::streamcheck::config::ClusterConnectionSpec;
use crate::streamcheck::failover::{Failover, FailoverError};
use crate::streamcheck::kafka::properties::{build_cluster_properties, VALIDATION_TIMEOUT_MS};
use rdkafka::admin::AdminClient;
use rdkafka::client::DefaultClientContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

const ADMIN_CREATE_ERROR: &str = "Error while creating admin client. See logs for details.";
const CLUSTER_CONNECT_ERROR: &str = "Error connecting to cluster. See logs for details.";

/// The normalized result of one validation call. `message` is present
/// iff `failed` is true; the value is terminal and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            failed: false,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            failed: true,
            message: Some(message.into()),
        }
    }
}

/// The shared probe skeleton: construct, call once, map, release.
///
/// The client moves into `call`, so it is dropped exactly once when the
/// call future finishes, on the success and failure paths alike.
/// Construction failures never reach the network; both failure shapes
/// are logged before their caller-facing message is produced.
async fn probe<C, CE, F, Fut, PE>(
    service: &'static str,
    construct: impl FnOnce() -> Result<C, CE>,
    construct_failure: impl FnOnce(&CE) -> String,
    call: F,
    call_failure: impl FnOnce(&PE) -> String,
) -> ValidationOutcome
where
    CE: fmt::Display,
    PE: fmt::Display,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = Result<(), PE>>,
{
    let client = match construct() {
        Ok(client) => client,
        Err(e) => {
            log::error!("error creating {} client during validation: {}", service, e);
            return ValidationOutcome::invalid(construct_failure(&e));
        }
    };
    match call(client).await {
        Ok(()) => ValidationOutcome::valid(),
        Err(e) => {
            log::error!("{} validation call failed: {}", service, e);
            ValidationOutcome::invalid(call_failure(&e))
        }
    }
}

#[derive(Debug, Error)]
enum ClusterProbeError {
    #[error("{0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
    #[error("metadata task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Probes the broker cluster described by `spec`.
///
/// Builds the effective admin properties, constructs an admin client
/// and fetches the topic metadata, the cheapest call that needs a
/// live, authenticated connection. The fast-fail tuning baked into the
/// properties keeps the whole attempt within the fixed 5 s window.
pub async fn validate_cluster_connection(spec: &ClusterConnectionSpec) -> ValidationOutcome {
    let config = build_cluster_properties(spec).to_client_config();
    probe(
        "admin",
        || config.create::<AdminClient<DefaultClientContext>>(),
        |_| ADMIN_CREATE_ERROR.to_string(),
        |admin| async move {
            // librdkafka's metadata fetch is synchronous; run it off
            // the async pipeline. The client is dropped inside the
            // blocking task, after the fetch, on every path.
            tokio::task::spawn_blocking(move || {
                admin
                    .inner()
                    .fetch_metadata(None, Duration::from_millis(VALIDATION_TIMEOUT_MS))
            })
            .await??;
            Ok::<(), ClusterProbeError>(())
        },
        |_| CLUSTER_CONNECT_ERROR.to_string(),
    )
    .await
}

/// Probes a schema registry through a failover gateway produced by the
/// (fallible) `supplier`. A supplier error is reported without any
/// network call; call failures surface their description verbatim.
pub async fn validate_schema_registry<C, E, S>(supplier: S) -> ValidationOutcome
where
    C: SchemaRegistryApi + Clone,
    E: fmt::Display,
    S: FnOnce() -> Result<Failover<C>, E>,
{
    probe(
        "schema registry",
        supplier,
        |e| format!("Error creating schema registry client: {}", e),
        |client| async move {
            client
                .call_one(|c| async move { c.global_compatibility().await })
                .await
                .map(|_| ())
        },
        |e: &FailoverError| e.to_string(),
    )
    .await
}

/// Probes a connector framework. The plugin listing is drained; no
/// individual entry is inspected.
pub async fn validate_connect<C, E, S>(supplier: S) -> ValidationOutcome
where
    C: ConnectApi + Clone,
    E: fmt::Display,
    S: FnOnce() -> Result<Failover<C>, E>,
{
    probe(
        "connect",
        supplier,
        |e| format!("Error creating connect client: {}", e),
        |client| async move {
            client
                .call_many(|c| async move { c.connector_plugins().await })
                .await
                .map(|_| ())
        },
        |e: &FailoverError| e.to_string(),
    )
    .await
}

#[derive(Debug, Error)]
enum KsqlProbeError {
    #[error("{0}")]
    Failover(#[from] FailoverError),
    #[error("Error response from ksql: {0}")]
    ErrorRow(KsqlResponseTable),
}

/// Probes a streaming-SQL engine with a fixed introspection statement.
///
/// The call succeeding at the transport level is not enough: each
/// returned table can itself encode an engine-side error, so the full
/// sequence is drained and scanned per row.
pub async fn validate_ksql<C, E, S>(supplier: S) -> ValidationOutcome
where
    C: KsqlApi + Clone,
    E: fmt::Display,
    S: FnOnce() -> Result<Failover<C>, E>,
{
    probe(
        "ksql",
        supplier,
        |e| format!("Error creating ksql client: {}", e),
        |client| async move {
            let tables = client
                .call_many(|c| async move { c.execute(INTROSPECTION_STATEMENT).await })
                .await
                .map_err(KsqlProbeError::from)?;
            match first_error_row(&tables) {
                Some(row) => Err(KsqlProbeError::ErrorRow(row)),
                None => Ok(()),
            }
        },
        |e: &KsqlProbeError| e.to_string(),
    )
    .await
}

/// Scan policy for the introspection result: the first row flagged as
/// an error decides the outcome; an empty sequence is a success.
fn first_error_row(tables: &[KsqlResponseTable]) -> Option<KsqlResponseTable> {
    tables.iter().find(|table| table.error).cloned()
}
