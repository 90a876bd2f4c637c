//! streamcheck CLI
//!
//! Validates the service connections described in a YAML document and
//! prints one outcome per configured service as JSON. Exits non-zero
//! if any validation failed.
//!
//! ```yaml
//! cluster:
//!   bootstrap_servers: "broker:9092"
//!   truststore:
//!     location: /etc/certs/ca.pem
//!     password: changeit
//! schema_registry:
//!   addresses: ["http://schema-registry:8081"]
//! connect:
//!   addresses: ["http://connect:8083"]
//! ksql:
//!   addresses: ["http://ksqldb:8088"]
//! ```

use clap::{Arg, Command};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::process;
use streamcheck::{
    validate_cluster_connection, validate_connect, validate_ksql, validate_schema_registry,
    validate_trust_material, ClusterConnectionSpec, ConnectClient, HttpServiceSpec, KsqlClient,
    SchemaRegistryClient, ValidationOutcome,
};

#[derive(Debug, Deserialize)]
struct ValidationDocument {
    #[serde(default)]
    cluster: Option<ClusterConnectionSpec>,
    #[serde(default)]
    schema_registry: Option<HttpServiceSpec>,
    #[serde(default)]
    connect: Option<HttpServiceSpec>,
    #[serde(default)]
    ksql: Option<HttpServiceSpec>,
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let matches = Command::new("streamcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validates connectivity to the services described in a config file")
        .arg(
            Arg::new("config")
                .help("YAML file with cluster/schema_registry/connect/ksql sections")
                .required(true)
                .index(1),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").expect("required arg");

    match run(config_path).await {
        Ok(outcomes) => {
            match serde_json::to_string_pretty(&outcomes) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => {
                    eprintln!("failed to render outcomes: {}", e);
                    process::exit(2);
                }
            }
            if outcomes.values().any(|outcome| outcome.failed) {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    }
}

async fn run(
    config_path: &str,
) -> Result<BTreeMap<&'static str, ValidationOutcome>, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(config_path)
        .map_err(|e| format!("cannot read {}: {}", config_path, e))?;
    let document: ValidationDocument =
        serde_yaml::from_str(&raw).map_err(|e| format!("cannot parse {}: {}", config_path, e))?;

    let mut outcomes = BTreeMap::new();

    if let Some(cluster) = &document.cluster {
        let outcome = match validate_trust_material(&cluster.truststore) {
            Some(message) => ValidationOutcome::invalid(message),
            None => validate_cluster_connection(cluster).await,
        };
        outcomes.insert("cluster", outcome);
    }
    if let Some(spec) = &document.schema_registry {
        outcomes.insert(
            "schema_registry",
            validate_schema_registry(|| SchemaRegistryClient::failover_from_spec(spec)).await,
        );
    }
    if let Some(spec) = &document.connect {
        outcomes.insert(
            "connect",
            validate_connect(|| ConnectClient::failover_from_spec(spec)).await,
        );
    }
    if let Some(spec) = &document.ksql {
        outcomes.insert(
            "ksql",
            validate_ksql(|| KsqlClient::failover_from_spec(spec)).await,
        );
    }

    if outcomes.is_empty() {
        return Err(format!("{} configures no services to validate", config_path).into());
    }
    Ok(outcomes)
}
