//! Streaming-SQL engine client.
//!
//! Speaks the ksqlDB-style HTTP API. A statement execution returns a
//! sequence of response tables; a table can itself encode an error even
//! though the HTTP call succeeded, so the rows are surfaced as data and
//! the validation probe inspects them individually.

use super::{
    apply_auth, basic_auth_from_spec, parse_base_urls, send_expecting_success, BasicAuth,
    ClientBuildError, ClientError,
};
use crate::streamcheck::config::HttpServiceSpec;
use crate::streamcheck::failover::Failover;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const SERVICE: &str = "ksql";

/// The cheapest introspection statement a live engine will answer.
pub const INTROSPECTION_STATEMENT: &str = "SHOW VARIABLES;";

/// One response table from a statement execution. `error` marks tables
/// that carry an engine-side error payload rather than data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KsqlResponseTable {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
    #[serde(default)]
    pub error: bool,
}

impl fmt::Display for KsqlResponseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// The streaming-SQL capability the validation probe exercises.
#[async_trait]
pub trait KsqlApi: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<Vec<KsqlResponseTable>, ClientError>;
}

#[derive(Clone)]
pub struct KsqlClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<BasicAuth>,
}

#[derive(Serialize)]
struct KsqlRequest<'a> {
    ksql: &'a str,
    #[serde(rename = "streamsProperties")]
    streams_properties: serde_json::Map<String, Value>,
}

impl KsqlClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Fallible factory for the ksql probe; see
    /// [`crate::streamcheck::clients::registry::SchemaRegistryClient::failover_from_spec`].
    pub fn failover_from_spec(
        spec: &HttpServiceSpec,
    ) -> Result<Failover<KsqlClient>, ClientBuildError> {
        let auth = basic_auth_from_spec(spec);
        let http = reqwest::Client::new();
        let targets = parse_base_urls(spec)?
            .into_iter()
            .map(|base_url| KsqlClient {
                http: http.clone(),
                base_url,
                auth: auth.clone(),
            })
            .collect();
        Failover::new(targets).map_err(|_| ClientBuildError::NoAddresses)
    }
}

#[async_trait]
impl KsqlApi for KsqlClient {
    async fn execute(&self, statement: &str) -> Result<Vec<KsqlResponseTable>, ClientError> {
        let url = format!("{}/ksql", self.base_url);
        let body = KsqlRequest {
            ksql: statement,
            streams_properties: serde_json::Map::new(),
        };
        let request = apply_auth(self.http.post(&url), &self.auth).json(&body);
        let response = send_expecting_success(SERVICE, &url, request).await?;
        let items: Vec<Value> = response.json().await.map_err(|e| ClientError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;
        Ok(items.iter().map(parse_response_item).collect())
    }
}

/// Maps one raw response entity to a table. Error entities carry an
/// `error_code`, or an `@type` that names an error, and their message
/// becomes the single row value.
fn parse_response_item(item: &Value) -> KsqlResponseTable {
    let entity_type = item
        .get("@type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let is_error = item.get("error_code").is_some() || entity_type.contains("error");
    if is_error {
        let message = item
            .get("message")
            .cloned()
            .unwrap_or_else(|| item.clone());
        return KsqlResponseTable {
            header: entity_type.to_string(),
            column_names: vec!["message".to_string()],
            values: vec![vec![message]],
            error: true,
        };
    }
    let statement_text = item
        .get("statementText")
        .and_then(Value::as_str)
        .unwrap_or(entity_type);
    KsqlResponseTable {
        header: statement_text.to_string(),
        column_names: Vec::new(),
        values: Vec::new(),
        error: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_entity_is_flagged() {
        let item = json!({
            "@type": "generic_error",
            "error_code": 50000,
            "message": "The server encountered an internal error"
        });
        let table = parse_response_item(&item);
        assert!(table.error);
        assert_eq!(table.header, "generic_error");
        assert!(table.to_string().contains("internal error"));
    }

    #[test]
    fn statement_error_without_code_is_flagged() {
        let item = json!({
            "@type": "statement_error",
            "message": "line 1: Unknown statement"
        });
        assert!(parse_response_item(&item).error);
    }

    #[test]
    fn data_entity_is_not_flagged() {
        let item = json!({
            "@type": "variables",
            "statementText": "SHOW VARIABLES;",
            "variables": []
        });
        let table = parse_response_item(&item);
        assert!(!table.error);
        assert_eq!(table.header, "SHOW VARIABLES;");
    }

    #[test]
    fn display_includes_row_values() {
        let table = KsqlResponseTable {
            header: "vars".to_string(),
            column_names: vec!["message".to_string()],
            values: vec![vec![json!("bad var")]],
            error: true,
        };
        assert!(table.to_string().contains("bad var"));
    }
}
