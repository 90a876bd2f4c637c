//! Schema registry client.
//!
//! Speaks the Confluent-style registry HTTP API. Validation only needs
//! one cheap authenticated call: fetching the global compatibility
//! level.

use super::{
    apply_auth, basic_auth_from_spec, parse_base_urls, send_expecting_success, BasicAuth,
    ClientBuildError, ClientError,
};
use crate::streamcheck::config::HttpServiceSpec;
use crate::streamcheck::failover::Failover;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "schema registry";

/// Global (or per-subject) schema compatibility level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityLevel {
    Backward,
    BackwardTransitive,
    Forward,
    ForwardTransitive,
    Full,
    FullTransitive,
    None,
}

#[derive(Debug, Deserialize)]
struct CompatibilityResponse {
    #[serde(rename = "compatibilityLevel")]
    compatibility_level: CompatibilityLevel,
}

/// The registry capability the validation probe exercises.
#[async_trait]
pub trait SchemaRegistryApi: Send + Sync {
    async fn global_compatibility(&self) -> Result<CompatibilityLevel, ClientError>;
}

#[derive(Clone)]
pub struct SchemaRegistryClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<BasicAuth>,
}

impl SchemaRegistryClient {
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

    /// Builds a failover gateway over every address in the spec. This
    /// is the fallible factory the schema-registry probe consumes:
    /// address problems surface here, before any network call.
    pub fn failover_from_spec(
        spec: &HttpServiceSpec,
    ) -> Result<Failover<SchemaRegistryClient>, ClientBuildError> {
        let auth = basic_auth_from_spec(spec);
        let http = reqwest::Client::new();
        let targets = parse_base_urls(spec)?
            .into_iter()
            .map(|base_url| SchemaRegistryClient {
                http: http.clone(),
                base_url,
                auth: auth.clone(),
            })
            .collect();
        Failover::new(targets).map_err(|_| ClientBuildError::NoAddresses)
    }
}

#[async_trait]
impl SchemaRegistryApi for SchemaRegistryClient {
    async fn global_compatibility(&self) -> Result<CompatibilityLevel, ClientError> {
        let url = format!("{}/config", self.base_url);
        let request = apply_auth(self.http.get(&url), &self.auth);
        let response = send_expecting_success(SERVICE, &url, request).await?;
        let decoded: CompatibilityResponse =
            response.json().await.map_err(|e| ClientError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(decoded.compatibility_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_response_deserializes() {
        let decoded: CompatibilityResponse =
            serde_json::from_str(r#"{"compatibilityLevel":"BACKWARD"}"#).unwrap();
        assert_eq!(decoded.compatibility_level, CompatibilityLevel::Backward);

        let decoded: CompatibilityResponse =
            serde_json::from_str(r#"{"compatibilityLevel":"FULL_TRANSITIVE"}"#).unwrap();
        assert_eq!(
            decoded.compatibility_level,
            CompatibilityLevel::FullTransitive
        );
    }

    #[test]
    fn unknown_level_is_a_decode_error() {
        assert!(serde_json::from_str::<CompatibilityResponse>(
            r#"{"compatibilityLevel":"SIDEWAYS"}"#
        )
        .is_err());
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = SchemaRegistryClient::new("http://sr:8081/");
        assert_eq!(client.base_url, "http://sr:8081");
    }
}
