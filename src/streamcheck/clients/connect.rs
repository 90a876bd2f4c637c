//! Connector framework client.
//!
//! Speaks the Kafka Connect-style REST API. The validation probe lists
//! the installed connector plugins and drains the result without
//! inspecting individual entries.

use super::{
    apply_auth, basic_auth_from_spec, parse_base_urls, send_expecting_success, BasicAuth,
    ClientBuildError, ClientError,
};
use crate::streamcheck::config::HttpServiceSpec;
use crate::streamcheck::failover::Failover;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "connect";

/// One installed connector plugin, as reported by the framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorPlugin {
    pub class: String,
    #[serde(rename = "type", default)]
    pub plugin_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// The connector-framework capability the validation probe exercises.
#[async_trait]
pub trait ConnectApi: Send + Sync {
    async fn connector_plugins(&self) -> Result<Vec<ConnectorPlugin>, ClientError>;
}

#[derive(Clone)]
pub struct ConnectClient {
    http: reqwest::Client,
    base_url: String,
    auth: Option<BasicAuth>,
}

impl ConnectClient {
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

    /// Fallible factory for the connect probe; see
    /// [`crate::streamcheck::clients::registry::SchemaRegistryClient::failover_from_spec`].
    pub fn failover_from_spec(
        spec: &HttpServiceSpec,
    ) -> Result<Failover<ConnectClient>, ClientBuildError> {
        let auth = basic_auth_from_spec(spec);
        let http = reqwest::Client::new();
        let targets = parse_base_urls(spec)?
            .into_iter()
            .map(|base_url| ConnectClient {
                http: http.clone(),
                base_url,
                auth: auth.clone(),
            })
            .collect();
        Failover::new(targets).map_err(|_| ClientBuildError::NoAddresses)
    }
}

#[async_trait]
impl ConnectApi for ConnectClient {
    async fn connector_plugins(&self) -> Result<Vec<ConnectorPlugin>, ClientError> {
        let url = format!("{}/connector-plugins", self.base_url);
        let request = apply_auth(self.http.get(&url), &self.auth);
        let response = send_expecting_success(SERVICE, &url, request).await?;
        response.json().await.map_err(|e| ClientError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })
    }
}
