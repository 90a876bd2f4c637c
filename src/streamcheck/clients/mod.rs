//! HTTP clients for the dependent services.
//!
//! One thin client per service, each implementing the capability trait
//! consumed by the validation probes. Request/response shapes for each
//! service's wire API are confined to this module; the probes only pick
//! which call to make and interpret the mapped result.

pub mod connect;
pub mod ksql;
pub mod registry;

use crate::streamcheck::config::HttpServiceSpec;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-request timeout applied by every service client.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error raised by a service client call. Unlike admin-client failures,
/// these descriptions are considered safe to surface to the caller
/// verbatim.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl ClientError {
    /// Whether trying the next failover endpoint could plausibly help.
    /// Transport failures and server-side errors are worth a failover;
    /// a 4xx (bad credentials, bad path) will repeat on every endpoint.
    pub fn is_retriable(&self) -> bool {
        match self {
            ClientError::Transport { .. } => true,
            ClientError::Http { status, .. } => *status >= 500,
            ClientError::Decode { .. } => false,
        }
    }
}

/// Error raised while building a failover client from configuration,
/// before any network call is attempted.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("no addresses configured")]
    NoAddresses,
    #[error("invalid endpoint address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// Basic-auth credentials attached to every request of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

pub(crate) fn basic_auth_from_spec(spec: &HttpServiceSpec) -> Option<BasicAuth> {
    spec.username.as_ref().map(|username| BasicAuth {
        username: username.clone(),
        password: spec.password.clone(),
    })
}

/// Validates and normalizes the address list of a service spec.
pub(crate) fn parse_base_urls(spec: &HttpServiceSpec) -> Result<Vec<String>, ClientBuildError> {
    if spec.addresses.is_empty() {
        return Err(ClientBuildError::NoAddresses);
    }
    let mut bases = Vec::with_capacity(spec.addresses.len());
    for address in &spec.addresses {
        let url = Url::parse(address).map_err(|e| ClientBuildError::InvalidAddress {
            address: address.clone(),
            reason: e.to_string(),
        })?;
        bases.push(url.as_str().trim_end_matches('/').to_string());
    }
    Ok(bases)
}

pub(crate) fn apply_auth(
    request: reqwest::RequestBuilder,
    auth: &Option<BasicAuth>,
) -> reqwest::RequestBuilder {
    match auth {
        Some(BasicAuth { username, password }) => request.basic_auth(username, password.as_ref()),
        None => request,
    }
}

/// Sends a request and maps transport failures and non-2xx statuses to
/// [`ClientError`].
pub(crate) async fn send_expecting_success(
    service: &'static str,
    url: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ClientError> {
    let response = request
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Http {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
