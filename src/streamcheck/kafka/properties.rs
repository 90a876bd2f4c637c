//! Effective client property assembly.
//!
//! The properties handed to the admin client are the result of a fixed
//! layered-override chain. Each layer is a named function documented
//! with its overwrite condition, so the precedence rules stay auditable
//! and testable in isolation. Later layers overwrite earlier keys; the
//! fast-fail tuning layer is applied last so caller input can never
//! weaken it.

use crate::streamcheck::config::ClusterConnectionSpec;
use rdkafka::config::ClientConfig;
use std::collections::HashMap;

pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
pub const SECURITY_PROTOCOL: &str = "security.protocol";
pub const SSL_CA_LOCATION: &str = "ssl.ca.location";
pub const SSL_KEYSTORE_LOCATION: &str = "ssl.keystore.location";
pub const SSL_KEYSTORE_PASSWORD: &str = "ssl.keystore.password";
pub const SSL_ENDPOINT_IDENTIFICATION_ALGORITHM: &str = "ssl.endpoint.identification.algorithm";
pub const RETRIES: &str = "retries";
pub const REQUEST_TIMEOUT_MS: &str = "request.timeout.ms";
pub const SOCKET_TIMEOUT_MS: &str = "socket.timeout.ms";
pub const CLIENT_ID: &str = "client.id";

/// Request and overall timeout fixed for every validation attempt.
pub const VALIDATION_TIMEOUT_MS: u64 = 5_000;

/// An ordered merge of client properties. Built fresh per validation
/// call and never shared across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveProperties {
    entries: HashMap<String, String>,
}

impl EffectiveProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the assembled set into an rdkafka [`ClientConfig`].
    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        for (key, value) in &self.entries {
            config.set(key, value);
        }
        config
    }
}

/// Builds the effective admin-client properties for one validation
/// attempt, applying the override layers in precedence order.
pub fn build_cluster_properties(spec: &ClusterConnectionSpec) -> EffectiveProperties {
    let mut props = EffectiveProperties::new();
    apply_trust_material(&mut props, spec);
    apply_key_material(&mut props, spec);
    apply_caller_overrides(&mut props, spec);
    apply_hostname_verification_default(&mut props, spec);
    apply_bootstrap_servers(&mut props, spec);
    apply_fast_fail_tuning(&mut props);
    props
}

/// Layer 1: sets `ssl.ca.location` only when a truststore location is
/// configured. PEM trust anchors carry no password property; the trust
/// password is consumed by the security material check instead.
fn apply_trust_material(props: &mut EffectiveProperties, spec: &ClusterConnectionSpec) {
    if let Some(location) = &spec.truststore.location {
        props.set(SSL_CA_LOCATION, location.to_string_lossy());
    }
}

/// Layer 2: sets keystore location (and password, when present) only
/// when a keystore location is configured. A configured keystore also
/// forces `security.protocol` to `ssl`; layer 3 re-asserts that
/// override after the caller properties land, so it wins regardless of
/// caller input.
fn apply_key_material(props: &mut EffectiveProperties, spec: &ClusterConnectionSpec) {
    if let Some(location) = &spec.keystore.location {
        props.set(SSL_KEYSTORE_LOCATION, location.to_string_lossy());
        if let Some(password) = &spec.keystore.password {
            props.set(SSL_KEYSTORE_PASSWORD, password);
        }
    }
}

/// Layer 3: caller-supplied properties, verbatim. Overwrites anything
/// the security layers set, except that layer 5/6 and the keystore
/// protocol override are re-applied after it.
fn apply_caller_overrides(props: &mut EffectiveProperties, spec: &ClusterConnectionSpec) {
    for (key, value) in &spec.properties {
        props.set(key, value);
    }
    // Re-assert the keystore protocol override: caller properties must
    // not be able to downgrade a keyed connection to plaintext.
    if spec.keystore.location.is_some() {
        props.set(SECURITY_PROTOCOL, "ssl");
    }
}

/// Layer 4: disables hostname verification unless the caller already
/// chose a value. This is a deliberate convenience default for
/// validation, not a security recommendation.
fn apply_hostname_verification_default(props: &mut EffectiveProperties, spec: &ClusterConnectionSpec) {
    if !spec
        .properties
        .contains_key(SSL_ENDPOINT_IDENTIFICATION_ALGORITHM)
    {
        props.set(SSL_ENDPOINT_IDENTIFICATION_ALGORITHM, "none");
    }
}

/// Layer 5: the connection target always comes from the spec, never
/// from caller properties.
fn apply_bootstrap_servers(props: &mut EffectiveProperties, spec: &ClusterConnectionSpec) {
    props.set(BOOTSTRAP_SERVERS, &spec.bootstrap_servers);
}

/// Layer 6: fast-fail tuning, applied last and unconditionally so
/// validation latency stays bounded no matter what the caller sent.
/// The client id is derived from the current time to uniquely tag each
/// validation attempt in broker and application logs.
fn apply_fast_fail_tuning(props: &mut EffectiveProperties) {
    props.set(RETRIES, "1");
    props.set(REQUEST_TIMEOUT_MS, VALIDATION_TIMEOUT_MS.to_string());
    props.set(SOCKET_TIMEOUT_MS, VALIDATION_TIMEOUT_MS.to_string());
    props.set(CLIENT_ID, validation_client_id());
}

fn validation_client_id() -> String {
    format!(
        "streamcheck-admin-validation-{}",
        chrono::Utc::now().timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streamcheck::config::{KeyMaterialConfig, TrustMaterialConfig};
    use std::path::PathBuf;

    fn base_spec() -> ClusterConnectionSpec {
        ClusterConnectionSpec {
            bootstrap_servers: "broker1:9092,broker2:9092".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn plain_spec_gets_bootstrap_and_fast_fail_tuning() {
        let props = build_cluster_properties(&base_spec());
        assert_eq!(props.get(BOOTSTRAP_SERVERS), Some("broker1:9092,broker2:9092"));
        assert_eq!(props.get(RETRIES), Some("1"));
        assert_eq!(props.get(REQUEST_TIMEOUT_MS), Some("5000"));
        assert_eq!(props.get(SOCKET_TIMEOUT_MS), Some("5000"));
        let client_id = props.get(CLIENT_ID).unwrap();
        assert!(client_id.starts_with("streamcheck-admin-validation-"));
        // No security material configured: no ssl keys beyond the
        // hostname-verification default.
        assert!(!props.contains(SSL_CA_LOCATION));
        assert!(!props.contains(SSL_KEYSTORE_LOCATION));
        assert!(!props.contains(SECURITY_PROTOCOL));
    }

    #[test]
    fn assembly_is_idempotent_apart_from_client_id() {
        let spec = ClusterConnectionSpec {
            properties: [("compression.type".to_string(), "lz4".to_string())].into(),
            truststore: TrustMaterialConfig {
                location: Some(PathBuf::from("/certs/ca.pem")),
                password: Some("pw".to_string()),
            },
            ..base_spec()
        };
        let mut first = build_cluster_properties(&spec);
        let mut second = build_cluster_properties(&spec);
        first.remove(CLIENT_ID).unwrap();
        second.remove(CLIENT_ID).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn truststore_location_sets_ca_location() {
        let spec = ClusterConnectionSpec {
            truststore: TrustMaterialConfig {
                location: Some(PathBuf::from("/certs/ca.pem")),
                password: None,
            },
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert_eq!(props.get(SSL_CA_LOCATION), Some("/certs/ca.pem"));
        // Trust material alone does not force the secured protocol.
        assert!(!props.contains(SECURITY_PROTOCOL));
    }

    #[test]
    fn keystore_location_forces_secured_protocol() {
        let spec = ClusterConnectionSpec {
            keystore: KeyMaterialConfig {
                location: Some(PathBuf::from("/certs/client.p12")),
                password: Some("secret".to_string()),
            },
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert_eq!(props.get(SSL_KEYSTORE_LOCATION), Some("/certs/client.p12"));
        assert_eq!(props.get(SSL_KEYSTORE_PASSWORD), Some("secret"));
        assert_eq!(props.get(SECURITY_PROTOCOL), Some("ssl"));
    }

    #[test]
    fn keystore_password_only_set_when_present() {
        let spec = ClusterConnectionSpec {
            keystore: KeyMaterialConfig {
                location: Some(PathBuf::from("/certs/client.p12")),
                password: None,
            },
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert!(props.contains(SSL_KEYSTORE_LOCATION));
        assert!(!props.contains(SSL_KEYSTORE_PASSWORD));
    }

    #[test]
    fn keystore_protocol_override_beats_caller_properties() {
        let spec = ClusterConnectionSpec {
            properties: [(SECURITY_PROTOCOL.to_string(), "plaintext".to_string())].into(),
            keystore: KeyMaterialConfig {
                location: Some(PathBuf::from("/certs/client.p12")),
                password: None,
            },
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert_eq!(props.get(SECURITY_PROTOCOL), Some("ssl"));
    }

    #[test]
    fn caller_properties_survive_merge() {
        let spec = ClusterConnectionSpec {
            properties: [
                ("sasl.mechanism".to_string(), "PLAIN".to_string()),
                ("compression.type".to_string(), "lz4".to_string()),
            ]
            .into(),
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert_eq!(props.get("sasl.mechanism"), Some("PLAIN"));
        assert_eq!(props.get("compression.type"), Some("lz4"));
    }

    #[test]
    fn hostname_verification_disabled_by_default() {
        let props = build_cluster_properties(&base_spec());
        assert_eq!(props.get(SSL_ENDPOINT_IDENTIFICATION_ALGORITHM), Some("none"));
    }

    #[test]
    fn caller_hostname_verification_choice_is_kept() {
        let spec = ClusterConnectionSpec {
            properties: [(
                SSL_ENDPOINT_IDENTIFICATION_ALGORITHM.to_string(),
                "https".to_string(),
            )]
            .into(),
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert_eq!(props.get(SSL_ENDPOINT_IDENTIFICATION_ALGORITHM), Some("https"));
    }

    #[test]
    fn bootstrap_servers_overwrite_caller_value() {
        let spec = ClusterConnectionSpec {
            properties: [(BOOTSTRAP_SERVERS.to_string(), "rogue:9092".to_string())].into(),
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert_eq!(props.get(BOOTSTRAP_SERVERS), Some("broker1:9092,broker2:9092"));
    }

    #[test]
    fn fast_fail_tuning_overwrites_caller_values() {
        let spec = ClusterConnectionSpec {
            properties: [
                (RETRIES.to_string(), "100".to_string()),
                (REQUEST_TIMEOUT_MS.to_string(), "600000".to_string()),
            ]
            .into(),
            ..base_spec()
        };
        let props = build_cluster_properties(&spec);
        assert_eq!(props.get(RETRIES), Some("1"));
        assert_eq!(props.get(REQUEST_TIMEOUT_MS), Some("5000"));
    }

    #[test]
    fn client_config_round_trips_entries() {
        let props = build_cluster_properties(&base_spec());
        let config = props.to_client_config();
        assert_eq!(
            config.get(BOOTSTRAP_SERVERS),
            Some("broker1:9092,broker2:9092")
        );
        assert_eq!(config.get(RETRIES), Some("1"));
    }
}
