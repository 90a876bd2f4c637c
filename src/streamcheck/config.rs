//! Connection specifications supplied by the caller.
//!
//! These types describe *how to reach* a dependent service. They are
//! read-only inputs to the validation entry points: the caller (normally
//! the surrounding configuration-management layer) owns them, and this
//! crate never mutates or persists them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Trust material used to verify a broker's identity over TLS.
///
/// Validation of the referenced bundle only happens when *both* fields
/// are present; see [`crate::streamcheck::security::validate_trust_material`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustMaterialConfig {
    /// Path to a PEM certificate bundle.
    #[serde(default)]
    pub location: Option<PathBuf>,
    /// Password that gates activation of trust-material checking.
    #[serde(default)]
    pub password: Option<String>,
}

/// Client key material for mutual TLS authentication.
///
/// A present `location` alone is enough to switch the assembled cluster
/// properties to the secured protocol; the password is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterialConfig {
    /// Path to a PKCS#12 keystore.
    #[serde(default)]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Everything needed to attempt one connection to a broker cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConnectionSpec {
    /// Broker list, e.g. `"broker1:9092,broker2:9092"`.
    pub bootstrap_servers: String,
    /// Caller-supplied client properties, merged verbatim over the
    /// derived transport-security layers.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub truststore: TrustMaterialConfig,
    #[serde(default)]
    pub keystore: KeyMaterialConfig,
}

/// Endpoints and credentials for one HTTP-facing service (schema
/// registry, connector framework or streaming-SQL engine).
///
/// More than one address activates failover: endpoints are tried in the
/// order given here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServiceSpec {
    pub addresses: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_spec_deserializes_with_defaults() {
        let spec: ClusterConnectionSpec =
            serde_yaml::from_str("bootstrap_servers: localhost:9092").unwrap();
        assert_eq!(spec.bootstrap_servers, "localhost:9092");
        assert!(spec.properties.is_empty());
        assert!(spec.truststore.location.is_none());
        assert!(spec.keystore.location.is_none());
    }

    #[test]
    fn cluster_spec_deserializes_security_material() {
        let yaml = r#"
bootstrap_servers: broker:9093
properties:
  sasl.mechanism: PLAIN
truststore:
  location: /etc/certs/ca.pem
  password: changeit
keystore:
  location: /etc/certs/client.p12
"#;
        let spec: ClusterConnectionSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            spec.truststore.location.as_deref(),
            Some(std::path::Path::new("/etc/certs/ca.pem"))
        );
        assert_eq!(spec.truststore.password.as_deref(), Some("changeit"));
        assert!(spec.keystore.password.is_none());
        assert_eq!(spec.properties["sasl.mechanism"], "PLAIN");
    }

    #[test]
    fn http_service_spec_deserializes_address_list() {
        let yaml = r#"
addresses:
  - http://sr1:8081
  - http://sr2:8081
username: admin
"#;
        let spec: HttpServiceSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.addresses.len(), 2);
        assert_eq!(spec.username.as_deref(), Some("admin"));
        assert!(spec.password.is_none());
    }
}
