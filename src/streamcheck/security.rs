//! Trust material validation.
//!
//! Answers one question before a cluster spec is accepted: can the
//! configured trust bundle actually be loaded and turned into a root
//! certificate store? The check is acquire/validate/release in a single
//! scope; nothing is cached and the loaded store is dropped immediately.

use crate::streamcheck::config::TrustMaterialConfig;
use rustls::RootCertStore;
use rustls_pemfile::certs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustMaterialError {
    #[error("failed to read trust bundle {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("trust bundle {path} is not a readable PEM file")]
    Unreadable { path: PathBuf },
    #[error("trust bundle {path} contains no certificates")]
    Empty { path: PathBuf },
    #[error("no certificate in trust bundle {path} is parsable as a trust anchor")]
    Unparsable { path: PathBuf },
}

/// Validates the trust material referenced by `cfg`.
///
/// Skips (returns `None`) unless both `location` and `password` are
/// present. Otherwise the bundle is read, parsed and loaded into a
/// fresh [`RootCertStore`]; any failure along the way is captured as a
/// displayable message rather than propagated. The trust password is an
/// activation gate: PEM trust anchors are stored unencrypted, so the
/// bundle itself is checked without it.
pub fn validate_trust_material(cfg: &TrustMaterialConfig) -> Option<String> {
    let location = match (&cfg.location, &cfg.password) {
        (Some(location), Some(_password)) => location,
        _ => return None,
    };
    match load_root_store(location) {
        Ok(_store) => None,
        Err(e) => Some(e.to_string()),
    }
}

fn load_root_store(path: &Path) -> Result<RootCertStore, TrustMaterialError> {
    let file = File::open(path).map_err(|source| TrustMaterialError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let raw = certs(&mut reader).map_err(|_| TrustMaterialError::Unreadable {
        path: path.to_path_buf(),
    })?;
    if raw.is_empty() {
        return Err(TrustMaterialError::Empty {
            path: path.to_path_buf(),
        });
    }
    let mut store = RootCertStore::empty();
    let (added, _skipped) = store.add_parsable_certificates(&raw);
    if added == 0 {
        return Err(TrustMaterialError::Unparsable {
            path: path.to_path_buf(),
        });
    }
    Ok(store)
}
