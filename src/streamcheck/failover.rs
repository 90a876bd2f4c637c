//! Failover client gateway.
//!
//! Wraps an ordered list of per-endpoint clients behind two call
//! shapes: single-result and sequence-returning invocation. Callers
//! treat the gateway as an opaque capability; endpoint selection here
//! is a deliberately minimal first-success traversal that stops early
//! when an error would repeat on every endpoint anyway.

use crate::streamcheck::clients::ClientError;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FailoverError {
    #[error("no endpoints configured")]
    NoTargets,
    /// All endpoints were tried (or traversal stopped on a fatal
    /// error); carries the last failure, displayed verbatim.
    #[error("{0}")]
    Exhausted(ClientError),
}

/// A failover-capable handle over clients of capability `C`.
///
/// Targets are tried in configuration order. `C` is a cheap handle
/// clone (the HTTP clients share one connection pool), so each attempt
/// operates on an owned client.
pub struct Failover<C> {
    targets: Vec<C>,
    retriable: fn(&ClientError) -> bool,
}

impl<C: Clone> Failover<C> {
    /// Builds a gateway over a non-empty target list with the default
    /// retriable-error classification ([`ClientError::is_retriable`]).
    pub fn new(targets: Vec<C>) -> Result<Self, FailoverError> {
        Self::with_predicate(targets, ClientError::is_retriable)
    }

    /// Same as [`Failover::new`] with a custom classification of which
    /// errors justify moving on to the next endpoint.
    pub fn with_predicate(
        targets: Vec<C>,
        retriable: fn(&ClientError) -> bool,
    ) -> Result<Self, FailoverError> {
        if targets.is_empty() {
            return Err(FailoverError::NoTargets);
        }
        Ok(Self { targets, retriable })
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Invokes `op` against the targets in order and returns the first
    /// successful single result.
    pub async fn call_one<T, F, Fut>(&self, op: F) -> Result<T, FailoverError>
    where
        F: Fn(C) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        self.traverse(op).await
    }

    /// Invokes `op` against the targets in order and returns the first
    /// successful sequence of results.
    pub async fn call_many<T, F, Fut>(&self, op: F) -> Result<Vec<T>, FailoverError>
    where
        F: Fn(C) -> Fut,
        Fut: Future<Output = Result<Vec<T>, ClientError>>,
    {
        self.traverse(op).await
    }

    async fn traverse<T, F, Fut>(&self, op: F) -> Result<T, FailoverError>
    where
        F: Fn(C) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut last: Option<ClientError> = None;
        for (index, target) in self.targets.iter().enumerate() {
            match op(target.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let keep_going = (self.retriable)(&e);
                    log::debug!(
                        "failover target {}/{} failed ({}){}",
                        index + 1,
                        self.targets.len(),
                        e,
                        if keep_going { ", trying next" } else { "" }
                    );
                    last = Some(e);
                    if !keep_going {
                        break;
                    }
                }
            }
        }
        match last {
            Some(e) => Err(FailoverError::Exhausted(e)),
            // Unreachable with a non-empty target list, but the
            // constructor invariant is not encoded in the type.
            None => Err(FailoverError::NoTargets),
        }
    }
}
