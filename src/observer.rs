//! Diagnostic observers for resolution events.
//!
//! Observers are registered on the [`ServiceCollection`](crate::ServiceCollection)
//! and frozen into the provider. With none registered the resolver skips the
//! timing bookkeeping entirely.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::DiError;
use crate::key::{ContractId, DependencyKey};

/// Observer of resolution events.
///
/// Calls are made synchronously on the resolving thread, once per contract
/// resolution including nested ones. Keep implementations cheap.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ContractId, DependencyKey, DiError, DiObserver, ServiceCollection};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting {
///     failures: AtomicUsize,
/// }
///
/// impl DiObserver for Counting {
///     fn resolving(&self, _contract: &ContractId, _key: DependencyKey) {}
///     fn resolved(&self, _contract: &ContractId, _key: DependencyKey, _elapsed: Duration) {}
///     fn failed(&self, _contract: &ContractId, _key: DependencyKey, _error: &DiError) {
///         self.failures.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(Counting::default()));
/// let provider = services.build();
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a contract is looked up.
    fn resolving(&self, contract: &ContractId, key: DependencyKey);

    /// Called after a contract resolved, with the time spent including dependencies.
    fn resolved(&self, contract: &ContractId, key: DependencyKey, elapsed: Duration);

    /// Called when resolving a contract failed. Nested failures are reported
    /// at every level they pass through.
    fn failed(&self, contract: &ContractId, key: DependencyKey, error: &DiError);
}

#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, contract: &ContractId, key: DependencyKey) {
        for observer in &self.observers {
            observer.resolving(contract, key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, contract: &ContractId, key: DependencyKey, elapsed: Duration) {
        for observer in &self.observers {
            observer.resolved(contract, key, elapsed);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, contract: &ContractId, key: DependencyKey, error: &DiError) {
        for observer in &self.observers {
            observer.failed(contract, key, error);
        }
    }
}

/// Observer that forwards events to `tracing`.
///
/// Successful resolutions are emitted at `trace`, slow ones at `debug`,
/// failures at `warn`.
///
/// ```
/// use ferrous_wire::{LoggingObserver, ServiceCollection};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(LoggingObserver::new().slow_threshold(Duration::from_millis(5))));
/// ```
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    slow_threshold: Duration,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            slow_threshold: Duration::from_millis(10),
        }
    }

    /// Resolutions at or above this duration are logged at `debug`.
    pub fn slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, contract: &ContractId, key: DependencyKey) {
        trace!(contract = contract.name(), key = key.ordinal(), "Resolving");
    }

    fn resolved(&self, contract: &ContractId, key: DependencyKey, elapsed: Duration) {
        if elapsed >= self.slow_threshold {
            debug!(contract = contract.name(), key = key.ordinal(), ?elapsed, "Slow resolution");
        } else {
            trace!(contract = contract.name(), key = key.ordinal(), ?elapsed, "Resolved");
        }
    }

    fn failed(&self, contract: &ContractId, key: DependencyKey, error: &DiError) {
        warn!(contract = contract.name(), key = key.ordinal(), %error, "Resolution failed");
    }
}
