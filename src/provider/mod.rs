//! Service provider module.
//!
//! This module contains the [`ServiceProvider`] type, the frozen registry
//! plus the container-owned singleton cache, and the per-call
//! [`ResolutionContext`] that walks constructor dependencies.

use std::sync::Arc;

use crate::config::ResolverOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::DiResult;
use crate::key::ContractId;
use crate::observer::Observers;
use crate::registration::Registry;
use crate::singletons::{SingletonCache, SingletonStats};
use crate::traits::ResolverCore;

pub mod context;
pub use context::ResolutionContext;

/// Resolves contracts from a frozen registry.
///
/// A provider is produced by [`ServiceCollection::build`](crate::ServiceCollection::build)
/// and never changes its registrations afterwards. It is cheap to clone (the
/// state is shared behind an `Arc`) and safe to use from many threads at once.
///
/// # Thread Safety
///
/// Per-request implementations are constructed independently on each call.
/// Singletons are constructed without holding any lock; concurrent first
/// resolutions may each build an instance, but only the first one published
/// to the cache is ever returned.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Component, Constructor, Resolver, ServiceCollection, implements};
/// use std::sync::Arc;
///
/// trait Database: Send + Sync {
///     fn url(&self) -> &str;
/// }
///
/// struct Postgres;
/// impl Database for Postgres {
///     fn url(&self) -> &str { "postgres://localhost" }
/// }
/// impl Component for Postgres {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Postgres))]
///     }
/// }
/// implements!(Postgres: dyn Database);
///
/// struct UserService {
///     db: Arc<dyn Database>,
/// }
/// impl Component for UserService {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|args| Ok(UserService { db: args.next()? }))
///             .param::<dyn Database>()]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton::<dyn Database, Postgres>().unwrap();
/// services.add_per_request::<UserService, UserService>().unwrap();
///
/// let provider = services.build();
/// let users = provider.resolve::<UserService>().unwrap();
/// assert_eq!(users.db.url(), "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) registry: Registry,
    pub(crate) singletons: SingletonCache,
    pub(crate) observers: Observers,
    pub(crate) options: ResolverOptions,
}

impl ServiceProvider {
    pub(crate) fn new(registry: Registry, observers: Observers, options: ResolverOptions) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                singletons: SingletonCache::new(),
                observers,
                options,
            }),
        }
    }

    /// Every registration, grouped by contract in first-registration order.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.inner.registry.descriptors()
    }

    /// The registrations of contract `C`, in registration order.
    ///
    /// Fails with `NotRegistered` when `C` has no registrations.
    pub fn lookup<C: ?Sized + 'static>(&self) -> DiResult<Vec<ServiceDescriptor>> {
        self.inner.registry.descriptors_for(&ContractId::of::<C>())
    }

    pub fn singleton_stats(&self) -> SingletonStats {
        self.inner.singletons.stats()
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.inner.options
    }
}

impl ResolverCore for ServiceProvider {
    fn begin(&self) -> ResolutionContext<'_> {
        ResolutionContext::new(&self.inner)
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("registrations", &self.inner.registry.len())
            .field("observers", &self.inner.observers.len())
            .field("options", &self.inner.options)
            .field("singletons", &self.inner.singletons.stats())
            .finish()
    }
}
