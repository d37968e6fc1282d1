//! Resolver traits for contract resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::DiResult;
use crate::generic::OpenContract;
use crate::key::{ContractId, DependencyKey};
use crate::provider::ResolutionContext;
use crate::registration::downcast;

/// Object-safe resolution entry points.
///
/// Every call starts a fresh [`ResolutionContext`]; nested dependencies of
/// that call share its resolution stack, so cycles are detected per call and
/// never across threads.
///
/// Most users should use the [`Resolver`] trait instead, which layers typed
/// methods over this one.
pub trait ResolverCore: Send + Sync {
    /// Starts a new top-level resolution.
    fn begin(&self) -> ResolutionContext<'_>;

    /// Resolves the implementation of `contract` registered at `key`.
    ///
    /// The result is the erased contract handle (`Arc<Arc<C>>` behind `dyn Any`).
    fn resolve_any(
        &self,
        contract: &ContractId,
        key: DependencyKey,
    ) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.begin().resolve_any(contract, key)
    }

    /// Resolves every implementation of `contract` in registration order.
    fn resolve_many(&self, contract: &ContractId) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>> {
        self.begin().resolve_many(contract)
    }
}

/// Typed resolution on top of [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Component, Constructor, DependencyKey, Resolver, ServiceCollection, implements};
///
/// trait Store: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
///
/// struct Memory;
/// impl Store for Memory {
///     fn name(&self) -> &'static str { "memory" }
/// }
/// impl Component for Memory {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::new(|_| Ok(Memory))] }
/// }
///
/// struct Disk;
/// impl Store for Disk {
///     fn name(&self) -> &'static str { "disk" }
/// }
/// impl Component for Disk {
///     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::new(|_| Ok(Disk))] }
/// }
///
/// implements!(Memory: dyn Store);
/// implements!(Disk: dyn Store);
///
/// let mut services = ServiceCollection::new();
/// services.add_per_request::<dyn Store, Memory>().unwrap();
/// services.add_per_request::<dyn Store, Disk>().unwrap();
/// let provider = services.build();
///
/// assert_eq!(provider.resolve::<dyn Store>().unwrap().name(), "memory");
/// assert_eq!(provider.resolve_keyed::<dyn Store>(DependencyKey::new(1)).unwrap().name(), "disk");
///
/// let names: Vec<_> = provider.resolve_all::<dyn Store>().unwrap().iter().map(|s| s.name()).collect();
/// assert_eq!(names, ["memory", "disk"]);
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the default (ordinal 0) implementation of `C`.
    fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<C>> {
        self.resolve_keyed::<C>(DependencyKey::DEFAULT)
    }

    /// Resolves the implementation of `C` selected by `key`.
    ///
    /// Fails with `KeyOutOfRange` when the ordinal is not below the number of
    /// registered implementations.
    fn resolve_keyed<C: ?Sized + Send + Sync + 'static>(
        &self,
        key: impl Into<DependencyKey>,
    ) -> DiResult<Arc<C>> {
        downcast::<C>(self.resolve_any(&ContractId::of::<C>(), key.into())?)
    }

    /// Resolves every implementation of `C` in registration order.
    fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<C>>> {
        self.resolve_many(&ContractId::of::<C>())?
            .into_iter()
            .map(downcast::<C>)
            .collect()
    }

    /// Resolves the closed generic contract `F::Closed<E>`.
    fn resolve_generic<F, E>(&self) -> DiResult<Arc<F::Closed<E>>>
    where
        F: OpenContract,
        E: ?Sized + Send + Sync + 'static,
    {
        self.resolve_generic_keyed::<F, E>(DependencyKey::DEFAULT)
    }

    /// Resolves the closed generic contract `F::Closed<E>` selected by `key`.
    fn resolve_generic_keyed<F, E>(&self, key: impl Into<DependencyKey>) -> DiResult<Arc<F::Closed<E>>>
    where
        F: OpenContract,
        E: ?Sized + Send + Sync + 'static,
    {
        downcast::<F::Closed<E>>(self.begin().resolve_generic::<F, E>(key.into())?)
    }

    /// Resolves `C`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error's message.
    fn resolve_required<C: ?Sized + Send + Sync + 'static>(&self) -> Arc<C> {
        match self.resolve::<C>() {
            Ok(instance) => instance,
            Err(e) => panic!("Failed to resolve {}: {}", std::any::type_name::<C>(), e),
        }
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
