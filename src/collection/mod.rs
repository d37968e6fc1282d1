//! Service collection module.
//!
//! This module contains the [`ServiceCollection`] type used during startup
//! to register implementations and build a [`ServiceProvider`].

use std::any::TypeId;
use std::sync::Arc;

use tracing::debug;

use crate::config::ResolverOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::generic::{Binding, OpenContract, Template, TemplateSet};
use crate::key::{ContractId, ImplementationId};
use crate::lifecycle::Lifecycle;
use crate::observer::{DiObserver, Observers};
use crate::registration::{OpenRecord, Registry};
use crate::traits::Implements;
use crate::ServiceProvider;

/// Registration builder.
///
/// Registrations are appended per contract; the position of a registration
/// within its contract is the ordinal that selects it. Registering is a
/// startup activity: the collection is consumed by [`build`](Self::build)
/// and the resulting provider is immutable.
pub struct ServiceCollection {
    registry: Registry,
    observers: Observers,
    options: ResolverOptions,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            observers: Observers::new(),
            options: ResolverOptions::default(),
        }
    }

    /// Registers implementation `I` for contract `C`.
    ///
    /// Fails with `InvalidImplementation` unless `I` declares exactly one
    /// constructor. Registering the same implementation twice appends a
    /// second, independently keyed entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_wire::{Component, Constructor, DiError, Lifecycle, ServiceCollection};
    ///
    /// struct Config;
    /// impl Component for Config {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::new(|_| Ok(Config))]
    ///     }
    /// }
    ///
    /// struct Abstract;
    /// impl Component for Abstract {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         Vec::new()
    ///     }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.register::<Config, Config>(Lifecycle::Singleton).unwrap();
    /// assert!(matches!(
    ///     services.register::<Abstract, Abstract>(Lifecycle::PerRequest),
    ///     Err(DiError::InvalidImplementation { .. })
    /// ));
    /// ```
    pub fn register<C, I>(&mut self, lifecycle: Lifecycle) -> DiResult<&mut Self>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        let record = Binding::<C>::of::<I>()?.into_record().with_lifecycle(lifecycle);
        self.registry.register(ContractId::of::<C>(), record);
        Ok(self)
    }

    /// Registers `I` for `C` with a new instance per resolution.
    pub fn add_per_request<C, I>(&mut self) -> DiResult<&mut Self>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        self.register::<C, I>(Lifecycle::PerRequest)
    }

    /// Registers `I` for `C` as a cached singleton.
    pub fn add_singleton<C, I>(&mut self) -> DiResult<&mut Self>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Implements<C>,
    {
        self.register::<C, I>(Lifecycle::Singleton)
    }

    /// Registers template `T` for the open contract family `F`.
    ///
    /// The template must be listed in `F::Templates`, and closing it must
    /// yield an instantiable implementation.
    pub fn register_open<F, T>(&mut self, lifecycle: Lifecycle) -> DiResult<&mut Self>
    where
        F: OpenContract,
        T: Template<F>,
    {
        let template = ImplementationId::of::<T>();
        if !<F::Templates as TemplateSet<F>>::declares(TypeId::of::<T>()) {
            return Err(DiError::InvalidImplementation {
                implementation: template.name(),
                reason: format!("not a template of {}", std::any::type_name::<F>()),
            });
        }
        // Probe with a unit element so constructor problems surface now, not on first resolve.
        T::close::<()>()?;

        self.registry
            .register_open(ContractId::of::<F>(), OpenRecord { template, lifecycle });
        Ok(self)
    }

    /// Adds an observer notified of every resolution made by the built provider.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Replaces the options used by [`build`](Self::build).
    pub fn with_options(&mut self, options: ResolverOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// The registrations of contract `C`, in registration order.
    pub fn lookup<C: ?Sized + 'static>(&self) -> DiResult<Vec<ServiceDescriptor>> {
        self.registry.descriptors_for(&ContractId::of::<C>())
    }

    /// Every registration, grouped by contract in first-registration order.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.registry.descriptors()
    }

    /// Number of closed and open registrations.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the registry into a provider.
    pub fn build(self) -> ServiceProvider {
        let options = self.options.clone();
        self.build_with(options)
    }

    /// Freezes the registry into a provider using `options`.
    pub fn build_with(self, options: ResolverOptions) -> ServiceProvider {
        debug!(
            registrations = self.registry.len(),
            observers = self.observers.len(),
            sharing = ?options.sharing(),
            max_depth = options.depth_limit(),
            "Built service provider"
        );
        ServiceProvider::new(self.registry, self.observers, options)
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("registrations", &self.registry.len())
            .field("observers", &self.observers.len())
            .field("options", &self.options)
            .finish()
    }
}
