//! Implementation lifecycle definitions.

/// Construction policy attached to every registered implementation.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Component, Constructor, Lifecycle, Resolver, ServiceCollection};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Component for Clock {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Clock))]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.register::<Clock, Clock>(Lifecycle::Singleton).unwrap();
/// let provider = services.build();
///
/// let a = provider.resolve::<Clock>().unwrap();
/// let b = provider.resolve::<Clock>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Lifecycle {
    /// New instance per resolution, never cached.
    ///
    /// The caller of `resolve` owns the instance; the provider keeps no
    /// reference to it.
    #[default]
    PerRequest,
    /// One instance per provider, cached for the provider's lifetime.
    ///
    /// Under contention several threads may each run the constructor before
    /// the first instance is published. Only one instance survives and every
    /// caller observes it, but the constructor itself may run more than once,
    /// so singleton constructors must not have global side effects.
    Singleton,
}

impl Lifecycle {
    /// Returns `true` for [`Lifecycle::Singleton`].
    pub fn is_singleton(self) -> bool {
        matches!(self, Lifecycle::Singleton)
    }
}
