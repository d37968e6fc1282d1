//! Registration descriptors for introspection and diagnostics.

use crate::key::{ContractId, DependencyKey, ImplementationId};
use crate::lifecycle::Lifecycle;
use crate::traits::ParameterKind;

/// One registered implementation of a contract.
///
/// Produced from a frozen registry; editing a descriptor has no effect on
/// resolution.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Component, Constructor, Lifecycle, ParameterKind, ServiceCollection, implements};
///
/// trait Sink: Send + Sync {}
///
/// struct Console;
/// impl Sink for Console {}
/// impl Component for Console {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(Console))]
///     }
/// }
/// implements!(Console: dyn Sink);
///
/// struct Fanout;
/// impl Component for Fanout {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|args| {
///             args.next_all::<dyn Sink>()?;
///             Ok(Fanout)
///         })
///         .all::<dyn Sink>()]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton::<dyn Sink, Console>().unwrap();
/// services.add_per_request::<Fanout, Fanout>().unwrap();
///
/// let descriptors = services.descriptors();
/// assert_eq!(descriptors.len(), 2);
/// assert_eq!(descriptors[0].lifecycle, Lifecycle::Singleton);
/// assert!(descriptors[0].implementation_name().contains("Console"));
/// assert_eq!(descriptors[1].parameters[0].kind, ParameterKind::Collection);
/// assert_eq!(descriptors[1].dependencies().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// The contract this implementation is registered under
    pub contract: ContractId,
    /// Zero-based registration position, which is also the ordinal that selects it
    pub position: usize,
    /// The implementation type, or the template for open registrations
    pub implementation: ImplementationId,
    pub lifecycle: Lifecycle,
    /// Constructor parameters in declaration order (empty for open registrations)
    pub parameters: Vec<ParameterDescriptor>,
    /// `true` for an open generic template registration
    pub open: bool,
}

impl ServiceDescriptor {
    pub fn contract_name(&self) -> &'static str {
        self.contract.name()
    }

    pub fn implementation_name(&self) -> &'static str {
        self.implementation.name()
    }

    /// The key that selects this registration.
    pub fn key(&self) -> DependencyKey {
        DependencyKey::new(self.position)
    }

    /// Whether this is the unqualified default for its contract.
    pub fn is_default(&self) -> bool {
        self.position == 0
    }

    /// Contracts this implementation depends on, in parameter order.
    pub fn dependencies(&self) -> impl Iterator<Item = ContractId> + '_ {
        self.parameters.iter().map(|p| p.contract)
    }
}

/// A constructor parameter as declared by an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub contract: ContractId,
    pub kind: ParameterKind,
    /// Qualifier for single and generic parameters; always the default for collections
    pub key: DependencyKey,
}
