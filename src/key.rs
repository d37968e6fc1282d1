//! Identity and qualifier types for the resolver.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a contract: the type callers depend on.
///
/// Contracts are usually trait objects (`dyn Logger`) but any `'static`
/// type can act as its own contract. Equality and hashing use only the
/// `TypeId`; the name is kept for diagnostics.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::ContractId;
///
/// trait Logger {}
///
/// let a = ContractId::of::<dyn Logger>();
/// let b = ContractId::of::<dyn Logger>();
/// assert_eq!(a, b);
/// assert!(a.name().contains("Logger"));
/// assert_ne!(a, ContractId::of::<String>());
/// ```
#[derive(Clone, Copy)]
pub struct ContractId {
    type_id: TypeId,
    name: &'static str,
}

impl ContractId {
    /// Identity of the contract type `C`.
    #[inline(always)]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The `std::any::type_name` of the contract.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ContractId {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ContractId {}

impl Hash for ContractId {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self.name)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a concrete implementation type.
#[derive(Clone, Copy)]
pub struct ImplementationId {
    type_id: TypeId,
    name: &'static str,
}

impl ImplementationId {
    #[inline(always)]
    pub fn of<I: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<I>(),
            name: std::any::type_name::<I>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ImplementationId {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ImplementationId {}

impl Hash for ImplementationId {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImplementationId({})", self.name)
    }
}

impl fmt::Display for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Positional qualifier selecting one of a contract's registered implementations.
///
/// Ordinal `k` selects the `k`-th registration (registration order, zero
/// based). Ordinal 0 is the unqualified default, so resolving with
/// [`DependencyKey::DEFAULT`] is the same as resolving without a key.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{DependencyKey, Qualifier};
///
/// #[derive(Clone, Copy)]
/// enum Storage {
///     Memory,
///     Disk,
/// }
///
/// impl Qualifier for Storage {
///     fn ordinal(self) -> usize {
///         self as usize
///     }
/// }
///
/// assert_eq!(DependencyKey::from(Storage::Memory), DependencyKey::DEFAULT);
/// assert_eq!(DependencyKey::from(Storage::Disk).ordinal(), 1);
/// assert_eq!(DependencyKey::from(3usize).ordinal(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DependencyKey(usize);

impl DependencyKey {
    /// The unqualified key (ordinal 0).
    pub const DEFAULT: DependencyKey = DependencyKey(0);

    pub const fn new(ordinal: usize) -> Self {
        Self(ordinal)
    }

    pub const fn ordinal(self) -> usize {
        self.0
    }

    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for DependencyKey {
    fn from(ordinal: usize) -> Self {
        Self(ordinal)
    }
}

/// A named qualifier, typically a fieldless enum, translated to an ordinal.
///
/// The resolver only ever sees the ordinal; the enum type itself is not
/// part of any lookup.
pub trait Qualifier: Copy {
    fn ordinal(self) -> usize;
}

impl<Q: Qualifier> From<Q> for DependencyKey {
    fn from(qualifier: Q) -> Self {
        Self(qualifier.ordinal())
    }
}
