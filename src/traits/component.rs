//! Implementation-side traits: constructors, parameters and arguments.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::generic::OpenContract;
use crate::key::{ContractId, DependencyKey};
use crate::provider::ResolutionContext;
use crate::registration::{downcast, AnyArc};

/// A concrete, instantiable implementation type.
///
/// A component declares its constructors explicitly. Registration accepts a
/// component only if it declares exactly one constructor: none means the
/// type cannot be instantiated, several would be ambiguous.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Component, Constructor, Resolver, ServiceCollection, implements};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
/// impl Component for English {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(English))]
///     }
/// }
/// implements!(English: dyn Greeter);
///
/// struct Front {
///     greeter: Arc<dyn Greeter>,
/// }
/// impl Component for Front {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|args| Ok(Front { greeter: args.next()? }))
///             .param::<dyn Greeter>()]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_per_request::<dyn Greeter, English>().unwrap();
/// services.add_per_request::<Front, Front>().unwrap();
///
/// let provider = services.build();
/// assert_eq!(provider.resolve::<Front>().unwrap().greeter.greet(), "hello");
/// ```
pub trait Component: Send + Sync + Sized + 'static {
    /// The constructors this type exposes.
    fn constructors() -> Vec<Constructor<Self>>;
}

/// Marks a component as satisfying contract `C`.
///
/// Every component satisfies itself. Trait-object contracts need a one-line
/// unsizing impl, which [`implements!`](crate::implements) writes.
pub trait Implements<C: ?Sized + Send + Sync + 'static>: Component {
    fn upcast(self: Arc<Self>) -> Arc<C>;
}

impl<T: Component> Implements<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Writes `Implements<dyn Contract>` for a component.
///
/// ```rust
/// use ferrous_wire::{Component, Constructor, implements};
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
///
/// struct File;
/// impl Reader for File {}
/// impl Writer for File {}
/// impl Component for File {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(File))]
///     }
/// }
///
/// implements!(File: dyn Reader, dyn Writer);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty : $($contract:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$contract> for $implementation {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$contract> {
                    self
                }
            }
        )+
    };
}

type BuildFn<T> = Arc<dyn Fn(&mut Arguments) -> DiResult<T> + Send + Sync>;

/// A constructor: ordered parameter metadata plus the function that builds
/// the instance from the resolved arguments.
///
/// Parameters are resolved in declaration order and handed to the build
/// function through [`Arguments`], which must consume them in that same order.
pub struct Constructor<T> {
    parameters: Vec<Parameter>,
    build: BuildFn<T>,
}

impl<T: 'static> Constructor<T> {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            parameters: Vec::new(),
            build: Arc::new(build),
        }
    }

    /// Appends an unqualified parameter of contract `C`.
    pub fn param<C: ?Sized + Send + Sync + 'static>(self) -> Self {
        self.with(Parameter::of::<C>())
    }

    /// Appends a parameter of contract `C` qualified by `key`.
    pub fn keyed<C: ?Sized + Send + Sync + 'static>(self, key: impl Into<DependencyKey>) -> Self {
        self.with(Parameter::keyed::<C>(key))
    }

    /// Appends a parameter receiving every registered implementation of `C`.
    pub fn all<C: ?Sized + Send + Sync + 'static>(self) -> Self {
        self.with(Parameter::all::<C>())
    }

    /// Appends a closed generic parameter `F::Closed<E>`.
    pub fn generic<F, E>(self) -> Self
    where
        F: OpenContract,
        E: ?Sized + Send + Sync + 'static,
    {
        self.with(Parameter::generic::<F, E>(DependencyKey::DEFAULT))
    }

    /// Appends a closed generic parameter `F::Closed<E>` qualified by `key`.
    pub fn generic_keyed<F, E>(self, key: impl Into<DependencyKey>) -> Self
    where
        F: OpenContract,
        E: ?Sized + Send + Sync + 'static,
    {
        self.with(Parameter::generic::<F, E>(key))
    }

    pub fn with(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn into_parts(self) -> (Vec<Parameter>, BuildFn<T>) {
        (self.parameters, self.build)
    }
}

/// How a parameter is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ParameterKind {
    /// One implementation of the contract, selected by key
    Single,
    /// Every implementation of the contract, in registration order
    Collection,
    /// A closed generic contract, bound from an open template when needed
    Generic,
}

type ResolveFn = fn(&ResolutionContext<'_>, DependencyKey) -> DiResult<AnyArc>;

/// Statically declared metadata for one constructor parameter.
#[derive(Clone, Copy)]
pub struct Parameter {
    contract: ContractId,
    kind: ParameterKind,
    key: DependencyKey,
    resolve: ResolveFn,
}

impl Parameter {
    pub fn of<C: ?Sized + Send + Sync + 'static>() -> Self {
        Self::keyed::<C>(DependencyKey::DEFAULT)
    }

    pub fn keyed<C: ?Sized + Send + Sync + 'static>(key: impl Into<DependencyKey>) -> Self {
        Self {
            contract: ContractId::of::<C>(),
            kind: ParameterKind::Single,
            key: key.into(),
            resolve: resolve_single::<C>,
        }
    }

    pub fn all<C: ?Sized + Send + Sync + 'static>() -> Self {
        Self {
            contract: ContractId::of::<C>(),
            kind: ParameterKind::Collection,
            key: DependencyKey::DEFAULT,
            resolve: resolve_collection::<C>,
        }
    }

    pub fn generic<F, E>(key: impl Into<DependencyKey>) -> Self
    where
        F: OpenContract,
        E: ?Sized + Send + Sync + 'static,
    {
        Self {
            contract: ContractId::of::<F::Closed<E>>(),
            kind: ParameterKind::Generic,
            key: key.into(),
            resolve: resolve_generic::<F, E>,
        }
    }

    pub fn contract(&self) -> ContractId {
        self.contract
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn key(&self) -> DependencyKey {
        self.key
    }

    pub(crate) fn resolve(&self, ctx: &ResolutionContext<'_>) -> DiResult<AnyArc> {
        (self.resolve)(ctx, self.key)
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("contract", &self.contract)
            .field("kind", &self.kind)
            .field("key", &self.key)
            .finish()
    }
}

fn resolve_single<C: ?Sized + Send + Sync + 'static>(
    ctx: &ResolutionContext<'_>,
    key: DependencyKey,
) -> DiResult<AnyArc> {
    ctx.resolve_any(&ContractId::of::<C>(), key)
}

fn resolve_collection<C: ?Sized + Send + Sync + 'static>(
    ctx: &ResolutionContext<'_>,
    _key: DependencyKey,
) -> DiResult<AnyArc> {
    let items = ctx
        .resolve_many(&ContractId::of::<C>())?
        .into_iter()
        .map(downcast::<C>)
        .collect::<DiResult<Vec<Arc<C>>>>()?;
    Ok(Arc::new(items))
}

fn resolve_generic<F, E>(ctx: &ResolutionContext<'_>, key: DependencyKey) -> DiResult<AnyArc>
where
    F: OpenContract,
    E: ?Sized + Send + Sync + 'static,
{
    ctx.resolve_generic::<F, E>(key)
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    implementation: &'static str,
    values: std::vec::IntoIter<AnyArc>,
    declared: usize,
    consumed: usize,
}

impl Arguments {
    pub(crate) fn new(implementation: &'static str, values: Vec<AnyArc>) -> Self {
        Self {
            implementation,
            declared: values.len(),
            values: values.into_iter(),
            consumed: 0,
        }
    }

    /// Takes the next argument as a single `C`.
    pub fn next<C: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<C>> {
        downcast::<C>(self.take()?)
    }

    /// Takes the next argument as a collection of `C`.
    pub fn next_all<C: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Vec<Arc<C>>> {
        self.take()?
            .downcast::<Vec<Arc<C>>>()
            .map(|items| (*items).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<Vec<Arc<C>>>()))
    }

    /// Number of arguments not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn take(&mut self) -> DiResult<AnyArc> {
        match self.values.next() {
            Some(value) => {
                self.consumed += 1;
                Ok(value)
            }
            None => Err(DiError::ArgumentMismatch {
                implementation: self.implementation,
                declared: self.declared,
                consumed: self.consumed + 1,
            }),
        }
    }

    pub(crate) fn finish(&self) -> DiResult<()> {
        if self.consumed == self.declared {
            Ok(())
        } else {
            Err(DiError::ArgumentMismatch {
                implementation: self.implementation,
                declared: self.declared,
                consumed: self.consumed,
            })
        }
    }
}
