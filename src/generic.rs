//! Open generic contracts and the templates that close them.
//!
//! Rust cannot substitute a type argument into an implementation at run
//! time, so an open registration is expressed as a *template*: a type whose
//! [`Template::close`] is generic over the element type and produces a
//! [`Binding`] for the closed contract. A contract family lists the templates
//! it accepts in [`OpenContract::Templates`]; the resolver picks the
//! registered template by key and dispatches `close::<T>` through that list.
//!
//! # Examples
//!
//! ```rust
//! use ferrous_wire::{
//!     Binding, Component, Constructor, DiResult, Implements, Lifecycle, OpenContract,
//!     Resolver, ServiceCollection, Template, implements,
//! };
//! use std::sync::Arc;
//!
//! trait Repository<T: ?Sized>: Send + Sync {
//!     fn element(&self) -> &Arc<T>;
//! }
//!
//! struct Repositories;
//! impl OpenContract for Repositories {
//!     type Closed<T: ?Sized + Send + Sync + 'static> = dyn Repository<T>;
//!     type Templates = (MemoryTemplate,);
//! }
//!
//! struct MemoryRepository<T: ?Sized> {
//!     element: Arc<T>,
//! }
//! impl<T: ?Sized + Send + Sync + 'static> Repository<T> for MemoryRepository<T> {
//!     fn element(&self) -> &Arc<T> { &self.element }
//! }
//! impl<T: ?Sized + Send + Sync + 'static> Component for MemoryRepository<T> {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|args| Ok(MemoryRepository { element: args.next()? })).param::<T>()]
//!     }
//! }
//! impl<T: ?Sized + Send + Sync + 'static> Implements<dyn Repository<T>> for MemoryRepository<T> {
//!     fn upcast(self: Arc<Self>) -> Arc<dyn Repository<T>> { self }
//! }
//!
//! struct MemoryTemplate;
//! impl Template<Repositories> for MemoryTemplate {
//!     fn close<T: ?Sized + Send + Sync + 'static>() -> DiResult<Binding<dyn Repository<T>>> {
//!         Binding::of::<MemoryRepository<T>>()
//!     }
//! }
//!
//! trait User: Send + Sync { fn name(&self) -> &str; }
//! struct Alice;
//! impl User for Alice { fn name(&self) -> &str { "alice" } }
//! impl Component for Alice {
//!     fn constructors() -> Vec<Constructor<Self>> { vec![Constructor::new(|_| Ok(Alice))] }
//! }
//! implements!(Alice: dyn User);
//!
//! let mut services = ServiceCollection::new();
//! services.add_per_request::<dyn User, Alice>().unwrap();
//! services.register_open::<Repositories, MemoryTemplate>(Lifecycle::PerRequest).unwrap();
//!
//! let provider = services.build();
//! let repo = provider.resolve_generic::<Repositories, dyn User>().unwrap();
//! assert_eq!(repo.element().name(), "alice");
//! ```

use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::ImplementationId;
use crate::lifecycle::Lifecycle;
use crate::registration::{erase, AnyArc, ImplementationRecord};
use crate::traits::{Arguments, Implements};

/// A generic contract family with exactly one type parameter.
///
/// The implementing type is a marker; its `TypeId` is the identity of the
/// open (unbound) form, distinct from every `Closed<T>`.
pub trait OpenContract: Sized + 'static {
    /// The closed contract for element type `T`.
    type Closed<T: ?Sized + Send + Sync + 'static>: ?Sized + Send + Sync + 'static;
    /// Templates that may be registered for this family.
    type Templates: TemplateSet<Self>;
}

/// A type-token factory producing a closed implementation for any element type.
pub trait Template<F: OpenContract>: 'static {
    fn close<T: ?Sized + Send + Sync + 'static>() -> DiResult<Binding<F::Closed<T>>>;
}

/// The templates declared by a family, dispatched by template identity.
pub trait TemplateSet<F: OpenContract>: 'static {
    fn declares(template: TypeId) -> bool;

    fn close<T: ?Sized + Send + Sync + 'static>(
        template: TypeId,
    ) -> Option<DiResult<Binding<F::Closed<T>>>>;
}

impl<F: OpenContract> TemplateSet<F> for () {
    fn declares(_template: TypeId) -> bool {
        false
    }

    fn close<T: ?Sized + Send + Sync + 'static>(
        _template: TypeId,
    ) -> Option<DiResult<Binding<F::Closed<T>>>> {
        None
    }
}

macro_rules! impl_template_set {
    ($($template:ident),+) => {
        impl<F: OpenContract, $($template: Template<F>),+> TemplateSet<F> for ($($template,)+) {
            fn declares(template: TypeId) -> bool {
                $(template == TypeId::of::<$template>())||+
            }

            fn close<T: ?Sized + Send + Sync + 'static>(
                template: TypeId,
            ) -> Option<DiResult<Binding<F::Closed<T>>>> {
                $(
                    if template == TypeId::of::<$template>() {
                        return Some($template::close::<T>());
                    }
                )+
                None
            }
        }
    };
}

impl_template_set!(A);
impl_template_set!(A, B);
impl_template_set!(A, B, C);
impl_template_set!(A, B, C, D);
impl_template_set!(A, B, C, D, E);
impl_template_set!(A, B, C, D, E, G);
impl_template_set!(A, B, C, D, E, G, H);
impl_template_set!(A, B, C, D, E, G, H, I);

/// A validated implementation bound to contract `C`.
///
/// Produced by [`Binding::of`], which enforces the single-constructor rule.
pub struct Binding<C: ?Sized> {
    record: ImplementationRecord,
    _contract: PhantomData<fn() -> Arc<C>>,
}

impl<C: ?Sized + Send + Sync + 'static> Binding<C> {
    /// Binds implementation `I` to `C` with the [`Lifecycle::PerRequest`] default.
    pub fn of<I: Implements<C>>() -> DiResult<Self> {
        let implementation = ImplementationId::of::<I>();
        let mut constructors = I::constructors();
        let declared = constructors.len();
        let constructor = match (constructors.pop(), declared) {
            (Some(constructor), 1) => constructor,
            (_, 0) => {
                return Err(DiError::InvalidImplementation {
                    implementation: implementation.name(),
                    reason: "no constructor declared; the type is not instantiable".to_string(),
                })
            }
            _ => {
                return Err(DiError::InvalidImplementation {
                    implementation: implementation.name(),
                    reason: format!("{declared} constructors declared; exactly one is supported"),
                })
            }
        };

        let (parameters, build) = constructor.into_parts();
        Ok(Self {
            record: ImplementationRecord {
                implementation,
                lifecycle: Lifecycle::PerRequest,
                parameters,
                build: Arc::new(move |args: &mut Arguments| -> DiResult<AnyArc> {
                    Ok(Arc::new(build(args)?))
                }),
                upcast: upcast_erased::<C, I>,
            },
            _contract: PhantomData,
        })
    }

    pub fn implementation(&self) -> ImplementationId {
        self.record.implementation
    }

    pub(crate) fn into_record(self) -> ImplementationRecord {
        self.record
    }
}

fn upcast_erased<C, I>(instance: AnyArc) -> DiResult<AnyArc>
where
    C: ?Sized + Send + Sync + 'static,
    I: Implements<C>,
{
    let instance = instance
        .downcast::<I>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<I>()))?;
    Ok(erase::<C>(instance.upcast()))
}
