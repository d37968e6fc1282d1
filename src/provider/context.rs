//! The recursive resolution algorithm.
//!
//! A [`ResolutionContext`] lives for exactly one top-level resolve call. It
//! carries the per-call resolution stack used for cycle detection and is
//! threaded through every nested parameter resolution.

use std::any::TypeId;
use std::collections::HashSet;
use std::time::Instant;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::config::SingletonSharing;
use crate::error::{DiError, DiResult};
use crate::generic::{OpenContract, TemplateSet};
use crate::internal::ResolutionStack;
use crate::key::{ContractId, DependencyKey};
use crate::registration::{AnyArc, ImplementationRecord};
use crate::singletons::SingletonKey;
use crate::traits::{Arguments, ParameterKind};

use super::ProviderInner;

/// Scalar types that can never be constructor dependencies.
static PRIMITIVES: Lazy<HashSet<TypeId>> = Lazy::new(|| {
    [
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<()>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
    ]
    .into_iter()
    .collect()
});

/// State of one in-flight resolution call.
///
/// Obtained from [`ResolverCore::begin`](crate::ResolverCore::begin). Not
/// `Sync`: a context belongs to the thread that started the call.
pub struct ResolutionContext<'a> {
    inner: &'a ProviderInner,
    stack: ResolutionStack,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(inner: &'a ProviderInner) -> Self {
        Self {
            inner,
            stack: ResolutionStack::new(inner.options.depth_limit()),
        }
    }

    /// Number of resolutions currently nested in this call.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Resolves the implementation of `contract` registered at `key`.
    pub fn resolve_any(&self, contract: &ContractId, key: DependencyKey) -> DiResult<AnyArc> {
        self.observed(contract, key, || {
            let _frame = self.stack.enter(*contract, key)?;
            let records = self.inner.registry.lookup(contract)?;
            let record = records.get(key.ordinal()).ok_or(DiError::KeyOutOfRange {
                contract: contract.name(),
                key: key.ordinal(),
                registered: records.len(),
            })?;
            trace!(
                contract = contract.name(),
                key = key.ordinal(),
                implementation = record.implementation.name(),
                depth = self.stack.depth(),
                "Resolving"
            );
            self.instantiate(contract, key.ordinal(), record)
        })
    }

    /// Resolves every implementation of `contract`, in registration order.
    pub fn resolve_many(&self, contract: &ContractId) -> DiResult<Vec<AnyArc>> {
        let records = self.inner.registry.lookup(contract)?;
        trace!(contract = contract.name(), count = records.len(), "Resolving collection");

        let mut items = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let key = DependencyKey::new(position);
            let item = self.observed(contract, key, || {
                let _frame = self.stack.enter(*contract, key)?;
                self.instantiate(contract, position, record)
            })?;
            items.push(item);
        }
        Ok(items)
    }

    /// Resolves the closed contract `F::Closed<E>` at `key`, binding an open
    /// template when the closed form is not registered itself.
    pub fn resolve_generic<F, E>(&self, key: DependencyKey) -> DiResult<AnyArc>
    where
        F: OpenContract,
        E: ?Sized + Send + Sync + 'static,
    {
        let closed = ContractId::of::<F::Closed<E>>();
        if self.inner.registry.contains(&closed) {
            return self.resolve_any(&closed, key);
        }

        self.observed(&closed, key, || {
            let _frame = self.stack.enter(closed, key)?;
            let family = ContractId::of::<F>();
            let templates = self
                .inner
                .registry
                .lookup_open(&family)
                .ok_or(DiError::NotRegistered(closed.name()))?;
            let open = templates.get(key.ordinal()).ok_or(DiError::KeyOutOfRange {
                contract: closed.name(),
                key: key.ordinal(),
                registered: templates.len(),
            })?;

            let element = ContractId::of::<E>();
            if !self.inner.registry.contains(&element) {
                return Err(DiError::NotRegistered(element.name()));
            }

            let binding = <F::Templates as TemplateSet<F>>::close::<E>(open.template.type_id())
                .ok_or_else(|| DiError::InvalidImplementation {
                    implementation: open.template.name(),
                    reason: format!("not a template of {}", family.name()),
                })??;
            let record = binding.into_record().with_lifecycle(open.lifecycle);

            trace!(
                contract = closed.name(),
                key = key.ordinal(),
                template = open.template.name(),
                implementation = record.implementation.name(),
                "Bound open template"
            );
            self.instantiate(&closed, key.ordinal(), &record)
        })
    }

    fn observed<T, F>(&self, contract: &ContractId, key: DependencyKey, resolve: F) -> DiResult<T>
    where
        F: FnOnce() -> DiResult<T>,
    {
        let observers = &self.inner.observers;
        if !observers.has_observers() {
            return resolve();
        }

        let start = Instant::now();
        observers.resolving(contract, key);
        let result = resolve();
        match &result {
            Ok(_) => observers.resolved(contract, key, start.elapsed()),
            Err(error) => observers.failed(contract, key, error),
        }
        result
    }

    fn instantiate(
        &self,
        contract: &ContractId,
        position: usize,
        record: &ImplementationRecord,
    ) -> DiResult<AnyArc> {
        // Per-implementation entries are shared with every record of that
        // implementation, per-request ones included.
        let lookup_key = match self.inner.options.sharing() {
            SingletonSharing::PerContract => record
                .lifecycle
                .is_singleton()
                .then_some(SingletonKey::Contract(*contract, position)),
            SingletonSharing::PerImplementation => Some(SingletonKey::Implementation(record.implementation)),
        };

        if let Some(lookup_key) = &lookup_key {
            if let Some(instance) = self.inner.singletons.get(lookup_key) {
                return (record.upcast)(instance);
            }
        }

        let cache_key = lookup_key.filter(|_| record.lifecycle.is_singleton());

        for (index, parameter) in record.parameters.iter().enumerate() {
            if parameter.kind() == ParameterKind::Single
                && PRIMITIVES.contains(&parameter.contract().type_id())
            {
                return Err(DiError::InvalidParameter {
                    implementation: record.implementation.name(),
                    position: index,
                    parameter: parameter.contract().name(),
                });
            }
        }

        let values = record
            .parameters
            .iter()
            .map(|parameter| parameter.resolve(self))
            .collect::<DiResult<Vec<_>>>()?;

        let mut args = Arguments::new(record.implementation.name(), values);
        let instance = (record.build)(&mut args)?;
        args.finish()?;

        let instance = match cache_key {
            Some(cache_key) => {
                let (kept, published) = self.inner.singletons.insert_if_absent(cache_key, instance);
                if !published {
                    debug!(
                        contract = contract.name(),
                        implementation = record.implementation.name(),
                        "Singleton race lost, discarding constructed instance"
                    );
                }
                kept
            }
            None => instance,
        };

        (record.upcast)(instance)
    }
}
