//! Implementation records and the registry that holds them.

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

use crate::descriptors::{ParameterDescriptor, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::key::{ContractId, ImplementationId};
use crate::lifecycle::Lifecycle;
use crate::traits::{Arguments, Parameter};

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = ahash::AHashMap<K, V>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

/// Builds the implementation instance, erased as `Arc<Impl>`.
pub(crate) type BuildFn = Arc<dyn Fn(&mut Arguments) -> DiResult<AnyArc> + Send + Sync>;
/// Turns an erased `Arc<Impl>` into an erased contract handle.
pub(crate) type UpcastFn = fn(AnyArc) -> DiResult<AnyArc>;

/// Contract handles are stored as `Arc<Arc<C>>` so unsized contracts fit in `Any`.
#[inline]
pub(crate) fn erase<C: ?Sized + Send + Sync + 'static>(value: Arc<C>) -> AnyArc {
    Arc::new(value)
}

#[inline]
pub(crate) fn downcast<C: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<C>> {
    any.downcast::<Arc<C>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<C>()))
}

/// Immutable pair of implementation identity and lifecycle, plus the
/// constructor metadata needed to build it.
#[derive(Clone)]
pub(crate) struct ImplementationRecord {
    pub(crate) implementation: ImplementationId,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) build: BuildFn,
    pub(crate) upcast: UpcastFn,
}

impl ImplementationRecord {
    pub(crate) fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

/// Registration of an open generic template for a contract family.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenRecord {
    pub(crate) template: ImplementationId,
    pub(crate) lifecycle: Lifecycle,
}

/// Contract → ordered implementation list. Built once, read-only afterwards.
pub(crate) struct Registry {
    contracts: Map<ContractId, Vec<ImplementationRecord>>,
    open: Map<ContractId, Vec<OpenRecord>>,
    /// First-registration order of closed and open contracts, for introspection
    order: Vec<ContractId>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            contracts: Map::default(),
            open: Map::default(),
            order: Vec::new(),
        }
    }

    /// Appends a record to the contract's list, creating the list if absent.
    pub(crate) fn register(&mut self, contract: ContractId, record: ImplementationRecord) {
        debug!(
            contract = contract.name(),
            implementation = record.implementation.name(),
            lifecycle = ?record.lifecycle,
            position = self.contracts.get(&contract).map_or(0, Vec::len),
            "Registered implementation"
        );
        if !self.contracts.contains_key(&contract) && !self.open.contains_key(&contract) {
            self.order.push(contract);
        }
        self.contracts.entry(contract).or_default().push(record);
    }

    pub(crate) fn register_open(&mut self, family: ContractId, record: OpenRecord) {
        debug!(
            family = family.name(),
            template = record.template.name(),
            lifecycle = ?record.lifecycle,
            "Registered open template"
        );
        if !self.contracts.contains_key(&family) && !self.open.contains_key(&family) {
            self.order.push(family);
        }
        self.open.entry(family).or_default().push(record);
    }

    /// Ordered records for a contract; a missing or empty list is `NotRegistered`.
    pub(crate) fn lookup(&self, contract: &ContractId) -> DiResult<&[ImplementationRecord]> {
        match self.contracts.get(contract) {
            Some(records) if !records.is_empty() => Ok(records),
            _ => Err(DiError::NotRegistered(contract.name())),
        }
    }

    pub(crate) fn lookup_open(&self, family: &ContractId) -> Option<&[OpenRecord]> {
        self.open
            .get(family)
            .map(Vec::as_slice)
            .filter(|records| !records.is_empty())
    }

    #[inline]
    pub(crate) fn contains(&self, contract: &ContractId) -> bool {
        self.contracts.get(contract).is_some_and(|records| !records.is_empty())
    }

    /// Total number of closed and open registrations.
    pub(crate) fn len(&self) -> usize {
        self.contracts.values().map(Vec::len).sum::<usize>()
            + self.open.values().map(Vec::len).sum::<usize>()
    }

    pub(crate) fn descriptors(&self) -> Vec<ServiceDescriptor> {
        let mut out = Vec::with_capacity(self.len());
        for contract in &self.order {
            if let Some(records) = self.contracts.get(contract) {
                out.extend(
                    records
                        .iter()
                        .enumerate()
                        .map(|(position, record)| describe(*contract, position, record)),
                );
            }
            if let Some(records) = self.open.get(contract) {
                out.extend(records.iter().enumerate().map(|(position, record)| ServiceDescriptor {
                    contract: *contract,
                    position,
                    implementation: record.template,
                    lifecycle: record.lifecycle,
                    parameters: Vec::new(),
                    open: true,
                }));
            }
        }
        out
    }

    pub(crate) fn descriptors_for(&self, contract: &ContractId) -> DiResult<Vec<ServiceDescriptor>> {
        Ok(self
            .lookup(contract)?
            .iter()
            .enumerate()
            .map(|(position, record)| describe(*contract, position, record))
            .collect())
    }
}

fn describe(contract: ContractId, position: usize, record: &ImplementationRecord) -> ServiceDescriptor {
    ServiceDescriptor {
        contract,
        position,
        implementation: record.implementation,
        lifecycle: record.lifecycle,
        parameters: record
            .parameters
            .iter()
            .map(|p| ParameterDescriptor {
                contract: p.contract(),
                kind: p.kind(),
                key: p.key(),
            })
            .collect(),
        open: false,
    }
}
