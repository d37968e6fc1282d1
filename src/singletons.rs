//! Container-owned singleton cache with insert-if-absent publication.
//!
//! Construction never happens under a cache lock. Threads that miss the
//! cache build their own instance (including the full recursive parameter
//! resolution) and then race to publish it. The first publish wins; every
//! loser drops its instance and returns the winner's, so callers only ever
//! observe one instance per key.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::key::{ContractId, ImplementationId};
use crate::registration::{AnyArc, Map};

/// Number of shards. Powers of 2 work best for hash distribution.
const SHARD_COUNT: usize = 64;

/// Cache key for a published singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingletonKey {
    /// One instance per contract and registration position
    Contract(ContractId, usize),
    /// One instance per implementation type, shared by every contract it serves
    Implementation(ImplementationId),
}

/// Sharded map of published singleton instances.
///
/// Entries are never evicted; the cache lives exactly as long as the
/// provider that owns it.
pub struct SingletonCache {
    shards: [RwLock<Map<SingletonKey, AnyArc>>; SHARD_COUNT],
    races_lost: AtomicU64,
}

/// Point-in-time counters for a [`SingletonCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SingletonStats {
    /// Instances currently published
    pub cached: usize,
    /// Constructions discarded because another thread published first
    pub races_lost: u64,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| RwLock::new(Map::default())),
            races_lost: AtomicU64::new(0),
        }
    }

    /// Returns the published instance for `key`, if any.
    #[inline]
    pub fn get(&self, key: &SingletonKey) -> Option<AnyArc> {
        self.shard(key).read().get(key).cloned()
    }

    /// Publishes `candidate` unless an instance already exists.
    ///
    /// Returns the surviving instance and whether `candidate` was the one published.
    pub fn insert_if_absent(&self, key: SingletonKey, candidate: AnyArc) -> (AnyArc, bool) {
        let mut shard = self.shard(&key).write();
        if let Some(existing) = shard.get(&key) {
            self.races_lost.fetch_add(1, Ordering::Relaxed);
            return (existing.clone(), false);
        }
        shard.insert(key, candidate.clone());
        (candidate, true)
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> SingletonStats {
        SingletonStats {
            cached: self.len(),
            races_lost: self.races_lost.load(Ordering::Relaxed),
        }
    }

    fn shard(&self, key: &SingletonKey) -> &RwLock<Map<SingletonKey, AnyArc>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }
}

impl Default for SingletonCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SingletonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonCache")
            .field("stats", &self.stats())
            .finish()
    }
}
