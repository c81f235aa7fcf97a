//! Build cache: replayable per-conjunction indexing transactions.
//!
//! A cache provider stores the serialized transactions of a conjunction
//! keyed by its [`ConjId`], so an identical rebuild can replay them instead
//! of re-parsing every value. The payload round-trips through the owning
//! holder's `decode_tx`; the envelope is a bincode record.

use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};

use super::entry::ConjId;

/// Storage contract for the build cache.
///
/// Providers shared across builders must be internally thread-safe.
pub trait CacheProvider: Send + Sync {
    /// Expire all existing cache data.
    fn reset(&self);

    /// The stored payload for `conj`, if any.
    fn get(&self, conj: ConjId) -> Option<Vec<u8>>;

    /// Store the payload for `conj`.
    fn set(&self, conj: ConjId, data: Vec<u8>);
}

/// One field expression inside a cached conjunction.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FieldTxRecord {
    pub field: String,
    pub eid: u64,
    pub data: Vec<u8>,
}

/// The cache payload for one conjunction.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ConjTxRecord {
    pub conj: u64,
    pub fields: Vec<FieldTxRecord>,
}

impl ConjTxRecord {
    pub(crate) fn encode(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|err| PilumError::serialization(err.to_string()))
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self> {
        let (record, _) = bincode::serde::decode_from_slice::<ConjTxRecord, _>(
            bytes,
            bincode::config::standard(),
        )
        .map_err(|err| PilumError::serialization(err.to_string()))?;
        Ok(record)
    }
}

/// An in-memory provider for tests and single-process builds, with set/hit
/// counters so cache behavior is observable.
#[derive(Debug, Default)]
pub struct MemoryCacheProvider {
    entries: Mutex<AHashMap<u64, Vec<u8>>>,
    sets: AtomicUsize,
    hits: AtomicUsize,
}

impl MemoryCacheProvider {
    pub fn new() -> Self {
        MemoryCacheProvider::default()
    }

    /// Number of `set` calls since creation or the last reset.
    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::Relaxed)
    }

    /// Number of successful `get` calls.
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
}

impl CacheProvider for MemoryCacheProvider {
    fn reset(&self) {
        self.entries.lock().clear();
        self.sets.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }

    fn get(&self, conj: ConjId) -> Option<Vec<u8>> {
        let data = self.entries.lock().get(&conj.raw()).cloned();
        if data.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        data
    }

    fn set(&self, conj: ConjId, data: Vec<u8>) {
        self.entries.lock().insert(conj.raw(), data);
        self.sets.fetch_add(1, Ordering::Relaxed);
    }
}
