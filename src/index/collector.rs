//! Result collection: deduplicated document IDs with a process-wide pool.

use std::sync::LazyLock;

use ahash::AHashSet;
use parking_lot::Mutex;

use crate::document::DocId;

use super::entry::{ConjId, DocIdList};

/// Accumulates satisfied documents during retrieval.
///
/// A document with several satisfied conjunctions must appear once in the
/// final result, so implementations deduplicate by document ID.
pub trait ResultCollector: Send {
    /// Record a hit. `conj` identifies the satisfied conjunction for
    /// collectors that care which rule fired.
    fn add(&mut self, doc: DocId, conj: ConjId);

    /// Clear accumulated state for reuse.
    fn reset(&mut self);
}

/// The default collector: a hash set of document IDs.
#[derive(Debug, Default)]
pub struct DocIdCollector {
    docs: AHashSet<DocId>,
}

impl DocIdCollector {
    pub fn new() -> Self {
        DocIdCollector::default()
    }

    /// Number of distinct documents collected.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// The collected documents, ascending.
    pub fn doc_ids(&self) -> DocIdList {
        let mut ids: DocIdList = self.docs.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Take the collected documents, leaving the collector empty and
    /// reusable.
    pub fn drain(&mut self) -> DocIdList {
        let ids = self.doc_ids();
        self.docs.clear();
        ids
    }
}

impl ResultCollector for DocIdCollector {
    fn add(&mut self, doc: DocId, _conj: ConjId) {
        self.docs.insert(doc);
    }

    fn reset(&mut self) {
        self.docs.clear();
    }
}

static COLLECTOR_POOL: LazyLock<Mutex<Vec<DocIdCollector>>> =
    LazyLock::new(|| Mutex::new(Vec::new()));

/// Take a collector from the process-wide pool, or a fresh one.
pub fn pick_collector() -> DocIdCollector {
    COLLECTOR_POOL.lock().pop().unwrap_or_default()
}

/// Return a collector to the pool after resetting it.
pub fn put_collector(mut collector: DocIdCollector) {
    collector.reset();
    COLLECTOR_POOL.lock().push(collector);
}
