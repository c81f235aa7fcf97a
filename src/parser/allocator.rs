//! Dense string-to-token-ID allocation shared across parsers.

use std::fmt::Debug;

use ahash::AHashMap;
use parking_lot::RwLock;

use super::TokenId;

/// Allocates dense token IDs for canonicalized string values.
///
/// One allocator is shared by every parser a builder creates, so equal
/// strings map to equal tokens across fields. Allocation happens on the
/// single-owner build path; lookup happens on the concurrent query path.
pub trait IdAllocator: Send + Sync + Debug {
    /// Return the ID for `value`, allocating the next dense ID on first sight.
    fn alloc(&self, value: &str) -> TokenId;

    /// Return the ID for `value` if one was ever allocated.
    fn find(&self, value: &str) -> Option<TokenId>;

    /// Number of distinct values seen so far.
    fn len(&self) -> usize;

    /// Whether no value has been allocated yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The default allocator: a lock-protected hash table, IDs dense from zero.
#[derive(Debug, Default)]
pub struct StringIdAllocator {
    ids: RwLock<AHashMap<String, TokenId>>,
}

impl StringIdAllocator {
    /// Create an empty allocator.
    pub fn new() -> Self {
        StringIdAllocator::default()
    }
}

impl IdAllocator for StringIdAllocator {
    fn alloc(&self, value: &str) -> TokenId {
        let mut ids = self.ids.write();
        if let Some(id) = ids.get(value) {
            return *id;
        }
        let next = ids.len() as TokenId;
        ids.insert(value.to_string(), next);
        next
    }

    fn find(&self, value: &str) -> Option<TokenId> {
        self.ids.read().get(value).copied()
    }

    fn len(&self) -> usize {
        self.ids.read().len()
    }
}
