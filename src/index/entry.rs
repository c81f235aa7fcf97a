//! Integer encodings for conjunctions, posting entries and posting keys.
//!
//! All entry sequences sort by the raw integer order of [`EntryId`]; the
//! inclusion flag lives in the least significant bit so that for one
//! conjunction the exclude entry sorts before the include entry. The
//! retrieval engine relies on that tie-break to veto a conjunction before
//! any include on it can emit.

use std::fmt;

use crate::document::{DocId, FieldValue};
use crate::parser::TokenId;

/// Dense field identifier, assigned at configuration time.
pub type FieldId = u64;

/// An ordered sequence of entry IDs. Ascending and unique after compile.
pub type Entries = Vec<EntryId>;

/// Retrieval output: unique document IDs.
pub type DocIdList = Vec<DocId>;

/// Field name of the synthetic wildcard (K=0) bucket.
pub const WILDCARD_FIELD: &str = "_Z_";

/// Identifies one conjunction of one document:
/// `(doc << 16) | (index << 8) | size`.
///
/// `size` is the conjunction's K: the number of inclusive expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConjId(u64);

impl ConjId {
    /// Pack a conjunction ID.
    pub fn new(doc: DocId, index: u8, size: u8) -> Self {
        ConjId((doc as u64) << 16 | (index as u64) << 8 | size as u64)
    }

    /// The owning document.
    pub fn doc_id(self) -> DocId {
        (self.0 >> 16) as DocId
    }

    /// Position of the conjunction within its document.
    pub fn index(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The conjunction's K.
    pub fn size(self) -> u8 {
        self.0 as u8
    }

    /// The packed integer form.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Rebuild from the packed integer form.
    pub fn from_raw(raw: u64) -> Self {
        ConjId(raw)
    }
}

impl fmt::Display for ConjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.doc_id(), self.index(), self.size())
    }
}

/// One posting entry: `(conj << 1) | include`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    /// Sentinel for an exhausted cursor. No valid entry reaches it: entry
    /// IDs occupy 49 bits.
    pub const NULL: EntryId = EntryId(u64::MAX);

    /// Pack an entry ID.
    pub fn new(conj: ConjId, include: bool) -> Self {
        EntryId(conj.raw() << 1 | include as u64)
    }

    /// The smallest entry ID strictly past every entry of `conj`.
    pub fn after_conj(conj: ConjId) -> Self {
        EntryId(Self::new(conj, true).0 + 1)
    }

    /// The owning conjunction.
    pub fn conj_id(self) -> ConjId {
        ConjId::from_raw(self.0 >> 1)
    }

    /// Whether this entry is inclusive.
    pub fn is_include(self) -> bool {
        self.0 & 1 == 1
    }

    /// Whether this is the exhausted sentinel.
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// The owning document.
    pub fn doc_id(self) -> DocId {
        self.conj_id().doc_id()
    }

    /// The owning conjunction's K.
    pub fn size(self) -> u8 {
        self.conj_id().size()
    }

    /// The packed integer form.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Rebuild from the packed integer form.
    pub fn from_raw(raw: u64) -> Self {
        EntryId(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "<null>");
        }
        write!(f, "<{},{}>", self.conj_id(), self.is_include())
    }
}

/// Posting-list key: one token of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub field: FieldId,
    pub token: TokenId,
}

impl Key {
    pub fn new(field: FieldId, token: TokenId) -> Self {
        Key { field, token }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.field, self.token)
    }
}

/// Query-side cursor tag: which field/value produced a cursor. Borrowed
/// from the index and the assignment, so cursors stay allocation-free.
#[derive(Debug, Clone, Copy)]
pub struct QKey<'a> {
    pub field: &'a str,
    pub value: Option<&'a FieldValue>,
}

impl<'a> QKey<'a> {
    /// Sentinel tag for the wildcard bucket's synthetic cursor.
    pub const WILDCARD: QKey<'static> = QKey {
        field: WILDCARD_FIELD,
        value: None,
    };

    pub fn new(field: &'a str, value: Option<&'a FieldValue>) -> Self {
        QKey { field, value }
    }
}

impl fmt::Display for QKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{}#{}", self.field, value),
            None => write!(f, "{}#*", self.field),
        }
    }
}
