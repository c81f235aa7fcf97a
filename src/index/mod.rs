//! The boolean-expression index: construction, storage and retrieval.
//!
//! Build once with [`IndexerBuilder`], then query the immutable result
//! through the [`BEIndex`] trait from any number of threads.

use std::fmt::Debug;
use std::sync::Arc;

use ahash::AHashMap;

use crate::document::Assignment;
use crate::error::Result;
use crate::parser::FieldValueParser;

pub mod builder;
pub mod cache;
pub mod collector;
pub mod container;
pub mod cursor;
pub mod entry;
pub mod holder;
pub mod kgroups;

pub use builder::{BadConjBehavior, IndexerBuilder};
pub use cache::{CacheProvider, MemoryCacheProvider};
pub use collector::{DocIdCollector, ResultCollector, pick_collector, put_collector};
pub use container::EntriesContainer;
pub use cursor::{CursorGroup, EntriesCursor, FieldCursor, FieldCursors};
pub use entry::{ConjId, DocIdList, Entries, EntryId, FieldId, Key, QKey, WILDCARD_FIELD};
pub use holder::{
    DefaultEntriesHolder, EntriesHolder, HOLDER_NAME_DEFAULT, PostingStats, TxData,
    new_entries_holder,
};
pub use kgroups::KGroupsIndex;

/// Parser and container selection for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    /// Registry name of the value parser.
    pub parser: String,
    /// Registry name of the entries holder.
    pub container: String,
}

impl Default for FieldOption {
    fn default() -> Self {
        FieldOption {
            parser: crate::parser::PARSER_NAME_DEFAULT.to_string(),
            container: HOLDER_NAME_DEFAULT.to_string(),
        }
    }
}

/// A configured field: its dense ID, options and parser instance.
#[derive(Debug)]
pub struct FieldDesc {
    pub id: FieldId,
    pub name: String,
    pub option: FieldOption,
    pub parser: Box<dyn FieldValueParser>,
}

/// Field descriptors shared between the builder and the built index.
pub type FieldDescMap = AHashMap<String, Arc<FieldDesc>>;

/// Per-retrieve options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrieveOptions {
    pub(crate) step_detail: bool,
    pub(crate) dump_entries: bool,
}

impl RetrieveOptions {
    pub fn new() -> Self {
        RetrieveOptions::default()
    }

    /// Log per-step cursor state through the `log` facade at debug level.
    pub fn with_step_detail(mut self) -> Self {
        self.step_detail = true;
        self
    }

    /// Log the raw posting lists before retrieval starts.
    pub fn with_dump_entries(mut self) -> Self {
        self.dump_entries = true;
        self
    }
}

/// Query interface of a built index.
///
/// Implementations are immutable after construction; every method takes
/// `&self` and is safe to call concurrently.
pub trait BEIndex: Send + Sync + Debug {
    /// Retrieve into a caller-supplied collector.
    fn retrieve_with_collector(
        &self,
        assigns: &Assignment,
        collector: &mut dyn ResultCollector,
        opts: &RetrieveOptions,
    ) -> Result<()>;

    /// Debug dump of every posting list.
    fn dump_entries(&self) -> String;

    /// Debug dump of per-holder posting statistics.
    fn dump_entries_summary(&self) -> String;

    /// Retrieve the unique, ascending document IDs satisfied by `assigns`.
    fn retrieve(&self, assigns: &Assignment) -> Result<DocIdList> {
        self.retrieve_with_options(assigns, &RetrieveOptions::default())
    }

    /// [`BEIndex::retrieve`] with explicit options, backed by the pooled
    /// collector.
    fn retrieve_with_options(
        &self,
        assigns: &Assignment,
        opts: &RetrieveOptions,
    ) -> Result<DocIdList> {
        let mut collector = pick_collector();
        match self.retrieve_with_collector(assigns, &mut collector, opts) {
            Ok(()) => {
                let ids = collector.drain();
                put_collector(collector);
                Ok(ids)
            }
            Err(err) => {
                put_collector(collector);
                Err(err)
            }
        }
    }
}
