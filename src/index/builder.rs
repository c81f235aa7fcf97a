//! Index construction: documents in, compiled K-Groups index out.
//!
//! The builder expands each conjunction into per-field holder transactions,
//! optionally round-tripping them through a [`CacheProvider`], and commits
//! them only when the whole conjunction prepared cleanly. Build is
//! single-owner; the index it produces is immutable and freely shared.

use std::sync::Arc;

use log::{error, info};

use crate::document::{Conjunction, DocId, Document};
use crate::error::{PilumError, Result};
use crate::parser::{IdAllocator, PARSER_NAME_DEFAULT, StringIdAllocator, new_parser};

use super::cache::{CacheProvider, ConjTxRecord, FieldTxRecord};
use super::entry::{ConjId, EntryId, FieldId};
use super::holder::{HOLDER_NAME_DEFAULT, TxData};
use super::kgroups::KGroupsIndex;
use super::{BEIndex, FieldDesc, FieldDescMap, FieldOption};

/// What to do when a single conjunction fails to index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadConjBehavior {
    /// Abort the enclosing document build.
    #[default]
    Error,
    /// Log, drop the conjunction, keep going.
    Skip,
    /// Crash the process.
    Panic,
}

/// One expression's prepared-but-uncommitted indexing work.
struct IndexingTx {
    field: Arc<FieldDesc>,
    eid: EntryId,
    data: Box<dyn TxData>,
}

/// Builds a [`KGroupsIndex`] from documents.
pub struct IndexerBuilder {
    bad_conj_behavior: BadConjBehavior,
    cache: Option<Arc<dyn CacheProvider>>,
    fields: FieldDescMap,
    allocator: Arc<dyn IdAllocator>,
    index: KGroupsIndex,
}

impl IndexerBuilder {
    /// Create a builder with default behavior and no cache.
    pub fn new() -> Self {
        IndexerBuilder {
            bad_conj_behavior: BadConjBehavior::default(),
            cache: None,
            fields: FieldDescMap::new(),
            allocator: Arc::new(StringIdAllocator::new()),
            index: KGroupsIndex::default(),
        }
    }

    /// Set the per-conjunction failure policy.
    pub fn with_bad_conj_behavior(mut self, behavior: BadConjBehavior) -> Self {
        self.bad_conj_behavior = behavior;
        self
    }

    /// Attach a build cache.
    pub fn with_cache_provider(mut self, provider: Arc<dyn CacheProvider>) -> Self {
        self.cache = Some(provider);
        self
    }

    /// Configure a field's parser and container. Reconfiguring a field is an
    /// error; empty option names fall back to the defaults.
    pub fn configure_field(&mut self, field: &str, option: FieldOption) -> Result<FieldId> {
        if self.fields.contains_key(field) {
            return Err(PilumError::config(format!(
                "field {field} already configured"
            )));
        }
        let mut option = option;
        if option.parser.is_empty() {
            option.parser = PARSER_NAME_DEFAULT.to_string();
        }
        if option.container.is_empty() {
            option.container = HOLDER_NAME_DEFAULT.to_string();
        }
        let desc = self.insert_field(field, option)?;
        Ok(desc.id)
    }

    /// Validate and index one document.
    pub fn add_document(&mut self, doc: &Document) -> Result<()> {
        if doc.conjunctions.is_empty() {
            return Err(PilumError::validation(format!(
                "document {} has no conjunctions",
                doc.id
            )));
        }
        if doc.conjunctions.len() > 0xFF {
            return Err(PilumError::validation(format!(
                "document {} has {} conjunctions, the limit is 255",
                doc.id,
                doc.conjunctions.len()
            )));
        }
        for (index, conj) in doc.conjunctions.iter().enumerate() {
            self.build_conjunction(doc.id, index as u8, conj)?;
        }
        Ok(())
    }

    /// Hand over the accumulated index: compile every holder and return the
    /// immutable result. The builder keeps its field configuration and can
    /// index a fresh document set afterwards.
    pub fn build_index(&mut self) -> Result<Box<dyn BEIndex>> {
        let mut index = std::mem::take(&mut self.index);
        index.set_field_descs(self.fields.clone());
        index.compile()?;
        Ok(Box::new(index))
    }

    /// Drop accumulated index data and expire the cache provider. Field
    /// configuration survives.
    pub fn reset(&mut self) {
        self.index = KGroupsIndex::default();
        if let Some(cache) = &self.cache {
            cache.reset();
        }
    }

    fn insert_field(&mut self, field: &str, option: FieldOption) -> Result<Arc<FieldDesc>> {
        let parser = new_parser(&option.parser, &self.allocator)?;
        let id = self.fields.len() as FieldId;
        let desc = Arc::new(FieldDesc {
            id,
            name: field.to_string(),
            option,
            parser,
        });
        self.fields.insert(field.to_string(), desc.clone());
        info!("configured field:{field} id:{id}");
        Ok(desc)
    }

    fn field_desc_or_default(&mut self, field: &str) -> Result<Arc<FieldDesc>> {
        if let Some(desc) = self.fields.get(field) {
            return Ok(desc.clone());
        }
        self.insert_field(field, FieldOption::default())
    }

    fn build_conjunction(&mut self, doc: DocId, index: u8, conj: &Conjunction) -> Result<()> {
        let k = conj.size();
        if k > 0xFF {
            return Err(PilumError::validation(format!(
                "document {doc} conjunction {index} has {k} inclusive expressions, the limit is 255"
            )));
        }
        let conj_id = ConjId::new(doc, index, k as u8);
        if k == 0 {
            self.index.add_wildcard_eid(EntryId::new(conj_id, true));
        }
        // The K bucket must exist even for expression-less conjunctions.
        self.index.container_mut(k);

        let txs = match self.cached_txs(conj_id) {
            Some(txs) => txs,
            None => match self.prepare_conjunction(conj, conj_id) {
                Ok((txs, cacheable)) => {
                    if cacheable {
                        self.cache_txs(conj_id, &txs);
                    }
                    txs
                }
                Err(err) => {
                    return match self.bad_conj_behavior {
                        BadConjBehavior::Skip => {
                            error!("skip conjunction {conj_id}: {err}");
                            Ok(())
                        }
                        BadConjBehavior::Error => Err(err),
                        BadConjBehavior::Panic => {
                            panic!("indexing conjunction {conj_id} failed: {err}")
                        }
                    };
                }
            },
        };
        self.commit_txs(conj_id, txs)
    }

    /// Parse every expression of `conj` into transactions. Nothing is
    /// committed here, so a failing expression leaves no partial state.
    fn prepare_conjunction(
        &mut self,
        conj: &Conjunction,
        conj_id: ConjId,
    ) -> Result<(Vec<IndexingTx>, bool)> {
        let k = conj_id.size() as usize;
        let mut txs = Vec::with_capacity(conj.expressions.len());
        let mut cacheable = false;
        for (field, exprs) in &conj.expressions {
            let desc = self.field_desc_or_default(field)?;
            for expr in exprs {
                let data = self
                    .index
                    .container_mut(k)
                    .holder_mut(&desc)?
                    .prepare_tx(&desc, expr)?;
                cacheable |= data.better_to_cache();
                txs.push(IndexingTx {
                    field: desc.clone(),
                    eid: EntryId::new(conj_id, expr.incl),
                    data,
                });
            }
        }
        Ok((txs, cacheable))
    }

    fn commit_txs(&mut self, conj_id: ConjId, txs: Vec<IndexingTx>) -> Result<()> {
        let k = conj_id.size() as usize;
        for tx in txs {
            self.index
                .container_mut(k)
                .holder_mut(&tx.field)?
                .commit_tx(&tx.field, tx.eid, tx.data.as_ref())?;
        }
        Ok(())
    }

    fn cached_txs(&mut self, conj_id: ConjId) -> Option<Vec<IndexingTx>> {
        let provider = self.cache.clone()?;
        let bytes = provider.get(conj_id)?;
        match self.decode_cached(&bytes, conj_id) {
            Ok(txs) => Some(txs),
            Err(err) => {
                error!("conjunction {conj_id}: cache replay failed: {err}");
                None
            }
        }
    }

    fn decode_cached(&mut self, bytes: &[u8], conj_id: ConjId) -> Result<Vec<IndexingTx>> {
        let record = ConjTxRecord::decode(bytes)?;
        let k = conj_id.size() as usize;
        let mut txs = Vec::with_capacity(record.fields.len());
        for field_record in record.fields {
            let desc = self.field_desc_or_default(&field_record.field)?;
            let data = self
                .index
                .container_mut(k)
                .holder_mut(&desc)?
                .decode_tx(&field_record.data)?;
            txs.push(IndexingTx {
                field: desc,
                eid: EntryId::from_raw(field_record.eid),
                data,
            });
        }
        Ok(txs)
    }

    fn cache_txs(&self, conj_id: ConjId, txs: &[IndexingTx]) {
        let Some(provider) = &self.cache else {
            return;
        };
        let mut record = ConjTxRecord {
            conj: conj_id.raw(),
            fields: Vec::with_capacity(txs.len()),
        };
        for tx in txs {
            match tx.data.encode() {
                Ok(data) => record.fields.push(FieldTxRecord {
                    field: tx.field.name.clone(),
                    eid: tx.eid.raw(),
                    data,
                }),
                Err(err) => {
                    error!("field {}: tx encode failed: {err}", tx.field.name);
                    return;
                }
            }
        }
        match record.encode() {
            Ok(bytes) => provider.set(conj_id, bytes),
            Err(err) => error!("conjunction {conj_id}: cache encode failed: {err}"),
        }
    }
}

impl Default for IndexerBuilder {
    fn default() -> Self {
        IndexerBuilder::new()
    }
}
