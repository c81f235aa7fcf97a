//! Posting-list holders: per-field storage plugins for entry sequences.
//!
//! A holder owns the posting lists of one field inside one size-K container.
//! Holders are pluggable by name at field-configuration time; the core ships
//! the hash-map [`DefaultEntriesHolder`]. After [`EntriesHolder::compile`] a
//! holder is read-only and safe to query from any number of threads.

use std::any::Any;
use std::fmt::{Debug, Write};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::document::{BoolExpr, FieldValue};
use crate::error::{PilumError, Result};
use crate::parser::TokenId;

use super::FieldDesc;
use super::cursor::{CursorGroup, EntriesCursor};
use super::entry::{Entries, EntryId, Key, QKey};

/// Registry name of the default holder.
pub const HOLDER_NAME_DEFAULT: &str = "default";

/// Posting statistics computed at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostingStats {
    /// Number of posting lists.
    pub keys: usize,
    /// Length of the longest posting list.
    pub max_len: usize,
    /// Mean posting-list length.
    pub avg_len: usize,
}

/// One expression's worth of indexing work, parsed but not yet applied.
///
/// The data is opaque to everything but the holder that produced it; it must
/// survive an encode/decode round trip so the build cache can replay it.
pub trait TxData: Debug + Send + Sync {
    /// Whether replaying the serialized form is cheaper than re-parsing.
    fn better_to_cache(&self) -> bool {
        false
    }

    /// Serialize for the build cache.
    fn encode(&self) -> Result<Vec<u8>>;

    /// Downcast support for the owning holder.
    fn as_any(&self) -> &dyn Any;
}

/// Trait for per-field posting-list storage.
pub trait EntriesHolder: Debug + Send + Sync {
    /// Toggle verbose dump output.
    fn enable_debug(&mut self, debug: bool);

    /// Append a readable dump of every posting list to `buf`.
    fn dump(&self, buf: &mut String);

    /// Finalize for querying: sort and deduplicate every posting list and
    /// compute statistics. Mutation is illegal afterwards.
    fn compile(&mut self) -> Result<()>;

    /// Produce one cursor per non-empty posting list matching the query
    /// values of `field`. Only legal after [`EntriesHolder::compile`].
    fn get_entries<'a>(
        &'a self,
        field: &'a FieldDesc,
        assigns: &'a [FieldValue],
    ) -> Result<CursorGroup<'a>>;

    /// Tokenize `values` and append `eid` under every resulting key.
    fn add_field_entry(
        &mut self,
        field: &FieldDesc,
        values: &[FieldValue],
        eid: EntryId,
    ) -> Result<()>;

    /// Parse one expression into replayable transaction data without
    /// mutating the holder.
    fn prepare_tx(&self, field: &FieldDesc, expr: &BoolExpr) -> Result<Box<dyn TxData>>;

    /// Apply previously prepared transaction data.
    fn commit_tx(&mut self, field: &FieldDesc, eid: EntryId, data: &dyn TxData) -> Result<()>;

    /// Rebuild transaction data from its serialized form.
    fn decode_tx(&self, bytes: &[u8]) -> Result<Box<dyn TxData>>;

    /// Posting statistics; zero before compile.
    fn posting_stats(&self) -> PostingStats;
}

/// Construct the named holder variant. Unknown names are a config error.
pub fn new_entries_holder(name: &str) -> Result<Box<dyn EntriesHolder>> {
    match name {
        HOLDER_NAME_DEFAULT => Ok(Box::new(DefaultEntriesHolder::new())),
        other => Err(PilumError::config(format!("unknown container: {other}"))),
    }
}

/// Transaction data of the default holder: the parsed token list.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultTxData {
    tokens: Vec<TokenId>,
}

impl TxData for DefaultTxData {
    fn better_to_cache(&self) -> bool {
        // Decoding a token list is strictly cheaper than re-parsing values.
        !self.tokens.is_empty()
    }

    fn encode(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|err| PilumError::serialization(err.to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The default holder: `Key -> Entries` in a hash table.
#[derive(Debug, Default)]
pub struct DefaultEntriesHolder {
    debug: bool,
    stats: PostingStats,
    posting: AHashMap<Key, Entries>,
}

impl DefaultEntriesHolder {
    pub fn new() -> Self {
        DefaultEntriesHolder::default()
    }

    fn append(&mut self, key: Key, eid: EntryId) {
        self.posting.entry(key).or_default().push(eid);
    }

    fn parse_tokens(field: &FieldDesc, values: &[FieldValue]) -> Result<Vec<TokenId>> {
        let mut tokens = Vec::with_capacity(values.len());
        for value in values {
            // Tokens can repeat when an expression lists a value twice;
            // compile deduplicates the resulting entries.
            tokens.extend(
                field
                    .parser
                    .parse_value(value)
                    .map_err(|err| err.with_field(&field.name))?,
            );
        }
        Ok(tokens)
    }
}

impl EntriesHolder for DefaultEntriesHolder {
    fn enable_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn dump(&self, buf: &mut String) {
        let mut keys: Vec<&Key> = self.posting.keys().collect();
        keys.sort_unstable();
        for key in keys {
            let _ = write!(buf, "{key}:");
            if let Some(entries) = self.posting.get(key) {
                for (index, entry) in entries.iter().enumerate() {
                    if index > 0 {
                        buf.push(',');
                    }
                    let _ = write!(buf, "{entry}");
                }
            }
            buf.push('\n');
        }
    }

    fn compile(&mut self) -> Result<()> {
        let mut total = 0usize;
        for entries in self.posting.values_mut() {
            entries.sort_unstable();
            entries.dedup();
            self.stats.max_len = self.stats.max_len.max(entries.len());
            total += entries.len();
        }
        self.stats.keys = self.posting.len();
        if !self.posting.is_empty() {
            self.stats.avg_len = total / self.posting.len();
        }
        Ok(())
    }

    fn get_entries<'a>(
        &'a self,
        field: &'a FieldDesc,
        assigns: &'a [FieldValue],
    ) -> Result<CursorGroup<'a>> {
        let mut group = CursorGroup::new();
        for value in assigns {
            let tokens = field
                .parser
                .parse_assign(value)
                .map_err(|err| err.with_field(&field.name))?;
            for token in tokens {
                if let Some(entries) = self.posting.get(&Key::new(field.id, token)) {
                    if !entries.is_empty() {
                        group.push(EntriesCursor::new(
                            QKey::new(&field.name, Some(value)),
                            entries,
                        ));
                    }
                }
            }
        }
        Ok(group)
    }

    fn add_field_entry(
        &mut self,
        field: &FieldDesc,
        values: &[FieldValue],
        eid: EntryId,
    ) -> Result<()> {
        for token in Self::parse_tokens(field, values)? {
            self.append(Key::new(field.id, token), eid);
        }
        Ok(())
    }

    fn prepare_tx(&self, field: &FieldDesc, expr: &BoolExpr) -> Result<Box<dyn TxData>> {
        let tokens = Self::parse_tokens(field, &expr.values)?;
        Ok(Box::new(DefaultTxData { tokens }))
    }

    fn commit_tx(&mut self, field: &FieldDesc, eid: EntryId, data: &dyn TxData) -> Result<()> {
        let data = data
            .as_any()
            .downcast_ref::<DefaultTxData>()
            .ok_or_else(|| {
                PilumError::internal(format!(
                    "field {}: foreign tx data committed to default holder",
                    field.name
                ))
            })?;
        for &token in &data.tokens {
            self.append(Key::new(field.id, token), eid);
        }
        Ok(())
    }

    fn decode_tx(&self, bytes: &[u8]) -> Result<Box<dyn TxData>> {
        let (data, _) = bincode::serde::decode_from_slice::<DefaultTxData, _>(
            bytes,
            bincode::config::standard(),
        )
        .map_err(|err| PilumError::serialization(err.to_string()))?;
        Ok(Box::new(data))
    }

    fn posting_stats(&self) -> PostingStats {
        self.stats
    }
}
