//! Per-K routing of fields to their posting-list holders.

use std::fmt::Write;

use ahash::AHashMap;

use crate::error::Result;

use super::FieldDesc;
use super::holder::{EntriesHolder, new_entries_holder};

/// All per-field holders participating in one conjunction-size bucket.
///
/// A routing layer only: posting lists live inside the holders. One
/// container exists per K present in the index.
#[derive(Debug)]
pub struct EntriesContainer {
    k: usize,
    holders: AHashMap<String, Box<dyn EntriesHolder>>,
}

impl EntriesContainer {
    pub(crate) fn new(k: usize) -> Self {
        EntriesContainer {
            k,
            holders: AHashMap::new(),
        }
    }

    /// The conjunction size this container serves.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The holder for `desc`'s field, created from the field's configured
    /// container name on first use.
    pub fn holder_mut(&mut self, desc: &FieldDesc) -> Result<&mut dyn EntriesHolder> {
        use std::collections::hash_map::Entry;
        match self.holders.entry(desc.name.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_mut()),
            Entry::Vacant(entry) => {
                Ok(entry.insert(new_entries_holder(&desc.option.container)?).as_mut())
            }
        }
    }

    /// Read-side holder lookup for queries.
    pub fn holder(&self, field: &str) -> Option<&dyn EntriesHolder> {
        self.holders.get(field).map(|holder| holder.as_ref())
    }

    pub(crate) fn compile(&mut self) -> Result<()> {
        for holder in self.holders.values_mut() {
            holder.compile()?;
        }
        Ok(())
    }

    pub(crate) fn dump(&self, buf: &mut String) {
        let mut fields: Vec<&String> = self.holders.keys().collect();
        fields.sort_unstable();
        for field in fields {
            if let Some(holder) = self.holder(field) {
                let _ = writeln!(buf, "k:{} field:{}", self.k, field);
                holder.dump(buf);
            }
        }
    }

    pub(crate) fn dump_summary(&self, buf: &mut String) {
        let mut fields: Vec<&String> = self.holders.keys().collect();
        fields.sort_unstable();
        for field in fields {
            if let Some(holder) = self.holder(field) {
                let stats = holder.posting_stats();
                let _ = writeln!(
                    buf,
                    "k:{} field:{} keys:{} max:{} avg:{}",
                    self.k, field, stats.keys, stats.max_len, stats.avg_len
                );
            }
        }
    }
}
