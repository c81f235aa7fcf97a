//! The K-Groups index and its cursor-advance retrieval engine.
//!
//! Posting lists are bucketed by conjunction size K. Within one bucket a
//! size-K conjunction contributes exactly K include entries across distinct
//! fields, so it is satisfied iff the K smallest per-field group currents
//! align on its conjunction ID with no exclude entry among them. Exclude
//! entries sort before include entries for the same conjunction, which means
//! an exclusion is always seen first and can veto before any include emits.

use std::fmt::Write as _;

use log::debug;

use crate::document::Assignment;
use crate::error::Result;

use super::collector::ResultCollector;
use super::container::EntriesContainer;
use super::cursor::{EntriesCursor, FieldCursor, FieldCursors};
use super::entry::{Entries, EntryId, QKey};
use super::{BEIndex, FieldDescMap, RetrieveOptions};

/// The K-Groups boolean-expression index. Immutable once built.
#[derive(Debug, Default)]
pub struct KGroupsIndex {
    fields: FieldDescMap,

    /// Entries of all conjunctions with K = 0; they bypass the inverted
    /// posting lists entirely.
    wildcard_entries: Entries,

    /// One container per conjunction size, indexed by K.
    containers: Vec<EntriesContainer>,
}

impl KGroupsIndex {
    pub(crate) fn add_wildcard_eid(&mut self, eid: EntryId) {
        self.wildcard_entries.push(eid);
    }

    pub(crate) fn set_field_descs(&mut self, fields: FieldDescMap) {
        self.fields = fields;
    }

    /// The container for size-K conjunctions, growing the bucket list on
    /// first sight of a new K.
    pub(crate) fn container_mut(&mut self, k: usize) -> &mut EntriesContainer {
        while self.containers.len() <= k {
            let next = self.containers.len();
            self.containers.push(EntriesContainer::new(next));
        }
        &mut self.containers[k]
    }

    pub(crate) fn compile(&mut self) -> Result<()> {
        self.wildcard_entries.sort_unstable();
        self.wildcard_entries.dedup();
        for container in &mut self.containers {
            container.compile()?;
        }
        Ok(())
    }

    /// One [`FieldCursor`] per query field with matching posting lists in
    /// `container`.
    fn init_field_cursors<'a>(
        &'a self,
        container: &'a EntriesContainer,
        assigns: &'a Assignment,
    ) -> Result<FieldCursors<'a>> {
        let mut cursors = FieldCursors::new();
        for (field, values) in assigns {
            let Some(desc) = self.fields.get(field) else {
                continue;
            };
            let Some(holder) = container.holder(field) else {
                continue;
            };
            let group = holder.get_entries(desc, values)?;
            if !group.is_empty() {
                cursors.push(FieldCursor::new(group));
            }
        }
        Ok(cursors)
    }
}

impl BEIndex for KGroupsIndex {
    fn retrieve_with_collector(
        &self,
        assigns: &Assignment,
        collector: &mut dyn ResultCollector,
        opts: &RetrieveOptions,
    ) -> Result<()> {
        if opts.dump_entries {
            debug!("retrieve over entries:\n{}", self.dump_entries());
        }
        for (k, container) in self.containers.iter().enumerate() {
            // The wildcard bucket joins the K=0 evaluation as a synthetic
            // group; its conjunctions still align (and can be vetoed by
            // their own exclude entries) under an effective K of one.
            let effective_k = k.max(1);
            let mut cursors = self.init_field_cursors(container, assigns)?;
            if k == 0 && !self.wildcard_entries.is_empty() {
                cursors.push(FieldCursor::new(vec![EntriesCursor::new(
                    QKey::WILDCARD,
                    &self.wildcard_entries,
                )]));
            }
            if cursors.len() < effective_k {
                continue;
            }
            retrieve_k(&mut cursors, effective_k, collector, opts.step_detail);
        }
        Ok(())
    }

    fn dump_entries(&self) -> String {
        let mut buf = String::new();
        let _ = writeln!(buf, "wildcard: {} entries", self.wildcard_entries.len());
        for entry in &self.wildcard_entries {
            let _ = writeln!(buf, "  {entry}");
        }
        for container in &self.containers {
            container.dump(&mut buf);
        }
        buf
    }

    fn dump_entries_summary(&self) -> String {
        let mut buf = String::new();
        let _ = writeln!(buf, "wildcard: {} entries", self.wildcard_entries.len());
        for container in &self.containers {
            container.dump_summary(&mut buf);
        }
        buf
    }
}

/// Emit every conjunction whose K include entries align across `cursors`
/// with no exclude veto.
///
/// `cursors` must hold at least `k` groups. Exhausted groups report
/// [`EntryId::NULL`] and sort last, so the loop ends when fewer than `k`
/// groups are live.
fn retrieve_k(
    cursors: &mut FieldCursors<'_>,
    k: usize,
    collector: &mut dyn ResultCollector,
    step_detail: bool,
) {
    debug_assert!(k >= 1 && cursors.len() >= k);

    cursors.sort_by_key(FieldCursor::current_entry);
    while !cursors[k - 1].reach_end() {
        if step_detail {
            log_step(cursors, k);
        }

        let first = cursors[0].current_entry();
        let frontier = cursors[k - 1].current_entry();

        let next_id;
        if first.conj_id() == frontier.conj_id() {
            // The k smallest groups agree on one conjunction. An exclude
            // entry on it would sort first, so checking the smallest entry
            // decides the veto.
            let conj = first.conj_id();
            next_id = EntryId::after_conj(conj);
            if first.is_include() {
                collector.add(conj.doc_id(), conj);
            }
            // Trailing groups parked on the same conjunction move past it
            // too, whether it was emitted or vetoed.
            for cursor in cursors.iter_mut().skip(k) {
                if cursor.current_conj() != conj {
                    break;
                }
                cursor.skip_to(next_id);
            }
        } else {
            // No agreement: leap to the frontier conjunction, landing on
            // its exclude slot so a veto there is not skipped.
            next_id = EntryId::new(frontier.conj_id(), false);
        }

        for cursor in cursors.iter_mut().take(k) {
            cursor.skip_to(next_id);
        }
        cursors.sort_by_key(FieldCursor::current_entry);
    }
}

fn log_step(cursors: &FieldCursors<'_>, k: usize) {
    let mut line = String::new();
    for (index, cursor) in cursors.iter().enumerate() {
        let _ = write!(line, "\n  {index}: {cursor}");
    }
    debug!("retrieve_k k:{k} groups:{}{line}", cursors.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocId;
    use crate::index::collector::DocIdCollector;
    use crate::index::entry::ConjId;

    fn include_entries(docs: &[DocId], k: u8) -> Entries {
        docs.iter()
            .map(|&doc| EntryId::new(ConjId::new(doc, 0, k), true))
            .collect()
    }

    fn exclude_entries(docs: &[DocId], k: u8) -> Entries {
        docs.iter()
            .map(|&doc| EntryId::new(ConjId::new(doc, 0, k), false))
            .collect()
    }

    fn field_cursor<'a>(lists: &'a [Entries]) -> FieldCursor<'a> {
        FieldCursor::new(
            lists
                .iter()
                .map(|entries| EntriesCursor::new(QKey::new("f", None), entries))
                .collect(),
        )
    }

    fn run(cursors: &mut FieldCursors<'_>, k: usize) -> Vec<DocId> {
        let mut collector = DocIdCollector::new();
        retrieve_k(cursors, k, &mut collector, false);
        collector.drain()
    }

    #[test]
    fn test_two_group_alignment() {
        // Mirrors the posting layout of the paper's running example: only
        // documents present in one list of each group can align.
        let first: Vec<Entries> = vec![
            include_entries(&[17, 32, 37], 2),
            include_entries(&[17, 33], 2),
            include_entries(&[19, 60], 2),
            include_entries(&[53, 54], 2),
        ];
        let second: Vec<Entries> = vec![
            include_entries(&[10, 19, 27, 32, 54, 81], 2),
            include_entries(&[3, 19, 35, 81], 2),
        ];
        let mut cursors = vec![field_cursor(&first), field_cursor(&second)];

        assert_eq!(run(&mut cursors, 2), vec![19, 32, 54]);
    }

    #[test]
    fn test_exclude_vetoes_alignment() {
        let include: Vec<Entries> = vec![include_entries(&[5, 7, 9], 1)];
        let exclude: Vec<Entries> = vec![exclude_entries(&[7], 1)];
        let mut cursors = vec![field_cursor(&include), field_cursor(&exclude)];

        assert_eq!(run(&mut cursors, 1), vec![5, 9]);
    }

    #[test]
    fn test_loop_ends_when_a_group_exhausts() {
        let short: Vec<Entries> = vec![include_entries(&[5], 2)];
        let long: Vec<Entries> = vec![include_entries(&[5, 8], 2)];
        let mut cursors = vec![field_cursor(&short), field_cursor(&long)];

        // After 5 aligns, the short group is spent and 8 can never reach
        // two agreeing groups.
        assert_eq!(run(&mut cursors, 2), vec![5]);
    }

    #[test]
    fn test_duplicate_groups_emit_once() {
        // The same conjunction reachable through two cursors of one group
        // and a second group: one hit, no duplicates.
        let doubled: Vec<Entries> = vec![
            include_entries(&[11], 2),
            include_entries(&[11, 12], 2),
        ];
        let other: Vec<Entries> = vec![include_entries(&[11], 2)];
        let mut cursors = vec![field_cursor(&doubled), field_cursor(&other)];

        assert_eq!(run(&mut cursors, 2), vec![11]);
    }

    #[test]
    fn test_same_conj_include_and_exclude_key() {
        // Degenerate conjunction carrying IN and NOT IN over the same
        // token: the exclude sorts first and the whole conjunction is
        // skipped, not re-visited at its include entry.
        let conj = ConjId::new(4, 0, 1);
        let both: Vec<Entries> = vec![vec![
            EntryId::new(conj, false),
            EntryId::new(conj, true),
        ]];
        let mut cursors = vec![field_cursor(&both)];

        assert_eq!(run(&mut cursors, 1), Vec::<DocId>::new());
    }
}
