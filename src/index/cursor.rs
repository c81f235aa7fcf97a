//! Cursors over posting lists and their per-field grouping.
//!
//! A query borrows posting lists from the index; cursors are per-query
//! scratch and never copy entries. Cursor advance uses a galloping probe
//! bracketing a binary search so per-query cost tracks the matches, not the
//! index size.

use std::fmt;

use super::entry::{ConjId, EntryId, QKey};

/// A movable position in one posting list.
#[derive(Debug, Clone)]
pub struct EntriesCursor<'a> {
    key: QKey<'a>,
    cursor: usize,
    entries: &'a [EntryId],
}

impl<'a> EntriesCursor<'a> {
    /// Create a cursor positioned at the first entry.
    pub fn new(key: QKey<'a>, entries: &'a [EntryId]) -> Self {
        EntriesCursor {
            key,
            cursor: 0,
            entries,
        }
    }

    /// The query-side key this cursor was produced for.
    pub fn qkey(&self) -> QKey<'a> {
        self.key
    }

    /// The entry under the cursor, or [`EntryId::NULL`] when exhausted.
    pub fn current(&self) -> EntryId {
        self.entries
            .get(self.cursor)
            .copied()
            .unwrap_or(EntryId::NULL)
    }

    /// Whether the cursor ran off the end of its list.
    pub fn reach_end(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Advance to the first entry `>= target` and return it.
    ///
    /// Gallops forward in doubling steps to bracket the target, then binary
    /// searches the bracket.
    pub fn skip_to(&mut self, target: EntryId) -> EntryId {
        if self.current() >= target {
            return self.current();
        }

        // entries[lo] < target holds from here on.
        let mut lo = self.cursor;
        let mut step = 1;
        while lo + step < self.entries.len() && self.entries[lo + step] < target {
            lo += step;
            step <<= 1;
        }
        let hi = (lo + step + 1).min(self.entries.len());
        let offset = self.entries[lo + 1..hi].partition_point(|&entry| entry < target);
        self.cursor = lo + 1 + offset;
        self.current()
    }
}

impl fmt::Display for EntriesCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}/{}:{}",
            self.key,
            self.cursor,
            self.entries.len(),
            self.current()
        )
    }
}

/// All cursors one field's holder produced for one query assignment.
pub type CursorGroup<'a> = Vec<EntriesCursor<'a>>;

/// One field's cursor group with its group-current: the minimum entry among
/// live member cursors.
#[derive(Debug)]
pub struct FieldCursor<'a> {
    current: usize,
    group: CursorGroup<'a>,
}

impl<'a> FieldCursor<'a> {
    /// Wrap a non-empty cursor group.
    pub fn new(group: CursorGroup<'a>) -> Self {
        let mut cursor = FieldCursor { current: 0, group };
        cursor.locate_current(EntryId::from_raw(0));
        cursor
    }

    /// The group-current entry, or [`EntryId::NULL`] when every member is
    /// exhausted.
    pub fn current_entry(&self) -> EntryId {
        match self.group.get(self.current) {
            Some(cursor) => cursor.current(),
            None => EntryId::NULL,
        }
    }

    /// The conjunction under the group-current entry.
    pub fn current_conj(&self) -> ConjId {
        self.current_entry().conj_id()
    }

    /// Whether every member cursor is exhausted.
    pub fn reach_end(&self) -> bool {
        self.current_entry().is_null()
    }

    /// Advance every member cursor to the first entry `>= target`, then
    /// return the new group-current.
    pub fn skip_to(&mut self, target: EntryId) -> EntryId {
        self.locate_current(target)
    }

    fn locate_current(&mut self, target: EntryId) -> EntryId {
        let mut min = EntryId::NULL;
        let mut min_index = 0;
        for (index, cursor) in self.group.iter_mut().enumerate() {
            let mut entry = cursor.current();
            if entry < target {
                entry = cursor.skip_to(target);
            }
            if entry < min {
                min = entry;
                min_index = index;
            }
        }
        self.current = min_index;
        min
    }
}

impl fmt::Display for FieldCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cur:{}", self.current_entry())?;
        for cursor in &self.group {
            write!(f, " [{cursor}]")?;
        }
        Ok(())
    }
}

/// Per-query scratch: one [`FieldCursor`] per participating field.
pub type FieldCursors<'a> = Vec<FieldCursor<'a>>;
