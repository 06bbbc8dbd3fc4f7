//! Ordered, duplicate-free insertion into keyed lists.
//!
//! Documents that embed a sorted list of links (the HTML index, the README
//! bullet list) expose that list through [`EntryList`]. [`insert_sorted`]
//! then finds the insertion point, skips names already present, splices in
//! the new entry and moves the first/last boundary markers for formats
//! that carry them.

/// The two ends of a list that some formats mark explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The entry that opens the list.
    First,
    /// The entry that closes the list.
    Last,
}

/// A sequence of entries kept in ascending key order.
pub trait EntryList {
    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns true if the list has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key of the entry at `index`.
    fn key(&self, index: usize) -> &str;

    /// Builds an entry for `key` and splices it before `index`.
    ///
    /// `index == len()` appends.
    fn insert(&mut self, index: usize, key: &str);

    /// Sets (`on == true`) or clears a boundary marker on the entry at `index`.
    ///
    /// Formats without boundary markers keep the default no-op.
    fn set_boundary(&mut self, _index: usize, _boundary: Boundary, _on: bool) {}
}

/// Outcome of [`insert_sorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new entry was spliced in at this index.
    Inserted {
        /// Position of the new entry.
        index: usize,
    },
    /// An entry with the same key already exists; the list is untouched.
    Duplicate,
}

impl Insertion {
    /// Returns true if the list changed.
    pub fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// Locates `name` in an ascending list.
///
/// Returns `Ok(index)` for an entry whose key equals `name`, or
/// `Err(index)` for the first entry whose key sorts after it (`len()` when
/// there is none).
pub fn find_insertion_point<L: EntryList + ?Sized>(list: &L, name: &str) -> Result<usize, usize> {
    let len = list.len();
    let index = (0..len).find(|&i| list.key(i) >= name).unwrap_or(len);
    if index < len && list.key(index) == name {
        Ok(index)
    } else {
        Err(index)
    }
}

/// Inserts `name` into `list` keeping ascending order.
///
/// Existing names are left alone. Boundary markers move to the new entry
/// when it becomes the first or last one.
pub fn insert_sorted<L: EntryList + ?Sized>(list: &mut L, name: &str) -> Insertion {
    let index = match find_insertion_point(list, name) {
        Ok(_) => return Insertion::Duplicate,
        Err(index) => index,
    };

    let previous_len = list.len();
    list.insert(index, name);

    if index == 0 {
        if previous_len > 0 {
            list.set_boundary(1, Boundary::First, false);
        }
        list.set_boundary(0, Boundary::First, true);
    }
    if index == previous_len {
        if previous_len > 0 {
            list.set_boundary(index - 1, Boundary::Last, false);
        }
        list.set_boundary(index, Boundary::Last, true);
    }

    Insertion::Inserted { index }
}
