//! Item provider trait for the strip.
//!
//! Items are addressed by position. Keys only exist so that asynchronous
//! work can tell whether a cell still shows the item it was started for.

/// Read-only snapshot of the items shown by a strip.
///
/// Implementations should be immutable - a change in the data source
/// produces a new provider which replaces the old one wholesale.
pub trait StripItemProvider {
    /// The total number of items.
    fn item_count(&self) -> usize;

    /// Stable identity of the item at `index`.
    ///
    /// Defaults to the index itself, which is only correct for lists that
    /// are never reordered.
    fn get_key(&self, index: usize) -> u64 {
        index as u64
    }

    /// Index of the item with `key`, if it is still present.
    fn get_index(&self, key: u64) -> Option<usize> {
        (0..self.item_count()).find(|&i| self.get_key(i) == key)
    }
}

/// A provider that only knows how many items exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemCount(pub usize);

impl StripItemProvider for ItemCount {
    fn item_count(&self) -> usize {
        self.0
    }
}
