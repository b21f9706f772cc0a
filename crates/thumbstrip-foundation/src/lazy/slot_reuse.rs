//! Cell slot tracking for the strip.
//!
//! Only the cells around the viewport are bound to items. A cell that
//! scrolls out of range goes back to the pool and is later rebound to a
//! different item, which is why asynchronous work on a cell has to check the
//! binding before touching it.

use std::ops::Range;

use thumbstrip_core::collections::map::HashMap;

/// Default number of unbound cells kept for reuse.
pub const DEFAULT_REUSE_SLOT_COUNT: usize = 7;

/// Identifier of a reusable cell. Stable for the cell's lifetime, unrelated
/// to the item it currently shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u64);

/// Policy for reusing cells.
#[derive(Clone, Debug)]
pub struct SlotReusePolicy {
    /// Maximum number of unbound cells to keep around.
    pub max_reusable: usize,

    /// Whether cell reuse is enabled.
    pub enabled: bool,
}

impl Default for SlotReusePolicy {
    fn default() -> Self {
        Self {
            max_reusable: DEFAULT_REUSE_SLOT_COUNT,
            enabled: true,
        }
    }
}

impl SlotReusePolicy {
    /// Creates a policy keeping up to `max_reusable` cells.
    pub fn new(max_reusable: usize) -> Self {
        Self {
            max_reusable,
            enabled: true,
        }
    }

    /// Disables reuse: every released cell is dropped.
    pub fn disabled() -> Self {
        Self {
            max_reusable: 0,
            enabled: false,
        }
    }
}

/// Outcome of [`SlotReusePool::acquire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotAcquire {
    /// The index already had a cell.
    Existing(CellId),
    /// A pooled cell was rebound to the index.
    Reused(CellId),
    /// A brand new cell was created.
    Created(CellId),
}

impl SlotAcquire {
    pub fn cell(self) -> CellId {
        match self {
            SlotAcquire::Existing(id) | SlotAcquire::Reused(id) | SlotAcquire::Created(id) => id,
        }
    }

    /// Whether the cell was bound to this index just now.
    pub fn is_new_binding(self) -> bool {
        !matches!(self, SlotAcquire::Existing(_))
    }
}

/// Bookkeeping of which cell shows which index.
#[derive(Debug, Default)]
pub struct SlotReusePool {
    bound: HashMap<usize, CellId>,
    by_cell: HashMap<CellId, usize>,
    available: Vec<CellId>,
    next_id: u64,
    policy: SlotReusePolicy,
    /// Cells dropped because the pool was full since the last [`take_discarded`](Self::take_discarded).
    discarded: Vec<CellId>,
}

impl SlotReusePool {
    pub fn new() -> Self {
        Self::with_policy(SlotReusePolicy::default())
    }

    pub fn with_policy(policy: SlotReusePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Returns the cell for `index`, reusing a pooled one when possible.
    pub fn acquire(&mut self, index: usize) -> SlotAcquire {
        if let Some(&id) = self.bound.get(&index) {
            return SlotAcquire::Existing(id);
        }
        let acquired = match self.available.pop() {
            Some(id) if self.policy.enabled => SlotAcquire::Reused(id),
            _ => {
                let id = CellId(self.next_id);
                self.next_id += 1;
                SlotAcquire::Created(id)
            }
        };
        self.bound.insert(index, acquired.cell());
        self.by_cell.insert(acquired.cell(), index);
        acquired
    }

    /// Cell currently bound to `index`.
    pub fn cell_for_index(&self, index: usize) -> Option<CellId> {
        self.bound.get(&index).copied()
    }

    /// Index currently shown by `cell`.
    pub fn index_of_cell(&self, cell: CellId) -> Option<usize> {
        self.by_cell.get(&cell).copied()
    }

    /// Unbinds every cell whose index is outside `keep`.
    ///
    /// Returns the released cells; some of them may be discarded instead of
    /// pooled when the pool is full.
    pub fn release_outside(&mut self, keep: Range<usize>) -> Vec<CellId> {
        let mut to_release: Vec<usize> = self
            .bound
            .keys()
            .filter(|index| !keep.contains(index))
            .copied()
            .collect();
        to_release.sort_unstable();

        let mut released = Vec::with_capacity(to_release.len());
        for index in to_release {
            if let Some(id) = self.bound.remove(&index) {
                self.by_cell.remove(&id);
                self.recycle(id);
                released.push(id);
            }
        }
        released
    }

    /// Unbinds everything, e.g. after the item list was replaced.
    pub fn release_all(&mut self) -> Vec<CellId> {
        self.release_outside(0..0)
    }

    /// Cells dropped by the pool limit since the last call.
    pub fn take_discarded(&mut self) -> Vec<CellId> {
        std::mem::take(&mut self.discarded)
    }

    /// Number of cells bound to an index.
    pub fn in_use_count(&self) -> usize {
        self.bound.len()
    }

    /// Number of unbound cells waiting for reuse.
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    fn recycle(&mut self, id: CellId) {
        if self.policy.enabled && self.available.len() < self.policy.max_reusable {
            self.available.push(id);
        } else {
            self.discarded.push(id);
        }
    }
}
