//! Change notifications from the host's item source.

/// Description of how the host's asset list changed.
///
/// The strip does not animate incremental updates; any notification ends in
/// a full [`set_items`](crate::ThumbnailStrip::set_items). The details are
/// kept so hosts and logs can tell what happened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemChangeDetails {
    pub has_incremental_changes: bool,
    pub has_moves: bool,
    pub removed_indices: Vec<usize>,
    pub inserted_indices: Vec<usize>,
    pub changed_indices: Vec<usize>,
}

impl ItemChangeDetails {
    /// The whole list was replaced.
    pub fn reload() -> Self {
        Self::default()
    }

    /// Whether positions of existing items may have shifted.
    pub fn is_structural(&self) -> bool {
        !self.has_incremental_changes
            || self.has_moves
            || !self.removed_indices.is_empty()
            || !self.inserted_indices.is_empty()
    }
}
