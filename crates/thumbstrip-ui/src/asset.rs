//! Item snapshots held by the strip.

use std::rc::Rc;

use thumbstrip_foundation::lazy::StripItemProvider;

/// Opaque handle to a visual asset owned by the host's item source.
pub trait AssetHandle {
    /// Stable identity of the asset, independent of its position.
    fn asset_key(&self) -> u64;
}

/// Read-only, cheaply cloneable snapshot of the host's ordered assets.
#[derive(Debug)]
pub struct AssetSnapshot<A> {
    assets: Rc<[A]>,
}

impl<A> AssetSnapshot<A> {
    pub fn new(assets: Vec<A>) -> Self {
        Self {
            assets: assets.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<&A> {
        self.assets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.assets.iter()
    }
}

impl<A> Clone for AssetSnapshot<A> {
    fn clone(&self) -> Self {
        Self {
            assets: Rc::clone(&self.assets),
        }
    }
}

impl<A> Default for AssetSnapshot<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> From<Vec<A>> for AssetSnapshot<A> {
    fn from(assets: Vec<A>) -> Self {
        Self::new(assets)
    }
}

impl<A: AssetHandle> AssetSnapshot<A> {
    pub fn key_at(&self, index: usize) -> Option<u64> {
        self.item_at(index).map(AssetHandle::asset_key)
    }

    pub fn index_of_key(&self, key: u64) -> Option<usize> {
        self.assets.iter().position(|asset| asset.asset_key() == key)
    }
}

impl<A: AssetHandle> StripItemProvider for AssetSnapshot<A> {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn get_key(&self, index: usize) -> u64 {
        self.key_at(index).unwrap_or(index as u64)
    }

    fn get_index(&self, key: u64) -> Option<usize> {
        self.index_of_key(key)
    }
}
