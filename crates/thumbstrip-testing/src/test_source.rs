use std::cell::RefCell;
use std::rc::Rc;

use thumbstrip_core::Size;
use thumbstrip_ui::{
    AssetHandle, AssetSnapshot, ImageQuality, ImageRequest, ImageSink, ImageSource,
};

/// Asset used by test strips. Keys are offset from indices so tests can
/// tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestAsset {
    pub key: u64,
}

impl AssetHandle for TestAsset {
    fn asset_key(&self) -> u64 {
        self.key
    }
}

/// Key of the `index`-th asset produced by [`test_assets`].
pub fn test_asset_key(index: usize) -> u64 {
    1_000 + index as u64
}

/// Snapshot of `count` test assets.
pub fn test_assets(count: usize) -> AssetSnapshot<TestAsset> {
    (0..count)
        .map(|index| TestAsset {
            key: test_asset_key(index),
        })
        .collect::<Vec<_>>()
        .into()
}

/// Image produced by [`ManualImageSource`]; records what it was made for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestImage {
    pub asset_key: u64,
    pub quality: ImageQuality,
    pub size: Size,
}

/// A fetch waiting to be completed by the test.
pub struct PendingFetch {
    pub asset_key: u64,
    pub request: ImageRequest,
    sink: ImageSink<TestImage>,
}

impl PendingFetch {
    fn image(&self, quality: ImageQuality) -> TestImage {
        TestImage {
            asset_key: self.asset_key,
            quality,
            size: self.request.target_size,
        }
    }

    pub fn complete_interim(&mut self) -> bool {
        let image = self.image(ImageQuality::Interim);
        self.sink.deliver_interim(image)
    }

    pub fn complete_final(&mut self) -> bool {
        let image = self.image(ImageQuality::Final);
        self.sink.deliver_final(image)
    }

    /// Interim then final, as an opportunistic source would.
    pub fn complete(mut self) -> usize {
        usize::from(self.complete_interim()) + usize::from(self.complete_final())
    }
}

#[derive(Default)]
struct SourceState {
    pending: Vec<PendingFetch>,
    history: Vec<ImageRequest>,
}

/// Image source whose fetches complete only when the test says so.
///
/// Cloning shares the queue, so a test can keep a handle while the strip
/// owns the source.
#[derive(Clone, Default)]
pub struct ManualImageSource {
    state: Rc<RefCell<SourceState>>,
}

impl ManualImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Removes and returns every fetch not yet completed.
    pub fn take_pending(&self) -> Vec<PendingFetch> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }

    /// Every request issued so far, in order.
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.state.borrow().history.clone()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().history.clear();
    }

    /// Completes every pending fetch. Returns the number of results sent.
    pub fn complete_all(&self) -> usize {
        self.take_pending()
            .into_iter()
            .map(PendingFetch::complete)
            .sum()
    }
}

impl ImageSource for ManualImageSource {
    type Asset = TestAsset;
    type Image = TestImage;

    fn fetch(&self, asset: &TestAsset, request: ImageRequest, sink: ImageSink<TestImage>) {
        let mut state = self.state.borrow_mut();
        state.history.push(request);
        state.pending.push(PendingFetch {
            asset_key: asset.key,
            request,
            sink,
        });
    }
}
