//! Image source contract.
//!
//! A fetch is issued synchronously while binding a cell; results come back
//! later, possibly from another thread, through an [`ImageSink`]. The strip
//! drains them on its own timeline and drops the ones whose cell has moved
//! on to another item.

use std::sync::mpsc::Sender;

use thumbstrip_core::Size;
use thumbstrip_foundation::lazy::CellId;

use crate::asset::AssetHandle;

/// How an image is fitted into the requested size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentMode {
    /// Fill the target size, cropping overflow.
    #[default]
    AspectFill,
    /// Fit entirely inside the target size.
    AspectFit,
}

/// Which results the requester wants to see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QualityPreference {
    /// Interim result first, then the final one.
    #[default]
    Opportunistic,
    /// Only the fast, possibly degraded result. Used while scrolling.
    FastOnly,
}

/// Fidelity of a delivered image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageQuality {
    /// Lower-fidelity placeholder, may be followed by a final result.
    Interim,
    /// Best result the source will produce for this request.
    Final,
}

/// Identifier of a single fetch, unique per strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Parameters of a fetch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageRequest {
    pub id: RequestId,
    /// Size in device pixels.
    pub target_size: Size,
    pub content_mode: ContentMode,
    pub quality: QualityPreference,
}

/// Asynchronous image provider, injected into the strip.
pub trait ImageSource {
    type Asset: AssetHandle;
    type Image;

    /// Starts loading `asset`. The source calls the sink zero or more times
    /// (at most one interim, at most one final result). A failed load simply
    /// never calls it.
    fn fetch(&self, asset: &Self::Asset, request: ImageRequest, sink: ImageSink<Self::Image>);
}

/// A result travelling back to the strip.
#[derive(Debug)]
pub struct ImageDelivery<I> {
    pub cell: CellId,
    pub asset_key: u64,
    pub request: RequestId,
    pub quality: ImageQuality,
    pub image: I,
}

/// Completion handle for one fetch.
///
/// Enforces the delivery contract: at most one interim and one final
/// result, no interim after the final one, and no final result for a
/// [`QualityPreference::FastOnly`] request.
#[derive(Debug)]
pub struct ImageSink<I> {
    cell: CellId,
    asset_key: u64,
    request: RequestId,
    preference: QualityPreference,
    sent_interim: bool,
    sent_final: bool,
    sender: Sender<ImageDelivery<I>>,
}

impl<I> ImageSink<I> {
    pub(crate) fn new(
        cell: CellId,
        asset_key: u64,
        request: &ImageRequest,
        sender: Sender<ImageDelivery<I>>,
    ) -> Self {
        Self {
            cell,
            asset_key,
            request: request.id,
            preference: request.quality,
            sent_interim: false,
            sent_final: false,
            sender,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request
    }

    pub fn asset_key(&self) -> u64 {
        self.asset_key
    }

    /// Whether the sink will accept no further results.
    pub fn is_complete(&self) -> bool {
        self.sent_final || (self.preference == QualityPreference::FastOnly && self.sent_interim)
    }

    /// Delivers an interim result. Returns whether it was passed on.
    pub fn deliver_interim(&mut self, image: I) -> bool {
        if self.sent_interim || self.sent_final {
            return false;
        }
        self.sent_interim = true;
        self.send(ImageQuality::Interim, image)
    }

    /// Delivers the final result. Returns whether it was passed on.
    pub fn deliver_final(&mut self, image: I) -> bool {
        if self.sent_final || self.preference == QualityPreference::FastOnly {
            return false;
        }
        self.sent_final = true;
        self.send(ImageQuality::Final, image)
    }

    /// Delivers a result of the given quality.
    pub fn deliver(&mut self, image: I, quality: ImageQuality) -> bool {
        match quality {
            ImageQuality::Interim => self.deliver_interim(image),
            ImageQuality::Final => self.deliver_final(image),
        }
    }

    fn send(&self, quality: ImageQuality, image: I) -> bool {
        let delivery = ImageDelivery {
            cell: self.cell,
            asset_key: self.asset_key,
            request: self.request,
            quality,
            image,
        };
        // The strip was dropped; nobody is waiting for the image anymore.
        self.sender.send(delivery).is_ok()
    }
}
