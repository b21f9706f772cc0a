//! Reusable thumbnail cells.

use thumbstrip_core::{Frame, Size};
use thumbstrip_foundation::lazy::CellId;
use web_time::Instant;

use crate::image::{ImageDelivery, ImageQuality, QualityPreference, RequestId};

/// Item a cell currently displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellBinding {
    pub index: usize,
    pub asset_key: u64,
}

#[derive(Clone, Copy, Debug)]
struct ActiveRequest {
    id: RequestId,
    pixel_size: Size,
    quality: QualityPreference,
    issued_at: Instant,
    final_applied: bool,
}

/// One visible cell of the strip.
///
/// Cells are recycled across items, so the binding is the authority on what
/// the cell shows. Image results are only applied when they were fetched for
/// the current binding and the latest request.
#[derive(Debug)]
pub struct ThumbnailCell<I> {
    id: CellId,
    binding: Option<CellBinding>,
    frame: Frame,
    selected: bool,
    image: Option<I>,
    image_quality: Option<ImageQuality>,
    request: Option<ActiveRequest>,
}

impl<I> ThumbnailCell<I> {
    pub fn new(id: CellId) -> Self {
        Self {
            id,
            binding: None,
            frame: Frame::default(),
            selected: false,
            image: None,
            image_quality: None,
            request: None,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn binding(&self) -> Option<CellBinding> {
        self.binding
    }

    pub fn index(&self) -> Option<usize> {
        self.binding.map(|binding| binding.index)
    }

    pub fn asset_key(&self) -> Option<u64> {
        self.binding.map(|binding| binding.asset_key)
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    pub fn image_quality(&self) -> Option<ImageQuality> {
        self.image_quality
    }

    /// Id of the latest fetch issued for this cell.
    pub fn request_id(&self) -> Option<RequestId> {
        self.request.map(|request| request.id)
    }

    /// Quality asked for by the latest fetch.
    pub fn requested_quality(&self) -> Option<QualityPreference> {
        self.request.map(|request| request.quality)
    }

    /// Binds the cell to `binding` at `frame`.
    ///
    /// Returns `true` when the cell now shows a different asset; the previous
    /// image and request are dropped in that case.
    pub fn bind(&mut self, binding: CellBinding, frame: Frame) -> bool {
        let identity_changed = self.asset_key() != Some(binding.asset_key);
        if identity_changed {
            self.image = None;
            self.image_quality = None;
            self.request = None;
            self.selected = false;
        }
        self.binding = Some(binding);
        self.frame = frame;
        identity_changed
    }

    /// Detaches the cell from its item, e.g. when it scrolls out of range.
    pub fn unbind(&mut self) {
        self.binding = None;
        self.frame = Frame::default();
        self.selected = false;
        self.image = None;
        self.image_quality = None;
        self.request = None;
    }

    /// Returns whether the highlight changed.
    pub fn set_selected(&mut self, selected: bool) -> bool {
        if self.selected == selected {
            return false;
        }
        self.selected = selected;
        true
    }

    /// Whether a fetch at `pixel_size` is needed: nothing was requested yet
    /// or the cell was resized since.
    pub fn needs_fetch(&self, pixel_size: Size) -> bool {
        self.binding.is_some()
            && self
                .request
                .map_or(true, |request| request.pixel_size != pixel_size)
    }

    /// Whether the latest fetch can never produce a final image.
    pub fn needs_quality_upgrade(&self) -> bool {
        self.binding.is_some()
            && self.request.map_or(true, |request| {
                request.quality == QualityPreference::FastOnly && !request.final_applied
            })
    }

    /// Records a fetch issued for the current binding, superseding any
    /// earlier one.
    pub fn begin_request(&mut self, id: RequestId, pixel_size: Size, quality: QualityPreference) {
        self.request = Some(ActiveRequest {
            id,
            pixel_size,
            quality,
            issued_at: Instant::now(),
            final_applied: false,
        });
    }

    /// Applies a fetch result. Returns `false` for stale results: another
    /// asset, a superseded request, or an interim arriving after the final.
    pub fn apply_delivery(&mut self, delivery: ImageDelivery<I>) -> bool {
        if self.asset_key() != Some(delivery.asset_key) {
            log::debug!(
                "cell {:?}: dropping image for asset {} (now showing {:?})",
                self.id,
                delivery.asset_key,
                self.asset_key()
            );
            return false;
        }
        let Some(request) = self.request.as_mut() else {
            return false;
        };
        if request.id != delivery.request {
            log::debug!(
                "cell {:?}: dropping superseded request {:?}",
                self.id,
                delivery.request
            );
            return false;
        }
        if request.final_applied {
            return false;
        }
        if delivery.quality == ImageQuality::Final {
            request.final_applied = true;
        }
        log::trace!(
            "cell {:?}: {:?} image after {:?}",
            self.id,
            delivery.quality,
            request.issued_at.elapsed()
        );
        self.image = Some(delivery.image);
        self.image_quality = Some(delivery.quality);
        true
    }
}
