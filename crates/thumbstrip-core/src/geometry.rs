//! Plain geometry values for a horizontal strip.

/// Width and height in logical units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Scales both dimensions, e.g. logical units to device pixels.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Placement of a single item in strip content coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    /// Index of the item in the backing list.
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(index: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            index,
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether any part of the frame overlaps `[start, end)` on the x axis.
    pub fn intersects_span(&self, start: f32, end: f32) -> bool {
        self.x < end && self.max_x() > start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_edges() {
        let frame = Frame::new(3, 10.0, 0.0, 20.0, 40.0);
        assert_eq!(frame.max_x(), 30.0);
        assert_eq!(frame.center_x(), 20.0);
        assert_eq!(frame.size(), Size::new(20.0, 40.0));
    }

    #[test]
    fn span_intersection_is_half_open() {
        let frame = Frame::new(0, 10.0, 0.0, 10.0, 10.0);
        assert!(frame.intersects_span(0.0, 10.5));
        assert!(!frame.intersects_span(0.0, 10.0));
        assert!(!frame.intersects_span(20.0, 30.0));
        assert!(frame.intersects_span(19.0, 30.0));
    }

    #[test]
    fn scaled_size() {
        assert_eq!(Size::new(2.0, 3.0).scaled(2.0), Size::new(4.0, 6.0));
        assert!(Size::ZERO.is_empty());
    }
}
