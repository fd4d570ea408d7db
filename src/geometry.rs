// Geometry module
// Screen-space placement of the overlay and its projection onto layer-shell units

/// Position and size of the overlay in screen coordinates.
///
/// Values are kept exactly as parsed. No range validation happens here:
/// negative positions and degenerate sizes are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Layer-shell margins as `(top, right, bottom, left)` for a `TOP | LEFT` anchor
    pub fn margins(&self) -> (i32, i32, i32, i32) {
        (to_pixels(self.top), 0, 0, to_pixels(self.left))
    }

    /// Surface size in whole pixels.
    ///
    /// A zero size asks the compositor to pick one, which is a protocol error
    /// unless opposite edges are anchored, so each axis is at least one pixel.
    pub fn surface_size(&self) -> (u32, u32) {
        (to_extent(self.width), to_extent(self.height))
    }
}

fn to_pixels(value: f64) -> i32 {
    // `as` saturates and maps NaN to zero
    value.round() as i32
}

fn to_extent(value: f64) -> u32 {
    (value.round() as u32).max(1)
}
