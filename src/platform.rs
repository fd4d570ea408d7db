// Platform module
// The narrow surface the controller needs from a native windowing system

use crate::geometry::Geometry;
use crate::image_loader::ImageData;

/// Secondary window behaviors toggled after the window exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedStyle {
    /// Pointer input passes through to whatever is beneath the window
    InputTransparent,
    /// Stacked above every non-topmost window
    TopMost,
}

/// A single native overlay window.
///
/// Implementations own the window handle. Every call happens on the UI
/// thread, so nothing here needs to be `Send`.
pub trait WindowPlatform {
    /// Place and size the window. Values are used as given.
    fn apply_geometry(&mut self, geometry: &Geometry);

    /// Frameless, transparent background, hidden from the task switcher,
    /// not resizable and never focused. Also requests topmost stacking.
    fn apply_overlay_style(&mut self);

    /// Get-modify-set of one extended style bit on the live window
    fn set_extended_style(&mut self, style: ExtendedStyle, enabled: bool);

    /// Current value of an extended style bit
    fn extended_style(&self, style: ExtendedStyle) -> bool;

    /// Make the image the sole content of the window
    fn set_content(&mut self, image: ImageData);

    fn show(&mut self);

    /// Destroy the window; later calls are no-ops
    fn close(&mut self);

    /// False once `close` has run
    fn is_open(&self) -> bool;

    /// Bounds last applied through `apply_geometry`
    fn bounds(&self) -> Geometry;
}

#[cfg(test)]
pub mod fake {
    //! In-memory window used by controller tests

    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Geometry(Geometry),
        Style,
        Extended(ExtendedStyle, bool),
        Content(u32, u32),
        Show,
        Close,
    }

    #[derive(Debug)]
    pub struct FakeWindow {
        pub calls: Vec<Call>,
        pub styles: HashSet<ExtendedStyle>,
        pub bounds: Geometry,
        pub visible: bool,
        pub closed: bool,
        pub content: Option<ImageData>,
    }

    impl FakeWindow {
        pub fn new() -> Self {
            Self {
                calls: Vec::new(),
                styles: HashSet::new(),
                bounds: Geometry::new(0.0, 0.0, 0.0, 0.0),
                visible: false,
                closed: false,
                content: None,
            }
        }
    }

    impl WindowPlatform for FakeWindow {
        fn apply_geometry(&mut self, geometry: &Geometry) {
            self.bounds = *geometry;
            self.calls.push(Call::Geometry(*geometry));
        }

        fn apply_overlay_style(&mut self) {
            self.styles.insert(ExtendedStyle::TopMost);
            self.calls.push(Call::Style);
        }

        fn set_extended_style(&mut self, style: ExtendedStyle, enabled: bool) {
            if enabled {
                self.styles.insert(style);
            } else {
                self.styles.remove(&style);
            }
            self.calls.push(Call::Extended(style, enabled));
        }

        fn extended_style(&self, style: ExtendedStyle) -> bool {
            self.styles.contains(&style)
        }

        fn set_content(&mut self, image: ImageData) {
            self.calls.push(Call::Content(image.width, image.height));
            self.content = Some(image);
        }

        fn show(&mut self) {
            self.visible = true;
            self.calls.push(Call::Show);
        }

        fn close(&mut self) {
            self.visible = false;
            self.closed = true;
            self.calls.push(Call::Close);
        }

        fn is_open(&self) -> bool {
            !self.closed
        }

        fn bounds(&self) -> Geometry {
            self.bounds
        }
    }
}
