// Overlay controller module
// Startup sequence, fatal error reporting and the keep-on-top tick

use crate::cli::{self, OverlayArgs};
use crate::dialog::ErrorDialog;
use crate::error::OverlayError;
use crate::geometry::Geometry;
use crate::image_loader;
use crate::platform::{ExtendedStyle, WindowPlatform};
use log::{debug, error, info};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

/// Period of the keep-on-top timer
pub const KEEP_ON_TOP_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle of the whole program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    ParsingArgs,
    Configuring,
    Loading,
    Running,
    Failed,
    Terminated,
}

/// Drives a `WindowPlatform` through startup and reports fatal errors
pub struct OverlayController<D: ErrorDialog> {
    dialog: D,
    phase: Phase,
}

impl<D: ErrorDialog> OverlayController<D> {
    pub fn new(dialog: D) -> Self {
        Self {
            dialog,
            phase: Phase::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub fn dialog(&self) -> &D {
        &self.dialog
    }

    /// Parse the positional arguments. No window exists yet, so a failure
    /// only shows the dialog.
    pub fn parse_args<I, T>(&mut self, argv: I) -> Result<OverlayArgs, OverlayError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.transition(Phase::ParsingArgs);
        cli::parse_args(argv).map_err(|e| self.abort(e))
    }

    /// Run the window through configuration, styling and image load
    pub fn launch<P: WindowPlatform>(
        &mut self,
        window: &mut P,
        args: &OverlayArgs,
    ) -> Result<(), OverlayError> {
        self.configure(window, &args.geometry);
        self.on_window_created(window);
        self.load(window, &args.image_path)
    }

    fn configure<P: WindowPlatform>(&mut self, window: &mut P, geometry: &Geometry) {
        self.transition(Phase::Configuring);
        window.apply_geometry(geometry);
        window.apply_overlay_style();
    }

    /// The native handle exists but nothing has been painted yet
    fn on_window_created<P: WindowPlatform>(&mut self, window: &mut P) {
        window.set_extended_style(ExtendedStyle::InputTransparent, true);
        window.show();
    }

    fn load<P: WindowPlatform>(&mut self, window: &mut P, path: &Path) -> Result<(), OverlayError> {
        self.transition(Phase::Loading);
        match image_loader::load_image(path) {
            Ok(image) => {
                info!(
                    "Image loaded: {}x{} pixels from {}",
                    image.width,
                    image.height,
                    path.display()
                );
                window.set_content(image);
                self.transition(Phase::Running);
                Ok(())
            }
            Err(e) => Err(self.fail(window, e)),
        }
    }

    /// Report a fatal error that happened before any window existed
    pub fn abort(&mut self, err: OverlayError) -> OverlayError {
        self.report(&err);
        self.transition(Phase::Terminated);
        err
    }

    /// Report a fatal error, then close the window
    pub fn fail<P: WindowPlatform>(&mut self, window: &mut P, err: OverlayError) -> OverlayError {
        self.report(&err);
        window.close();
        self.transition(Phase::Terminated);
        err
    }

    /// Close a running window
    pub fn shutdown<P: WindowPlatform>(&mut self, window: &mut P) {
        window.close();
        self.transition(Phase::Terminated);
    }

    fn report(&mut self, err: &OverlayError) {
        self.transition(Phase::Failed);
        error!("{}", err);
        self.dialog.show_error(&err.to_string());
    }

    fn transition(&mut self, next: Phase) {
        debug!("Overlay phase: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// Re-assert topmost stacking.
///
/// Some window managers only re-evaluate z-order on a change, so the flag is
/// cleared before being set again.
pub fn keep_on_top<P: WindowPlatform>(window: &mut P) {
    window.set_extended_style(ExtendedStyle::TopMost, false);
    window.set_extended_style(ExtendedStyle::TopMost, true);
}
