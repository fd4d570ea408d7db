// Timer module
// Repeating keep-on-top task on the UI event loop

use crate::overlay::{self, KEEP_ON_TOP_INTERVAL};
use crate::platform::WindowPlatform;
use anyhow::{anyhow, Result};
use log::debug;
use smithay_client_toolkit::reexports::calloop::{
    timer::{TimeoutAction, Timer},
    LoopHandle, RegistrationToken,
};
use std::time::Duration;

/// Keep-on-top task owned by the running window.
///
/// Re-arms after every tick; a late tick is not followed by catch-up ticks.
/// Ticks do nothing once the window is closed. Dropping the handle removes
/// the source from the loop.
pub struct KeepOnTopTimer<'l, P: WindowPlatform> {
    handle: LoopHandle<'l, P>,
    token: Option<RegistrationToken>,
}

impl<'l, P: WindowPlatform + 'l> KeepOnTopTimer<'l, P> {
    pub fn start(handle: LoopHandle<'l, P>) -> Result<Self> {
        Self::with_interval(handle, KEEP_ON_TOP_INTERVAL)
    }

    pub fn with_interval(handle: LoopHandle<'l, P>, interval: Duration) -> Result<Self> {
        let token = handle
            .insert_source(
                Timer::from_duration(interval),
                move |_deadline, _, window: &mut P| {
                    if window.is_open() {
                        overlay::keep_on_top(window);
                    }
                    TimeoutAction::ToDuration(interval)
                },
            )
            .map_err(|e| anyhow!("Failed to start keep-on-top timer: {}", e.error))?;

        debug!("Keep-on-top timer started ({:?})", interval);
        Ok(Self {
            handle,
            token: Some(token),
        })
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            self.handle.remove(token);
            debug!("Keep-on-top timer stopped");
        }
    }
}

impl<P: WindowPlatform> Drop for KeepOnTopTimer<'_, P> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.handle.remove(token);
        }
    }
}
