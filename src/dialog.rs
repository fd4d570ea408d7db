// Dialog module
// Blocking, user-facing error reporting

use log::warn;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

/// Title of every error dialog
pub const ERROR_TITLE: &str = "Error";

/// Shows a message and blocks until the user acknowledges it
pub trait ErrorDialog {
    fn show_error(&self, message: &str);
}

/// Native message box (xdg portal / zenity on Linux)
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageBox;

impl ErrorDialog for MessageBox {
    fn show_error(&self, message: &str) {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(ERROR_TITLE)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();

        // Only OK is offered, so anything else means the dialog never appeared
        if !matches!(result, MessageDialogResult::Ok) {
            warn!("Error dialog could not be acknowledged: {}", message);
        }
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::cell::RefCell;

    /// Records messages instead of showing them
    #[derive(Debug, Default)]
    pub struct RecordingDialog {
        pub messages: RefCell<Vec<String>>,
    }

    impl RecordingDialog {
        pub fn shown(&self) -> Vec<String> {
            self.messages.borrow().clone()
        }
    }

    impl ErrorDialog for RecordingDialog {
        fn show_error(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }
}
