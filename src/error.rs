// Error module
// Fatal error taxonomy; the Display text of each variant is what the user sees

use std::path::PathBuf;
use thiserror::Error;

/// Usage line shown whenever the positional arguments are unusable
pub const USAGE: &str = "Usage: overlay.exe img_path left_pos top_pos width height";

/// Every failure is fatal: the dialog is shown and the process terminates
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Fewer than five positional arguments
    #[error("{}", USAGE)]
    Usage,

    /// A geometry argument is not a decimal number
    #[error("Invalid {name} value '{value}'.\n{}", USAGE)]
    ArgumentFormat { name: &'static str, value: String },

    /// The image path does not exist
    #[error("No such file exists at path {}", .0.display())]
    FileNotFound(PathBuf),

    /// The image exists but could not be read or decoded
    #[error("Error while loading image. {0}")]
    ImageDecode(String),

    /// The display server or one of its required globals is unavailable
    #[error("Error while creating overlay window. {0:#}")]
    Platform(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_usage_message() {
        assert_eq!(
            OverlayError::Usage.to_string(),
            "Usage: overlay.exe img_path left_pos top_pos width height"
        );
    }

    #[test]
    fn test_file_not_found_substitutes_literal_path() {
        let err = OverlayError::FileNotFound(PathBuf::from("/tmp/missing image.png"));
        assert_eq!(
            err.to_string(),
            "No such file exists at path /tmp/missing image.png"
        );
    }

    #[test]
    fn test_image_decode_prefix() {
        let err = OverlayError::ImageDecode("The image format could not be determined".into());
        assert!(err.to_string().starts_with("Error while loading image. "));
        assert!(err.to_string().ends_with("could not be determined"));
    }

    #[test]
    fn test_argument_format_names_argument_and_shows_usage() {
        let err = OverlayError::ArgumentFormat {
            name: "width",
            value: "abc".into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("Invalid width value 'abc'."));
        assert!(text.ends_with(USAGE));
    }

    #[test]
    fn test_platform_includes_context_chain() {
        let err: OverlayError = anyhow!("no compositor")
            .context("Failed to connect to Wayland display")
            .into();
        assert_eq!(
            err.to_string(),
            "Error while creating overlay window. Failed to connect to Wayland display: no compositor"
        );
    }
}
