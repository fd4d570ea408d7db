// Command line interface module
// Handles parsing of the five positional arguments

use crate::error::OverlayError;
use crate::geometry::Geometry;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Positional values required after the program name
const REQUIRED_VALUES: usize = 5;

/// overlay - A click-through, always-on-top image overlay
#[derive(Parser, Debug)]
#[command(name = "overlay")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    /// Path to the image file
    #[arg(value_name = "img_path", allow_hyphen_values = true)]
    pub image_path: PathBuf,

    /// Left edge of the overlay in screen coordinates
    #[arg(value_name = "left_pos", allow_hyphen_values = true)]
    pub left: f64,

    /// Top edge of the overlay in screen coordinates
    #[arg(value_name = "top_pos", allow_hyphen_values = true)]
    pub top: f64,

    /// Width of the overlay
    #[arg(value_name = "width", allow_hyphen_values = true)]
    pub width: f64,

    /// Height of the overlay
    #[arg(value_name = "height", allow_hyphen_values = true)]
    pub height: f64,

    /// Anything after the fifth value is ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    #[allow(dead_code)]
    pub rest: Vec<OsString>,
}

/// Parsed arguments ready for the controller
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayArgs {
    pub image_path: PathBuf,
    pub geometry: Geometry,
}

impl From<Args> for OverlayArgs {
    fn from(args: Args) -> Self {
        Self {
            image_path: args.image_path,
            geometry: Geometry::new(args.left, args.top, args.width, args.height),
        }
    }
}

/// Parse the process arguments (program name first)
pub fn parse_args<I, T>(argv: I) -> Result<OverlayArgs, OverlayError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    // The count is checked before any value is parsed
    if argv.len() < REQUIRED_VALUES + 1 {
        return Err(OverlayError::Usage);
    }

    Args::try_parse_from(argv)
        .map(OverlayArgs::from)
        .map_err(classify)
}

/// Map a clap failure onto the usage/format split
fn classify(err: clap::Error) -> OverlayError {
    match err.kind() {
        ErrorKind::ValueValidation | ErrorKind::InvalidValue => {
            let name = match err.get(ContextKind::InvalidArg) {
                Some(ContextValue::String(arg)) => argument_name(arg),
                _ => None,
            };
            let value = match err.get(ContextKind::InvalidValue) {
                Some(ContextValue::String(value)) => Some(value.clone()),
                _ => None,
            };
            match (name, value) {
                (Some(name), Some(value)) => OverlayError::ArgumentFormat { name, value },
                _ => OverlayError::Usage,
            }
        }
        _ => OverlayError::Usage,
    }
}

/// clap renders positionals as `<name>`
fn argument_name(rendered: &str) -> Option<&'static str> {
    ["left_pos", "top_pos", "width", "height"]
        .into_iter()
        .find(|name| rendered.trim_matches(|c| c == '<' || c == '>') == *name)
}
