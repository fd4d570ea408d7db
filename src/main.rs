// overlay - A click-through, always-on-top image overlay for Wayland
// Pins an image at a fixed screen position above every other window

mod cli;
mod dialog;
mod error;
mod geometry;
mod image_loader;
mod overlay;
mod platform;
mod render;
mod timer;
mod wayland;

use anyhow::Result;
use dialog::MessageBox;
use log::info;
use overlay::OverlayController;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut controller = OverlayController::new(MessageBox);

    // Parse command line arguments
    let args = controller.parse_args(std::env::args_os())?;

    info!(
        "Starting overlay with image: {:?}, geometry: {:?}",
        args.image_path, args.geometry
    );

    wayland::run(&mut controller, &args)?;

    info!("Overlay closed");
    Ok(())
}
