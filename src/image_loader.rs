// Image loading module
// Handles loading and processing of the overlay image

use crate::error::OverlayError;
use image::DynamicImage;
use log::debug;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Loaded image data ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Premultiplied BGRA pixel data (4 bytes per pixel), the byte order of
    /// a little-endian ARGB8888 buffer
    pub bgra_data: Vec<u8>,
}

/// Load the image at `path`, failing with the error the user is shown
pub fn load_image(path: &Path) -> Result<ImageData, OverlayError> {
    if !path.exists() {
        return Err(OverlayError::FileNotFound(path.to_path_buf()));
    }

    let data = fs::read(path).map_err(|e| OverlayError::ImageDecode(e.to_string()))?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    let img = load_from_bytes(&data).map_err(|e| OverlayError::ImageDecode(e.to_string()))?;
    Ok(to_bgra(img))
}

/// Load an image from raw bytes, auto-detecting the format
fn load_from_bytes(data: &[u8]) -> image::ImageResult<DynamicImage> {
    let format = image::guess_format(data)?;
    image::load(Cursor::new(data), format)
}

/// Convert to premultiplied BGRA (Wayland expects ARGB in little-endian)
fn to_bgra(img: DynamicImage) -> ImageData {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut bgra_data = rgba.into_raw();
    for pixel in bgra_data.chunks_exact_mut(4) {
        pixel.swap(0, 2); // Swap R and B
        let alpha = pixel[3] as u32;
        if alpha < 255 {
            for channel in &mut pixel[..3] {
                *channel = ((*channel as u32 * alpha + 127) / 255) as u8;
            }
        }
    }

    ImageData {
        width,
        height,
        bgra_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, img: &RgbaImage) -> std::path::PathBuf {
        let path = dir.path().join(name);
        img.save(&path).expect("failed to write fixture");
        path
    }

    #[test]
    fn test_loads_png_as_bgra() {
        let dir = TempDir::new().unwrap();
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        let path = write_png(&dir, "pixels.png", &img);

        let data = load_image(&path).unwrap();
        assert_eq!((data.width, data.height), (2, 1));
        assert_eq!(data.bgra_data, vec![30, 20, 10, 255, 50, 100, 200, 255]);
    }

    #[test]
    fn test_translucent_pixels_are_premultiplied() {
        let dir = TempDir::new().unwrap();
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 128, 128]));
        let path = write_png(&dir, "half.png", &img);

        let data = load_image(&path).unwrap();
        assert_eq!(data.bgra_data, vec![64, 0, 128, 128]);
    }

    #[test]
    fn test_format_is_sniffed_not_taken_from_extension() {
        let dir = TempDir::new().unwrap();
        let img = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]));
        let path = dir.path().join("really-a-png.jpg");
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let data = load_image(&path).unwrap();
        assert_eq!((data.width, data.height), (3, 3));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.png");

        match load_image(&path) {
            Err(OverlayError::FileNotFound(reported)) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_text_file_with_image_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.png");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "this is not an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, OverlayError::ImageDecode(_)));
        assert!(err.to_string().starts_with("Error while loading image. "));
    }

    #[test]
    fn test_truncated_png() {
        let dir = TempDir::new().unwrap();
        let img = RgbaImage::from_pixel(16, 16, Rgba([9, 9, 9, 255]));
        let good = write_png(&dir, "good.png", &img);
        let bytes = fs::read(&good).unwrap();

        let path = dir.path().join("cut.png");
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(matches!(load_image(&path), Err(OverlayError::ImageDecode(_))));
    }

    #[test]
    fn test_directory_is_not_an_image() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_image(dir.path()),
            Err(OverlayError::ImageDecode(_))
        ));
    }
}
