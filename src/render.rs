// Rendering module
// Blits the loaded image into an ARGB8888 canvas

use crate::image_loader::ImageData;

/// Stretch the image over the whole canvas, ignoring aspect ratio.
///
/// Nearest-neighbor sampling with 16.16 fixed-point steps. The canvas is
/// `width * height * 4` bytes; anything the image does not cover (an empty
/// image) stays fully transparent.
pub fn stretch_to_fill(image: &ImageData, canvas: &mut [u8], width: u32, height: u32) {
    canvas.fill(0);

    if width == 0 || height == 0 || image.width == 0 || image.height == 0 {
        return;
    }

    let scale_x_fp = ((image.width as u64) << 16) / width as u64;
    let scale_y_fp = ((image.height as u64) << 16) / height as u64;
    let img_stride = image.width as usize * 4;
    let src_data = &image.bgra_data[..];

    // Pre-compute X lookup table to avoid repeated calculations per row
    let x_lut: Vec<usize> = (0..width)
        .map(|x| {
            let src_x = ((x as u64 * scale_x_fp) >> 16) as u32;
            src_x.min(image.width - 1) as usize * 4
        })
        .collect();

    for (y, row) in canvas
        .chunks_exact_mut(width as usize * 4)
        .take(height as usize)
        .enumerate()
    {
        let src_y = ((y as u64 * scale_y_fp) >> 16) as u32;
        let src_row = src_y.min(image.height - 1) as usize * img_stride;

        for (dst, &src_x) in row.chunks_exact_mut(4).zip(&x_lut) {
            let src_idx = src_row + src_x;
            if let Some(src) = src_data.get(src_idx..src_idx + 4) {
                dst.copy_from_slice(src);
            }
        }
    }
}
