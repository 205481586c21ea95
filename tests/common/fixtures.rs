#![allow(dead_code)]

use image::{ImageBuffer, Luma, Rgb};
use regiongrab::{BoundingBox, PixelLayout, RasterBuffer};
use tempfile::NamedTempFile;

/// Creates a black color buffer of the given size.
pub fn black(width: u32, height: u32, layout: PixelLayout) -> RasterBuffer {
    RasterBuffer::new(width, height, layout).expect("Failed to create test buffer")
}

/// Fills every pixel inside `bbox` (max edge exclusive) with `samples`.
pub fn fill(buf: &mut RasterBuffer, bbox: BoundingBox, samples: &[u8]) {
    for y in bbox.min_y..bbox.max_y {
        for x in bbox.min_x..bbox.max_x {
            buf.pixel_mut(x, y)
                .expect("fill outside test buffer")
                .copy_from_slice(samples);
        }
    }
}

/// The 100x100 black screenshot with a white square from (20,20) to (80,80).
pub fn white_square_screenshot() -> RasterBuffer {
    let mut buf = black(100, 100, PixelLayout::Rgb);
    fill(&mut buf, BoundingBox::new(20, 20, 80, 80), &[255, 255, 255]);
    buf
}

/// Writes a 64x48 gray frame to a temp PNG and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_frame() -> NamedTempFile {
    let img = ImageBuffer::from_fn(64, 48, |_, _| Rgb([40u8, 40u8, 40u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Whether the pixel at `(x, y)` holds exactly `samples`.
pub fn pixel_is(buf: &RasterBuffer, x: u32, y: u32, samples: &[u8]) -> bool {
    buf.pixel(x, y) == Some(samples)
}

/// Writes the white-square screenshot as a single-channel grayscale PNG.
pub fn create_grayscale_screenshot() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |x, y| {
        if (20..80).contains(&x) && (20..80).contains(&y) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}
