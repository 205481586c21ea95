use crate::error::{RegionError, Result};
use crate::raster::{PixelLayout, RasterBuffer};

// Rec.601 luma weights in 14-bit fixed point; they sum to 1 << 14.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Convert a color buffer to single-channel luminance.
///
/// Uses `0.299 R + 0.587 G + 0.114 B`, reading the channels in the buffer's
/// own order. Alpha is ignored.
pub fn to_grayscale(img: &RasterBuffer) -> Result<RasterBuffer> {
    img.ensure_layout(
        "grayscale conversion",
        &[
            PixelLayout::Rgb,
            PixelLayout::Bgr,
            PixelLayout::Rgba,
            PixelLayout::Bgra,
        ],
    )?;
    let [r, g, b] = img
        .layout()
        .rgb_offsets()
        .ok_or_else(|| RegionError::invalid("grayscale conversion needs a color buffer"))?;

    let luma = img
        .pixels()
        .map(|px| {
            let weighted = px[r] as u32 * LUMA_R + px[g] as u32 * LUMA_G + px[b] as u32 * LUMA_B;
            ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
        })
        .collect();

    RasterBuffer::from_raw(img.width(), img.height(), PixelLayout::Luma, luma)
}

/// Global binary threshold: `max_value` where the input exceeds `threshold`, else 0.
pub fn binarize(img: &RasterBuffer, threshold: u8, max_value: u8) -> Result<RasterBuffer> {
    img.ensure_layout("binarization", &[PixelLayout::Luma])?;

    let binary = img
        .as_raw()
        .iter()
        .map(|&v| if v > threshold { max_value } else { 0 })
        .collect();

    RasterBuffer::from_raw(img.width(), img.height(), PixelLayout::Luma, binary)
}
