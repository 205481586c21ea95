use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage, RgbaImage};

use crate::error::{RegionError, Result};

/// Channel layout of a [`RasterBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Single-channel intensity (grayscale or binary)
    Luma,
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Luma => 1,
            PixelLayout::Rgb | PixelLayout::Bgr => 3,
            PixelLayout::Rgba | PixelLayout::Bgra => 4,
        }
    }

    pub fn is_color(self) -> bool {
        self != PixelLayout::Luma
    }

    /// Offsets of the red, green and blue samples within one pixel.
    pub(crate) fn rgb_offsets(self) -> Option<[usize; 3]> {
        match self {
            PixelLayout::Luma => None,
            PixelLayout::Rgb | PixelLayout::Rgba => Some([0, 1, 2]),
            PixelLayout::Bgr | PixelLayout::Bgra => Some([2, 1, 0]),
        }
    }
}

/// An owned, row-major 8-bit pixel grid.
///
/// The storage length always equals `width * height * channels`, and both
/// dimensions are non-zero. Pipeline stages take buffers by reference and hand
/// back fresh ones, or take them by value and mutate in place; a buffer is never
/// shared between two stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Create a zero-filled buffer
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> Result<Self> {
        let len = checked_len(width, height, layout)?;
        Ok(Self {
            width,
            height,
            layout,
            data: vec![0; len],
        })
    }

    /// Wrap existing pixel storage
    pub fn from_raw(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        let len = checked_len(width, height, layout)?;
        if data.len() != len {
            return Err(RegionError::invalid(format!(
                "{}x{} {:?} buffer needs {} bytes, got {}",
                width,
                height,
                layout,
                len,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * self.channels())
    }

    /// Samples of the pixel at `(x, y)`, or `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        let start = self.offset(x, y)?;
        Some(&self.data[start..start + self.channels()])
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let start = self.offset(x, y)?;
        let channels = self.channels();
        Some(&mut self.data[start..start + channels])
    }

    /// Iterate over the samples of every pixel in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.channels())
    }

    pub(crate) fn ensure_layout(&self, stage: &str, accepted: &[PixelLayout]) -> Result<()> {
        if accepted.contains(&self.layout) {
            Ok(())
        } else {
            Err(RegionError::invalid(format!(
                "{} does not accept {:?} buffers ({} channels)",
                stage,
                self.layout,
                self.channels()
            )))
        }
    }

    /// View the buffer as a grayscale image for the `imageproc` algorithms.
    pub(crate) fn to_gray_image(&self) -> Result<GrayImage> {
        self.ensure_layout("grayscale view", &[PixelLayout::Luma])?;
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| RegionError::invalid("buffer does not match its dimensions"))
    }

    /// Build a color buffer from a decoded file.
    ///
    /// Grayscale images (with or without alpha) are expanded to 8-bit RGB so
    /// they can go through the color pipeline; color images keep their layout.
    pub fn from_decoded_color(image: DynamicImage) -> Result<Self> {
        if image.color().has_color() {
            image.try_into()
        } else {
            image.to_rgb8().try_into()
        }
    }

    /// Convert into an `image` crate value, reordering BGR samples to RGB.
    pub fn into_dynamic(self) -> Result<DynamicImage> {
        let (width, height) = (self.width, self.height);
        let mismatch = || RegionError::invalid("buffer does not match its dimensions");
        let image = match self.layout {
            PixelLayout::Luma => {
                DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, self.data).ok_or_else(mismatch)?)
            }
            PixelLayout::Rgb => {
                DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, self.data).ok_or_else(mismatch)?)
            }
            PixelLayout::Rgba => {
                DynamicImage::ImageRgba8(RgbaImage::from_raw(width, height, self.data).ok_or_else(mismatch)?)
            }
            PixelLayout::Bgr => {
                let mut data = self.data;
                data.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
                DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data).ok_or_else(mismatch)?)
            }
            PixelLayout::Bgra => {
                let mut data = self.data;
                data.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
                DynamicImage::ImageRgba8(RgbaImage::from_raw(width, height, data).ok_or_else(mismatch)?)
            }
        };
        Ok(image)
    }
}

fn checked_len(width: u32, height: u32, layout: PixelLayout) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(RegionError::invalid(format!(
            "buffer dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(layout.channels()))
        .ok_or_else(|| RegionError::invalid(format!("{}x{} buffer is too large", width, height)))
}

impl<P> TryFrom<ImageBuffer<P, Vec<u8>>> for RasterBuffer
where
    P: image::Pixel<Subpixel = u8>,
{
    type Error = RegionError;

    fn try_from(image: ImageBuffer<P, Vec<u8>>) -> Result<Self> {
        let layout = match P::CHANNEL_COUNT {
            1 => PixelLayout::Luma,
            3 => PixelLayout::Rgb,
            4 => PixelLayout::Rgba,
            n => {
                return Err(RegionError::invalid(format!(
                    "unsupported pixel type with {} channels",
                    n
                )));
            }
        };
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, layout, image.into_raw())
    }
}

impl TryFrom<DynamicImage> for RasterBuffer {
    type Error = RegionError;

    /// Decoded images keep a grayscale or RGB(A) layout; anything else
    /// (16-bit, float, luma+alpha) is converted to 8-bit RGB or RGBA first.
    fn try_from(image: DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageLuma8(gray) => gray.try_into(),
            DynamicImage::ImageRgb8(rgb) => rgb.try_into(),
            DynamicImage::ImageRgba8(rgba) => rgba.try_into(),
            other if other.color().has_alpha() => other.to_rgba8().try_into(),
            other => other.to_rgb8().try_into(),
        }
    }
}
