use std::fmt;
use std::str::FromStr;

use imageproc::point::Point;

use crate::raster::PixelLayout;

/// Outer boundary of one connected foreground region, as a closed polygon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<u32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<u32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Axis-aligned box in pixel coordinates.
///
/// The maximum edge is exclusive: the box covers columns `min_x..max_x` and
/// rows `min_y..max_y`, so `width()` and `height()` are pixel counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// Build a box from two corners, in either order
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether the box lies entirely inside a `width` x `height` buffer
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.max_x <= width && self.max_y <= height
    }

    /// Clamp the box to a `width` x `height` buffer.
    pub fn clipped_to(&self, width: u32, height: u32) -> Self {
        Self::new(
            self.min_x.min(width),
            self.min_y.min(height),
            self.max_x.min(width),
            self.max_y.min(height),
        )
    }

    /// The centered box spanning the middle half of each axis.
    pub fn centered_half(width: u32, height: u32) -> Self {
        // 3/4 of any u32 fits back into a u32
        let three_quarters = |n: u32| (3 * u64::from(n) / 4) as u32;
        Self::new(width / 4, height / 4, three_quarters(width), three_quarters(height))
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {}) {}x{}",
            self.min_x,
            self.min_y,
            self.max_x,
            self.max_y,
            self.width(),
            self.height()
        )
    }
}

/// Drawing color, independent of any buffer's channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Samples for one pixel of the given layout; only the first
    /// `layout.channels()` entries are meaningful.
    pub fn to_samples(self, layout: PixelLayout) -> [u8; 4] {
        match layout {
            PixelLayout::Luma => [self.r, 0, 0, 0],
            PixelLayout::Rgb | PixelLayout::Rgba => [self.r, self.g, self.b, self.a],
            PixelLayout::Bgr | PixelLayout::Bgra => [self.b, self.g, self.r, self.a],
        }
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `r,g,b`, `r,g,b,a`, `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let components: Vec<u8> = if let Some(hex) = s.strip_prefix('#') {
            if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
                return Err(format!("expected #rrggbb or #rrggbbaa, got '{}'", s));
            }
            (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
                .collect::<Result<_, _>>()
                .map_err(|e| format!("invalid hex color '{}': {}", s, e))?
        } else {
            s.split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|e| format!("invalid color component in '{}': {}", s, e))?
        };

        match components.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            _ => Err(format!("expected 3 or 4 color components, got '{}'", s)),
        }
    }
}

/// One outline to draw: where, in what color, how thick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectangleSpec {
    pub bbox: BoundingBox,
    pub color: Color,
    pub stroke_width: u32,
}

impl RectangleSpec {
    pub fn new(bbox: BoundingBox, color: Color, stroke_width: u32) -> Self {
        Self {
            bbox,
            color,
            stroke_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_dimensions_are_exclusive_spans() {
        let bbox = BoundingBox::new(20, 20, 80, 80);
        assert_eq!(bbox.width(), 60);
        assert_eq!(bbox.height(), 60);
        assert!(bbox.fits_within(80, 80));
        assert!(!bbox.fits_within(79, 100));
    }

    #[test]
    fn corners_are_normalized() {
        assert_eq!(BoundingBox::new(50, 40, 10, 5), BoundingBox::new(10, 5, 50, 40));
    }

    #[test]
    fn clipping_clamps_each_edge() {
        let bbox = BoundingBox::new(90, 10, 130, 60).clipped_to(100, 50);
        assert_eq!(bbox, BoundingBox::new(90, 10, 100, 50));

        let outside = BoundingBox::new(120, 10, 130, 20).clipped_to(100, 50);
        assert!(outside.is_empty());
    }

    #[test]
    fn centered_half_of_vga_frame() {
        assert_eq!(
            BoundingBox::centered_half(640, 480),
            BoundingBox::new(160, 120, 480, 360)
        );
        // odd sizes round down on both corners
        assert_eq!(BoundingBox::centered_half(7, 5), BoundingBox::new(1, 1, 5, 3));
    }

    #[test]
    fn centered_half_of_huge_frame_does_not_overflow() {
        assert_eq!(
            BoundingBox::centered_half(2_000_000_000, 4),
            BoundingBox::new(500_000_000, 1, 1_500_000_000, 3)
        );
        let full = BoundingBox::centered_half(u32::MAX, u32::MAX);
        assert_eq!(full.max_x, 3_221_225_471);
    }

    #[test]
    fn parses_colors() {
        assert_eq!("0,255,0".parse::<Color>(), Ok(Color::GREEN));
        assert_eq!("255, 255, 0, 0".parse::<Color>(), Ok(Color::rgba(255, 255, 0, 0)));
        assert_eq!("#ffff00".parse::<Color>(), Ok(Color::YELLOW));
        assert_eq!("#01020380".parse::<Color>(), Ok(Color::rgba(1, 2, 3, 128)));
        assert!("1,2".parse::<Color>().is_err());
        assert!("300,0,0".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn samples_follow_channel_order() {
        let color = Color::rgba(1, 2, 3, 4);
        assert_eq!(color.to_samples(PixelLayout::Rgba), [1, 2, 3, 4]);
        assert_eq!(color.to_samples(PixelLayout::Bgr), [3, 2, 1, 4]);
    }
}
