use image::Rgba;
use imageproc::drawing::{Canvas, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::error::{RegionError, Result};
use crate::models::{Color, RectangleSpec};
use crate::raster::{PixelLayout, RasterBuffer};

const COLOR_LAYOUTS: [PixelLayout; 4] = [
    PixelLayout::Rgb,
    PixelLayout::Bgr,
    PixelLayout::Rgba,
    PixelLayout::Bgra,
];

/// Lets `imageproc` drawing routines paint straight into a raster buffer.
///
/// Pixels are exchanged as RGBA regardless of the buffer's own channel order.
impl Canvas for RasterBuffer {
    type Pixel = Rgba<u8>;

    fn dimensions(&self) -> (u32, u32) {
        RasterBuffer::dimensions(self)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        // imageproc bounds-checks against `dimensions` before reading, so this
        // branch is unreachable from the drawing routines used here
        let Some(px) = self.pixel(x, y) else {
            debug_assert!(false, "get_pixel({}, {}) outside {:?}", x, y, self.dimensions());
            return Rgba([0, 0, 0, 0]);
        };
        match self.layout() {
            PixelLayout::Luma => Rgba([px[0], px[0], px[0], 255]),
            PixelLayout::Rgb => Rgba([px[0], px[1], px[2], 255]),
            PixelLayout::Bgr => Rgba([px[2], px[1], px[0], 255]),
            PixelLayout::Rgba => Rgba([px[0], px[1], px[2], px[3]]),
            PixelLayout::Bgra => Rgba([px[2], px[1], px[0], px[3]]),
        }
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        let [r, g, b, a] = color.0;
        let samples = Color::rgba(r, g, b, a).to_samples(self.layout());
        if let Some(px) = self.pixel_mut(x, y) {
            let n = px.len();
            px.copy_from_slice(&samples[..n]);
        }
    }
}

/// Draw rectangle outlines onto a color buffer, in order.
///
/// The stroke grows inward from the box edge: ring `i` is the one-pixel outline
/// of the box shrunk by `i` on every side. Boxes must lie inside the buffer;
/// every spec is checked before the first pixel is written, so a rejected call
/// leaves the buffer untouched.
pub fn draw_rectangles(buf: &mut RasterBuffer, specs: &[RectangleSpec]) -> Result<()> {
    buf.ensure_layout("annotation", &COLOR_LAYOUTS)?;

    let (width, height) = buf.dimensions();
    for spec in specs {
        if spec.stroke_width == 0 {
            return Err(RegionError::invalid("stroke width must be positive"));
        }
        if !spec.bbox.fits_within(width, height) {
            return Err(RegionError::invalid(format!(
                "rectangle {} lies outside the {}x{} buffer",
                spec.bbox, width, height
            )));
        }
    }

    for spec in specs {
        draw_outline(buf, spec);
    }
    Ok(())
}

fn draw_outline(buf: &mut RasterBuffer, spec: &RectangleSpec) {
    let Color { r, g, b, a } = spec.color;
    let bbox = spec.bbox;

    for inset in 0..spec.stroke_width {
        let shrink = inset.saturating_mul(2);
        let w = bbox.width().saturating_sub(shrink);
        let h = bbox.height().saturating_sub(shrink);
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at((bbox.min_x + inset) as i32, (bbox.min_y + inset) as i32).of_size(w, h);
        draw_hollow_rect_mut(buf, rect, Rgba([r, g, b, a]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    const RED: Color = Color::rgb(255, 0, 0);

    fn canvas(layout: PixelLayout) -> RasterBuffer {
        RasterBuffer::new(100, 100, layout).unwrap()
    }

    fn is_red(buf: &RasterBuffer, x: u32, y: u32) -> bool {
        Canvas::get_pixel(buf, x, y) == Rgba([255, 0, 0, 255])
    }

    #[test]
    fn outline_covers_all_four_edges() {
        let mut buf = canvas(PixelLayout::Rgb);
        let spec = RectangleSpec::new(BoundingBox::new(10, 10, 50, 50), RED, 2);
        draw_rectangles(&mut buf, &[spec]).unwrap();

        assert_eq!(buf.pixel(0, 0), Some(&[0u8, 0, 0][..]));
        for t in 10..50 {
            // outer ring
            assert!(is_red(&buf, t, 10), "top edge at x={}", t);
            assert!(is_red(&buf, t, 49), "bottom edge at x={}", t);
            assert!(is_red(&buf, 10, t), "left edge at y={}", t);
            assert!(is_red(&buf, 49, t), "right edge at y={}", t);
        }
        for t in 11..49 {
            // inner ring
            assert!(is_red(&buf, t, 11));
            assert!(is_red(&buf, t, 48));
            assert!(is_red(&buf, 11, t));
            assert!(is_red(&buf, 48, t));
        }
        // interior and outside stay untouched
        assert!(!is_red(&buf, 12, 30));
        assert!(!is_red(&buf, 30, 30));
        assert!(!is_red(&buf, 9, 30));
        assert!(!is_red(&buf, 50, 30));
    }

    #[test]
    fn stroke_is_symmetric() {
        let mut buf = canvas(PixelLayout::Rgb);
        let spec = RectangleSpec::new(BoundingBox::new(20, 20, 60, 60), RED, 3);
        draw_rectangles(&mut buf, &[spec]).unwrap();

        let painted_left = (20..60).take_while(|&x| is_red(&buf, x, 40)).count();
        let painted_right = (20..60).rev().take_while(|&x| is_red(&buf, x, 40)).count();
        let painted_top = (20..60).take_while(|&y| is_red(&buf, 40, y)).count();
        let painted_bottom = (20..60).rev().take_while(|&y| is_red(&buf, 40, y)).count();
        assert_eq!(
            (painted_left, painted_right, painted_top, painted_bottom),
            (3, 3, 3, 3)
        );
    }

    #[test]
    fn writes_color_in_buffer_channel_order() {
        let mut buf = canvas(PixelLayout::Bgra);
        let spec = RectangleSpec::new(BoundingBox::new(0, 0, 5, 5), Color::rgba(1, 2, 3, 4), 1);
        draw_rectangles(&mut buf, &[spec]).unwrap();
        assert_eq!(buf.pixel(0, 0), Some(&[3u8, 2, 1, 4][..]));
    }

    #[test]
    fn later_rectangles_overwrite_earlier_ones() {
        let mut buf = canvas(PixelLayout::Rgb);
        let box_ = BoundingBox::new(10, 10, 30, 30);
        let specs = [
            RectangleSpec::new(box_, RED, 1),
            RectangleSpec::new(box_, Color::GREEN, 1),
        ];
        draw_rectangles(&mut buf, &specs).unwrap();
        assert_eq!(buf.pixel(10, 10), Some(&[0u8, 255, 0][..]));
    }

    #[test]
    fn thick_stroke_on_small_box_fills_it() {
        let mut buf = canvas(PixelLayout::Rgb);
        let spec = RectangleSpec::new(BoundingBox::new(0, 0, 4, 4), RED, 10);
        draw_rectangles(&mut buf, &[spec]).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert!(is_red(&buf, x, y));
            }
        }
        assert!(!is_red(&buf, 4, 4));
    }

    #[test]
    fn out_of_bounds_box_is_rejected_without_drawing() {
        let mut buf = canvas(PixelLayout::Rgb);
        let specs = [
            RectangleSpec::new(BoundingBox::new(10, 10, 20, 20), RED, 1),
            RectangleSpec::new(BoundingBox::new(90, 90, 101, 95), RED, 1),
        ];
        let err = draw_rectangles(&mut buf, &specs).unwrap_err();
        assert!(matches!(err, RegionError::InvalidInput(_)));
        assert!(buf.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn rejects_grayscale_and_zero_stroke() {
        let mut gray = canvas(PixelLayout::Luma);
        let spec = RectangleSpec::new(BoundingBox::new(0, 0, 5, 5), RED, 1);
        assert!(draw_rectangles(&mut gray, &[spec]).is_err());

        let mut buf = canvas(PixelLayout::Rgb);
        let spec = RectangleSpec::new(BoundingBox::new(0, 0, 5, 5), RED, 0);
        assert!(draw_rectangles(&mut buf, &[spec]).is_err());
    }

    #[test]
    fn imageproc_clips_shapes_hanging_off_the_canvas() {
        let mut buf = RasterBuffer::new(10, 10, PixelLayout::Rgb).unwrap();
        let red = Rgba([255, 0, 0, 255]);
        draw_hollow_rect_mut(&mut buf, Rect::at(-5, -5).of_size(10, 30), red);
        assert!(is_red(&buf, 4, 0));
        assert!(is_red(&buf, 4, 9));
        assert!(!is_red(&buf, 5, 0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside")]
    fn reading_outside_the_canvas_is_a_bug() {
        let buf = canvas(PixelLayout::Rgb);
        Canvas::get_pixel(&buf, 100, 0);
    }
}
