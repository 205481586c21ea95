pub mod annotate;
pub mod contours;
pub mod preprocessing;
pub mod regions;
pub mod steps;

use tracing::debug;

use crate::error::Result;
use crate::models::{BoundingBox, Color, RectangleSpec};
use crate::raster::RasterBuffer;

/// Result of region detection: the annotated color buffer and the boxes drawn on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub annotated: RasterBuffer,
    pub boxes: Vec<BoundingBox>,
}

/// Region detection orchestrator
///
/// grayscale -> binarize -> trace external contours -> bound and filter -> annotate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDetector {
    // Detection parameters
    pub threshold: u8,
    pub max_value: u8,
    pub min_dim: u32,
    // Annotation parameters
    pub color: Color,
    pub stroke_width: u32,
}

impl RegionDetector {
    pub fn new() -> Self {
        Self {
            threshold: 127,
            max_value: 255,
            min_dim: 10,
            color: Color::GREEN,
            stroke_width: 2,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_value(mut self, max_value: u8) -> Self {
        self.max_value = max_value;
        self
    }

    pub fn with_min_dim(mut self, min_dim: u32) -> Self {
        self.min_dim = min_dim;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    /// Find the boxes without drawing anything
    pub fn find_regions(&self, image: &RasterBuffer) -> Result<Vec<BoundingBox>> {
        let gray = preprocessing::to_grayscale(image)?;
        let binary = preprocessing::binarize(&gray, self.threshold, self.max_value)?;
        let traced = contours::trace_external_contours(&binary)?;
        let boxes = regions::filter_regions(&traced, self.min_dim);
        debug!(
            contours = traced.len(),
            kept = boxes.len(),
            min_dim = self.min_dim,
            "filtered traced regions"
        );
        Ok(boxes)
    }

    /// Run the full detection on an image and mark every region on it
    pub fn detect(&self, mut image: RasterBuffer) -> Result<Detection> {
        let boxes = self.find_regions(&image)?;
        annotate::draw_rectangles(&mut image, &self.rectangles(&boxes))?;
        Ok(Detection {
            annotated: image,
            boxes,
        })
    }

    pub fn rectangles(&self, boxes: &[BoundingBox]) -> Vec<RectangleSpec> {
        boxes
            .iter()
            .map(|&bbox| RectangleSpec::new(bbox, self.color, self.stroke_width))
            .collect()
    }
}

impl Default for RegionDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws the fixed centered rectangle on live frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayAnnotator {
    pub color: Color,
    pub stroke_width: u32,
}

impl OverlayAnnotator {
    pub fn new() -> Self {
        Self {
            color: Color::YELLOW,
            stroke_width: 2,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn rectangle_for(&self, width: u32, height: u32) -> RectangleSpec {
        RectangleSpec::new(
            BoundingBox::centered_half(width, height),
            self.color,
            self.stroke_width,
        )
    }

    pub fn annotate(&self, mut frame: RasterBuffer) -> Result<RasterBuffer> {
        let spec = self.rectangle_for(frame.width(), frame.height());
        annotate::draw_rectangles(&mut frame, &[spec])?;
        Ok(frame)
    }
}

impl Default for OverlayAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw the default overlay rectangle (middle half of the frame, yellow, stroke 2).
pub fn annotate_overlay(frame: RasterBuffer) -> Result<RasterBuffer> {
    OverlayAnnotator::default().annotate(frame)
}

/// Detect high-contrast regions with the given cutoff and minimum box size,
/// marking them in green with a 2px stroke.
pub fn detect_regions(image: RasterBuffer, threshold: u8, min_dim: u32) -> Result<Detection> {
    RegionDetector::new()
        .with_threshold(threshold)
        .with_min_dim(min_dim)
        .detect(image)
}

/// Build the step-based pipeline equivalent of [`RegionDetector::detect`]
pub fn build_standard_pipeline(detector: &RegionDetector) -> crate::pipeline::Pipeline {
    use crate::pipeline::Pipeline;
    use steps::*;

    Pipeline::new()
        .add_step(Box::new(GrayscaleStep))
        .add_step(Box::new(ThresholdStep {
            threshold: detector.threshold,
            max_value: detector.max_value,
        }))
        .add_step(Box::new(ContourTracingStep))
        .add_step(Box::new(RegionFilterStep {
            min_dim: detector.min_dim,
        }))
        .add_step(Box::new(AnnotationStep {
            color: detector.color,
            stroke_width: detector.stroke_width,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelLayout;

    #[test]
    fn defaults_match_screenshot_analysis() {
        let detector = RegionDetector::default();
        assert_eq!(detector.threshold, 127);
        assert_eq!(detector.max_value, 255);
        assert_eq!(detector.min_dim, 10);
        assert_eq!(detector.color, Color::GREEN);
        assert_eq!(detector.stroke_width, 2);
    }

    #[test]
    fn overlay_rectangle_spans_middle_half() {
        let spec = OverlayAnnotator::default().rectangle_for(640, 480);
        assert_eq!(spec.bbox, BoundingBox::new(160, 120, 480, 360));
        assert_eq!(spec.color, Color::YELLOW);
        assert_eq!(spec.stroke_width, 2);
    }

    #[test]
    fn overlay_rejects_grayscale_frames() {
        let frame = RasterBuffer::new(64, 48, PixelLayout::Luma).unwrap();
        assert!(annotate_overlay(frame).is_err());
    }

    #[test]
    fn detection_of_blank_image_is_empty() {
        let image = RasterBuffer::new(32, 32, PixelLayout::Rgb).unwrap();
        let detection = detect_regions(image.clone(), 127, 10).unwrap();
        assert!(detection.boxes.is_empty());
        assert_eq!(detection.annotated, image);
    }
}
