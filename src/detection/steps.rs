use anyhow::Result;
use tracing::debug;

use crate::detection::{annotate, contours, preprocessing, regions};
use crate::models::{Color, RectangleSpec};
use crate::pipeline::{PipelineContext, PipelineData, PipelineStep};
use crate::raster::RasterBuffer;

/// Convert the working image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.image = preprocessing::to_grayscale(&data.image)?;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Binarize the working image with a global cutoff
pub struct ThresholdStep {
    pub threshold: u8,
    pub max_value: u8,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.image = preprocessing::binarize(&data.image, self.threshold, self.max_value)?;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Trace the external contours of the binary working image
pub struct ContourTracingStep;

impl PipelineStep for ContourTracingStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.contours = contours::trace_external_contours(&data.image)?;
        debug!(contours = data.contours.len(), "traced external contours");
        Ok(data)
    }

    fn name(&self) -> &str {
        "Contour Tracing"
    }
}

/// Bound the traced contours and drop the small ones
pub struct RegionFilterStep {
    pub min_dim: u32,
}

impl PipelineStep for RegionFilterStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        data.boxes = regions::filter_regions(&data.contours, self.min_dim);
        debug!(
            contours = data.contours.len(),
            kept = data.boxes.len(),
            "filtered regions"
        );
        Ok(data)
    }

    fn name(&self) -> &str {
        "Region Filtering"
    }
}

/// Draw every surviving box on the original color image
pub struct AnnotationStep {
    pub color: Color,
    pub stroke_width: u32,
}

impl PipelineStep for AnnotationStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let specs: Vec<RectangleSpec> = data
            .boxes
            .iter()
            .map(|&bbox| RectangleSpec::new(bbox, self.color, self.stroke_width))
            .collect();
        annotate::draw_rectangles(&mut data.original, &specs)?;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Annotation"
    }

    fn snapshot<'a>(&self, data: &'a PipelineData) -> &'a RasterBuffer {
        &data.original
    }
}
