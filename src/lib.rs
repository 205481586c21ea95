pub mod detection;
pub mod error;
pub mod live;
pub mod models;
pub mod pipeline;
pub mod raster;

pub use detection::{
    Detection, OverlayAnnotator, RegionDetector, annotate_overlay, build_standard_pipeline,
    detect_regions,
};
pub use error::RegionError;
pub use models::{BoundingBox, Color, Contour, RectangleSpec};
pub use pipeline::{Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use raster::{PixelLayout, RasterBuffer};
