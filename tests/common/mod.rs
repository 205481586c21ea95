mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from regiongrab for tests
pub use regiongrab::{BoundingBox, Color, PixelLayout, RasterBuffer, RegionError};
