use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::detection::Detection;
use crate::models::{BoundingBox, Contour};
use crate::raster::RasterBuffer;

/// Data handed from step to step.
///
/// `original` is the color input that annotation draws on; `image` is the
/// working buffer the preprocessing steps replace (grayscale, then binary).
#[derive(Debug, Clone)]
pub struct PipelineData {
    pub original: RasterBuffer,
    pub image: RasterBuffer,
    pub contours: Vec<Contour>,
    pub boxes: Vec<BoundingBox>,
}

impl PipelineData {
    /// Start a run from a full input image
    pub fn from_image(image: RasterBuffer) -> Self {
        Self {
            original: image.clone(),
            image,
            contours: Vec::new(),
            boxes: Vec::new(),
        }
    }

    pub fn into_detection(self) -> Detection {
        Detection {
            annotated: self.original,
            boxes: self.boxes,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving one PNG per step
    pub output_dir: PathBuf,
}

impl DebugConfig {
    fn save(&self, file_name: &str, image: &RasterBuffer) -> Result<()> {
        let path = self.output_dir.join(file_name);
        image
            .clone()
            .into_dynamic()?
            .save(&path)
            .with_context(|| format!("Failed to save debug image {}", path.display()))?;
        debug!(path = %path.display(), "saved debug snapshot");
        Ok(())
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Consume the data of the previous step and hand back the transformed data
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug file names)
    fn name(&self) -> &str;

    /// The buffer written to the debug directory after this step ran
    fn snapshot<'a>(&self, data: &'a PipelineData) -> &'a RasterBuffer {
        &data.image
    }
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug snapshots.
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                anyhow::bail!("Debug directory is not empty: {}", output_dir.display());
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step on an input image
    pub fn run(&self, input: RasterBuffer) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run only the first `num_steps` steps (useful for inspecting intermediates)
    pub fn run_partial(&self, input: RasterBuffer, num_steps: usize) -> Result<PipelineData> {
        if let Some(debug) = &self.context.debug {
            debug.save("00_input.png", &input)?;
        }

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            debug!(step = step.name(), index = step_idx + 1, "running step");
            data = step
                .process(data, &self.context)
                .with_context(|| format!("Step '{}' failed", step.name()))?;

            if let Some(debug) = &self.context.debug {
                let file_name = format!(
                    "{:02}_{}.png",
                    step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_")
                );
                debug.save(&file_name, step.snapshot(&data))?;
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
