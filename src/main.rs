use clap::{Parser, Subcommand};
use image::ImageReader;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use regiongrab::live::{FrameSink, FrameSource, LoopControl, OverlayLoop};
use regiongrab::{Color, OverlayAnnotator, RasterBuffer, RegionDetector, build_standard_pipeline};

#[derive(Parser)]
#[command(name = "regiongrab")]
#[command(about = "Find and mark rectangular regions of interest in images")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect high-contrast regions (e.g. letters) in a screenshot
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Intensity cutoff for binarization
        #[arg(long, default_value_t = 127)]
        threshold: u8,

        /// Value given to pixels above the cutoff
        #[arg(long, default_value_t = 255)]
        max_value: u8,

        /// Boxes must be larger than this on both axes
        #[arg(long, default_value_t = 10)]
        min_dim: u32,

        /// Outline color (r,g,b[,a] or #rrggbb[aa])
        #[arg(long, default_value = "0,255,0")]
        color: Color,

        /// Outline thickness in pixels
        #[arg(long, default_value_t = 2)]
        stroke: u32,

        /// Where to write the annotated image
        #[arg(short, long, default_value = "detected.png")]
        out: PathBuf,

        /// Save every intermediate step to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },

    /// Replay image files as a frame stream and draw the centered overlay on each
    Overlay {
        /// Frames, in playback order
        #[arg(value_name = "FRAME", required = true)]
        frames: Vec<PathBuf>,

        /// Directory receiving the annotated frames
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Outline color (r,g,b[,a] or #rrggbb[aa])
        #[arg(long, default_value = "255,255,0")]
        color: Color,

        /// Outline thickness in pixels
        #[arg(long, default_value_t = 2)]
        stroke: u32,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<u64>,
    },
}

fn load_image(path: &Path) -> anyhow::Result<RasterBuffer> {
    let img = ImageReader::open(path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;
    info!("Image loaded: {}x{} from {}", img.width(), img.height(), path.display());
    Ok(RasterBuffer::from_decoded_color(img)?)
}

fn save_image(image: RasterBuffer, path: &Path) -> anyhow::Result<()> {
    image
        .into_dynamic()?
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to save image {}: {}", path.display(), e))
}

/// Frames read from files, one per `next_frame` call
struct FileFrames(VecDeque<PathBuf>);

impl FrameSource for FileFrames {
    fn next_frame(&mut self) -> anyhow::Result<Option<RasterBuffer>> {
        self.0.pop_front().map(|path| load_image(&path)).transpose()
    }
}

/// Writes each shown frame as a numbered PNG
struct DirectorySink {
    dir: PathBuf,
    written: usize,
}

impl FrameSink for DirectorySink {
    fn show(&mut self, frame: &RasterBuffer) -> anyhow::Result<LoopControl> {
        self.written += 1;
        let path = self.dir.join(format!("frame_{:04}.png", self.written));
        save_image(frame.clone(), &path)?;
        Ok(LoopControl::Continue)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match args.command {
        Command::Detect {
            image_path,
            threshold,
            max_value,
            min_dim,
            color,
            stroke,
            out,
            debug_out,
        } => {
            let img = load_image(&image_path)?;

            let detector = RegionDetector::new()
                .with_threshold(threshold)
                .with_max_value(max_value)
                .with_min_dim(min_dim)
                .with_color(color)
                .with_stroke_width(stroke);

            let mut pipeline = build_standard_pipeline(&detector);
            if let Some(debug_dir) = debug_out {
                pipeline = pipeline.with_debug(debug_dir)?;
            }

            let detection = pipeline.run(img)?.into_detection();

            println!("\n=== Region Detection Results ===");
            println!("Total regions detected: {}", detection.boxes.len());
            for (i, bbox) in detection.boxes.iter().enumerate() {
                println!("  Region {}: {}", i + 1, bbox);
            }

            save_image(detection.annotated, &out)?;
            println!("Annotated image written to {}", out.display());
        }
        Command::Overlay {
            frames,
            out_dir,
            color,
            stroke,
            max_frames,
        } => {
            std::fs::create_dir_all(&out_dir)?;

            let annotator = OverlayAnnotator::new().with_color(color).with_stroke_width(stroke);
            let mut overlay = OverlayLoop::new(annotator);
            if let Some(max) = max_frames {
                overlay = overlay.with_max_frames(max);
            }

            let mut source = FileFrames(frames.into());
            let mut sink = DirectorySink {
                dir: out_dir.clone(),
                written: 0,
            };
            let stats = overlay.run(&mut source, &mut sink)?;
            println!(
                "Annotated {} frames into {} ({:?})",
                stats.frames,
                out_dir.display(),
                stats.reason
            );
        }
    }

    Ok(())
}
