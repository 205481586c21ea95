//! Frame-by-frame overlay loop.
//!
//! A [`FrameSource`] supplies frames, the [`OverlayAnnotator`] marks each one,
//! and a [`FrameSink`] displays it. One frame is in flight at a time; a slow
//! sink directly delays the next capture. The loop stops cooperatively between
//! frames: when the source runs dry, when the frame limit is hit, when the
//! sink asks for it, or when a [`StopHandle`] is triggered from elsewhere.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing::{debug, info};

use crate::detection::OverlayAnnotator;
use crate::raster::RasterBuffer;

/// Supplies frames to the loop. `Ok(None)` means end of stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RasterBuffer>>;
}

/// What the sink wants the loop to do after showing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Consumes annotated frames (a window, an encoder, a directory...).
pub trait FrameSink {
    fn show(&mut self, frame: &RasterBuffer) -> Result<LoopControl>;
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    /// The configured frame limit was reached
    FrameLimit,
    SinkRequested,
    StopHandle,
}

#[derive(Debug)]
enum LoopState {
    Capturing,
    Annotating(RasterBuffer),
    Displaying(RasterBuffer),
    Stopped(StopReason),
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub reason: StopReason,
}

/// Cloneable flag that asks a running loop to stop after the current frame.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct OverlayLoop {
    annotator: OverlayAnnotator,
    stop: StopHandle,
    max_frames: Option<u64>,
}

impl OverlayLoop {
    pub fn new(annotator: OverlayAnnotator) -> Self {
        Self {
            annotator,
            stop: StopHandle::default(),
            max_frames: None,
        }
    }

    /// End the run after this many frames
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Drive frames from `source` to `sink` until one of the stop conditions hits.
    ///
    /// Source, sink and annotation failures abort the run and are returned as is.
    pub fn run(&self, source: &mut dyn FrameSource, sink: &mut dyn FrameSink) -> Result<LoopStats> {
        info!("Starting overlay loop");
        let mut frames = 0u64;
        let mut state = LoopState::Capturing;

        let reason = loop {
            state = match state {
                LoopState::Capturing => {
                    if self.stop.is_stopped() {
                        LoopState::Stopped(StopReason::StopHandle)
                    } else if self.max_frames.is_some_and(|max| frames >= max) {
                        LoopState::Stopped(StopReason::FrameLimit)
                    } else {
                        match source.next_frame()? {
                            Some(frame) => LoopState::Annotating(frame),
                            None => LoopState::Stopped(StopReason::EndOfStream),
                        }
                    }
                }
                LoopState::Annotating(frame) => LoopState::Displaying(self.annotator.annotate(frame)?),
                LoopState::Displaying(frame) => {
                    frames += 1;
                    debug!(frame = frames, width = frame.width(), height = frame.height(), "displaying frame");
                    match sink.show(&frame)? {
                        LoopControl::Continue => LoopState::Capturing,
                        LoopControl::Stop => LoopState::Stopped(StopReason::SinkRequested),
                    }
                }
                LoopState::Stopped(reason) => break reason,
            };
        };

        info!(frames, ?reason, "Overlay loop stopped");
        Ok(LoopStats { frames, reason })
    }
}
