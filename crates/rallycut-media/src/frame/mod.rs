//! Frame sources.
//!
//! A [`FrameSource`] is the video-handling collaborator the engine depends on:
//! it reports frame count, frame rate and dimensions, and yields decoded luma
//! frames in order. Opening happens in each implementation's constructor and
//! closing in its `Drop`, so a handle is released on every exit path.
//!
//! Implementations:
//! - [`FfmpegFrameSource`]: decodes through an `ffmpeg` rawvideo pipe
//! - [`MemoryFrameSource`]: frames generated or held in memory
//! - `OpenCvFrameSource`: `VideoCapture` backed, behind the `opencv` feature

mod ffmpeg;
mod memory;
#[cfg(feature = "opencv")]
mod capture;

pub use ffmpeg::FfmpegFrameSource;
pub use memory::MemoryFrameSource;
#[cfg(feature = "opencv")]
pub use capture::OpenCvFrameSource;

use image::GrayImage;
use tokio::sync::watch;

use crate::error::MediaResult;

/// A decoded grayscale frame and its position in the stream.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub image: GrayImage,
}

/// Sequential access to a video's frames.
pub trait FrameSource: Send {
    /// Total frames reported by the container. May overstate what is readable.
    fn frame_count(&self) -> u64;

    /// Reported frame rate. Zero means unknown; callers substitute a default.
    fn fps(&self) -> f64;

    /// Frame size as `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Decode the next frame, or `None` at end of stream.
    fn read_frame(&mut self) -> MediaResult<Option<GrayImage>>;

    /// Advance past the next frame without producing pixels.
    ///
    /// Returns `false` at end of stream.
    fn skip_frame(&mut self) -> MediaResult<bool> {
        Ok(self.read_frame()?.is_some())
    }

    /// Human-readable origin, used in reports and logs.
    fn describe(&self) -> String {
        "frame source".to_string()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_count(&self) -> u64 {
        (**self).frame_count()
    }

    fn fps(&self) -> f64 {
        (**self).fps()
    }

    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn read_frame(&mut self) -> MediaResult<Option<GrayImage>> {
        (**self).read_frame()
    }

    fn skip_frame(&mut self) -> MediaResult<bool> {
        (**self).skip_frame()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Outcome of one [`SequentialReader::advance`] call.
#[derive(Debug)]
pub enum ReadStep {
    /// A sampled frame.
    Frame(Frame),
    /// The caller requested cancellation before this frame was read.
    Cancelled,
    /// The source has no more frames.
    End,
}

/// Reads every `stride`-th frame, skipping the ones in between.
///
/// Skipped frames are still consumed from the source but never decoded into
/// an image by callers. Cancellation is checked before every frame.
pub struct SequentialReader<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
    stride: u64,
    position: u64,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl<'a, S: FrameSource + ?Sized> SequentialReader<'a, S> {
    pub fn new(source: &'a mut S, stride: u64) -> Self {
        Self {
            source,
            stride: stride.max(1),
            position: 0,
            cancel_rx: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: Option<watch::Receiver<bool>>) -> Self {
        self.cancel_rx = cancel_rx;
        self
    }

    /// Frames consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn cancel_requested(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Advance to the next sampled frame.
    pub fn advance(&mut self) -> MediaResult<ReadStep> {
        loop {
            if self.cancel_requested() {
                return Ok(ReadStep::Cancelled);
            }

            let index = self.position;
            if index % self.stride == 0 {
                return match self.source.read_frame()? {
                    Some(image) => {
                        self.position += 1;
                        Ok(ReadStep::Frame(Frame { index, image }))
                    }
                    None => Ok(ReadStep::End),
                };
            }

            if !self.source.skip_frame()? {
                return Ok(ReadStep::End);
            }
            self.position += 1;
        }
    }
}
