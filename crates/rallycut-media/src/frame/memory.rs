//! In-memory frame source.

use image::GrayImage;

use super::FrameSource;
use crate::error::{MediaError, MediaResult};

type FrameFn = Box<dyn FnMut(u64) -> GrayImage + Send>;

/// Frames produced on demand by a generator function.
///
/// Useful for callers that already hold decoded frames and for synthetic
/// test footage. The reported frame count can be set higher than the number
/// of frames actually produced to model a stream that ends early.
pub struct MemoryFrameSource {
    generator: FrameFn,
    available: u64,
    reported: u64,
    fps: f64,
    width: u32,
    height: u32,
    position: u64,
    label: String,
}

impl MemoryFrameSource {
    /// Build a source producing `frames` frames from `generator`.
    pub fn from_fn<F>(frames: u64, fps: f64, width: u32, height: u32, generator: F) -> Self
    where
        F: FnMut(u64) -> GrayImage + Send + 'static,
    {
        Self {
            generator: Box::new(generator),
            available: frames,
            reported: frames,
            fps,
            width,
            height,
            position: 0,
            label: "memory".to_string(),
        }
    }

    /// Build a source from already decoded frames.
    ///
    /// All frames must share the first frame's dimensions.
    pub fn from_frames(frames: Vec<GrayImage>, fps: f64) -> MediaResult<Self> {
        let (width, height) = frames.first().map(|f| f.dimensions()).unwrap_or((0, 0));
        if let Some(bad) = frames.iter().find(|f| f.dimensions() != (width, height)) {
            return Err(MediaError::frame_decode(format!(
                "frame size {:?} differs from {}x{}",
                bad.dimensions(),
                width,
                height
            )));
        }

        let count = frames.len() as u64;
        let mut frames = frames.into_iter();
        let blank = GrayImage::new(width, height);
        Ok(Self::from_fn(count, fps, width, height, move |_| {
            frames.next().unwrap_or_else(|| blank.clone())
        }))
    }

    /// Override the frame count reported to readers.
    pub fn with_reported_frame_count(mut self, reported: u64) -> Self {
        self.reported = reported;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl FrameSource for MemoryFrameSource {
    fn frame_count(&self) -> u64 {
        self.reported
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> MediaResult<Option<GrayImage>> {
        if self.position >= self.available {
            return Ok(None);
        }
        let image = (self.generator)(self.position);
        self.position += 1;
        Ok(Some(image))
    }

    fn skip_frame(&mut self) -> MediaResult<bool> {
        if self.position >= self.available {
            return Ok(false);
        }
        // Generators may be stateful, so skipped frames are still produced.
        let _ = (self.generator)(self.position);
        self.position += 1;
        Ok(true)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frames_yields_in_order() {
        let frames = (0..3u8)
            .map(|v| GrayImage::from_pixel(2, 2, image::Luma([v])))
            .collect();
        let mut source = MemoryFrameSource::from_frames(frames, 25.0).unwrap();

        assert_eq!(source.dimensions(), (2, 2));
        assert_eq!(source.frame_count(), 3);
        assert!(source.skip_frame().unwrap());
        assert_eq!(source.read_frame().unwrap().unwrap().get_pixel(0, 0)[0], 1);
        assert!(source.read_frame().unwrap().is_some());
        assert!(source.read_frame().unwrap().is_none());
        assert!(!source.skip_frame().unwrap());
    }

    #[test]
    fn test_from_frames_rejects_mixed_sizes() {
        let frames = vec![GrayImage::new(2, 2), GrayImage::new(3, 2)];
        assert!(MemoryFrameSource::from_frames(frames, 30.0).is_err());
    }

    #[test]
    fn test_reported_count_override() {
        let source = MemoryFrameSource::from_fn(10, 30.0, 2, 2, |_| GrayImage::new(2, 2))
            .with_reported_frame_count(300);
        assert_eq!(source.frame_count(), 300);
    }
}
