//! OpenCV `VideoCapture` frame source.

use image::GrayImage;
use opencv::{
    core::{AlgorithmHint, Mat},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::{Path, PathBuf};

use super::FrameSource;
use crate::error::{MediaError, MediaResult};

/// Frame source backed by OpenCV's video decoder.
pub struct OpenCvFrameSource {
    path: PathBuf,
    cap: VideoCapture,
    frame_count: u64,
    fps: f64,
    width: u32,
    height: u32,
}

impl OpenCvFrameSource {
    pub fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();
        let path_str = path
            .to_str()
            .ok_or_else(|| MediaError::source_unavailable(&path, "path is not valid UTF-8"))?;

        let cap = VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .map_err(|e| MediaError::source_unavailable(&path, format!("Open video: {e}")))?;
        if !cap.is_opened().unwrap_or(false) {
            return Err(MediaError::source_unavailable(&path, "VideoCapture failed to open"));
        }

        let prop = |id: i32| cap.get(id).unwrap_or(0.0);
        let frame_count = prop(videoio::CAP_PROP_FRAME_COUNT).max(0.0) as u64;
        let fps = prop(videoio::CAP_PROP_FPS);
        let width = prop(videoio::CAP_PROP_FRAME_WIDTH).max(0.0) as u32;
        let height = prop(videoio::CAP_PROP_FRAME_HEIGHT).max(0.0) as u32;

        Ok(Self {
            path,
            cap,
            frame_count,
            fps,
            width,
            height,
        })
    }

    fn to_gray(&self, frame: &Mat) -> MediaResult<GrayImage> {
        let mut gray = Mat::default();
        if frame.channels() == 3 {
            imgproc::cvt_color(
                frame,
                &mut gray,
                imgproc::COLOR_BGR2GRAY,
                0,
                AlgorithmHint::ALGO_HINT_DEFAULT,
            )
            .map_err(|e| MediaError::frame_decode(format!("bgr2gray: {e}")))?;
        } else {
            gray = frame.try_clone().map_err(|e| MediaError::frame_decode(e.to_string()))?;
        }

        let cols = gray.cols().max(0) as u32;
        let rows = gray.rows().max(0) as u32;
        let bytes = gray
            .data_bytes()
            .map_err(|e| MediaError::frame_decode(format!("frame bytes: {e}")))?;
        GrayImage::from_raw(cols, rows, bytes.to_vec())
            .ok_or_else(|| MediaError::frame_decode("gray frame buffer size mismatch"))
    }
}

impl FrameSource for OpenCvFrameSource {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> MediaResult<Option<GrayImage>> {
        let mut frame = Mat::default();
        let ok = self
            .cap
            .read(&mut frame)
            .map_err(|e| MediaError::frame_decode(format!("Read: {e}")))?;
        if !ok || frame.empty() {
            return Ok(None);
        }
        self.to_gray(&frame).map(Some)
    }

    fn skip_frame(&mut self) -> MediaResult<bool> {
        self.cap
            .grab()
            .map_err(|e| MediaError::frame_decode(format!("Grab: {e}")))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for OpenCvFrameSource {
    fn drop(&mut self) {
        let _ = self.cap.release();
    }
}
