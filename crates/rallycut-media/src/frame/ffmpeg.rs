//! FFmpeg rawvideo pipe frame source.

use image::GrayImage;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, warn};

use super::FrameSource;
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video_blocking, VideoInfo};

/// Decodes a video file to 8-bit gray frames through `ffmpeg`.
///
/// The child process is killed and reaped when the source is dropped.
pub struct FfmpegFrameSource {
    path: PathBuf,
    info: VideoInfo,
    child: Child,
    stdout: BufReader<ChildStdout>,
    frame_bytes: usize,
    buf: Vec<u8>,
}

impl FfmpegFrameSource {
    /// Probe and open `path` for sequential decoding.
    ///
    /// Any failure to open is reported as [`MediaError::SourceUnavailable`].
    pub fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();

        let info = probe_video_blocking(&path)
            .map_err(|e| MediaError::source_unavailable(&path, e.to_string()))?;
        if info.width == 0 || info.height == 0 {
            return Err(MediaError::source_unavailable(
                &path,
                "video stream has no dimensions",
            ));
        }

        which::which("ffmpeg")
            .map_err(|_| MediaError::source_unavailable(&path, "FFmpeg not found in PATH"))?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(&path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "gray", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MediaError::source_unavailable(&path, e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::source_unavailable(&path, "stdout not captured"))?;

        let frame_bytes = info.width as usize * info.height as usize;
        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frames = info.frame_count,
            "Opened FFmpeg frame source"
        );

        Ok(Self {
            path,
            info,
            child,
            stdout: BufReader::new(stdout),
            frame_bytes,
            buf: vec![0u8; frame_bytes],
        })
    }

    /// Probed information about the video.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Fill the frame buffer. `false` means the stream ended.
    fn fill_buffer(&mut self) -> MediaResult<bool> {
        match self.stdout.read_exact(&mut self.buf) {
            Ok(()) => Ok(true),
            // A partial trailing frame is treated as end of stream
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl FrameSource for FfmpegFrameSource {
    fn frame_count(&self) -> u64 {
        self.info.frame_count
    }

    fn fps(&self) -> f64 {
        self.info.fps
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn read_frame(&mut self) -> MediaResult<Option<GrayImage>> {
        if !self.fill_buffer()? {
            return Ok(None);
        }
        let image = GrayImage::from_raw(self.info.width, self.info.height, self.buf.clone())
            .ok_or_else(|| {
                MediaError::frame_decode(format!("short frame buffer ({} bytes)", self.frame_bytes))
            })?;
        Ok(Some(image))
    }

    fn skip_frame(&mut self) -> MediaResult<bool> {
        self.fill_buffer()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                warn!(path = %self.path.display(), "Failed to kill FFmpeg decoder: {}", e);
            }
        }
        let _ = self.child.wait();
    }
}
