use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::shared::frame::Frame;

/// Replays a still image as a fixed number of frames.
///
/// Lets the capture loop run without a camera, e.g. to check cascade
/// settings against a photo. Each frame is a fresh copy, so overlays drawn
/// on one frame never show up on the next.
pub struct ImageFileSource {
    path: PathBuf,
    repeat: usize,
    emitted: usize,
    pixels: Option<(Vec<u8>, u32, u32)>,
}

impl ImageFileSource {
    pub fn new(path: &Path, repeat: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            repeat,
            emitted: 0,
            pixels: None,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        let img = image::open(&self.path)
            .map_err(|e| CaptureError::SourceUnavailable {
                name: self.path.display().to_string(),
                reason: e.to_string(),
            })?
            .into_rgb8();
        let (width, height) = img.dimensions();
        log::info!(
            "Loaded {} ({width}x{height}), replaying {} frame(s)",
            self.path.display(),
            self.repeat
        );
        self.pixels = Some((img.into_raw(), width, height));
        self.emitted = 0;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, CaptureError> {
        let (data, width, height) = self
            .pixels
            .as_ref()
            .ok_or_else(|| CaptureError::FrameCapture {
                frame_index: self.emitted,
                reason: "image source is not open".to_string(),
            })?;
        if self.emitted >= self.repeat {
            return Ok(None);
        }
        let frame = Frame::from_rgb(data, *width, *height, self.emitted)?;
        self.emitted += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.pixels = None;
    }
}
