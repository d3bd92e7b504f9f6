use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("cannot open capture device {index}")]
    DeviceUnavailable { index: i32 },
    #[error("cannot open {name}: {reason}")]
    SourceUnavailable { name: String, reason: String },
    #[error("frame {frame_index} could not be captured: {reason}")]
    FrameCapture { frame_index: usize, reason: String },
    #[error(transparent)]
    Backend(#[from] opencv::Error),
}

/// Produces frames from a camera or another live source.
///
/// `read` returning `Ok(None)` means a finite source is exhausted; a camera
/// never does that and reports a failed grab as `FrameCapture` instead.
pub trait FrameSource {
    /// Acquires the underlying device. Must succeed before `read`.
    fn open(&mut self) -> Result<(), CaptureError>;

    fn read(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Releases the device. Safe to call more than once, and after a
    /// failed `open`.
    fn release(&mut self);
}
