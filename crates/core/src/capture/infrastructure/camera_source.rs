use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::shared::frame::Frame;

/// Webcam frames through OpenCV's `VideoCapture`.
///
/// The device is released on `release()` and again on drop, so every exit
/// path of the capture loop gives the camera back.
pub struct CameraSource {
    index: i32,
    capture: Option<VideoCapture>,
    frames_read: usize,
}

impl CameraSource {
    pub fn new(index: i32) -> Self {
        Self {
            index,
            capture: None,
            frames_read: 0,
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn is_open(&self) -> bool {
        self.capture.is_some()
    }
}

impl FrameSource for CameraSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        let capture = match VideoCapture::new(self.index, videoio::CAP_ANY) {
            Ok(capture) => capture,
            Err(e) => {
                log::debug!("VideoCapture({}) failed: {e}", self.index);
                return Err(CaptureError::DeviceUnavailable { index: self.index });
            }
        };
        ensure_opened(capture.is_opened(), self.index)?;
        log::info!("Opened capture device {}", self.index);
        self.capture = Some(capture);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, CaptureError> {
        let frame_index = self.frames_read;
        let capture = self
            .capture
            .as_mut()
            .ok_or_else(|| CaptureError::FrameCapture {
                frame_index,
                reason: "device is not open".to_string(),
            })?;

        let mut mat = Mat::default();
        if !capture.read(&mut mat)? {
            return Err(CaptureError::FrameCapture {
                frame_index,
                reason: "device returned no frame".to_string(),
            });
        }
        if mat.empty() {
            return Err(CaptureError::FrameCapture {
                frame_index,
                reason: "frame is empty".to_string(),
            });
        }

        self.frames_read += 1;
        Ok(Some(Frame::new(mat, frame_index)))
    }

    fn release(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            match capture.release() {
                Ok(()) => log::info!("Released capture device {}", self.index),
                Err(e) => log::warn!("Failed to release capture device {}: {e}", self.index),
            }
        }
    }
}

/// A backend error while checking the device counts as the device being
/// unavailable, same as a closed handle.
fn ensure_opened(opened: opencv::Result<bool>, index: i32) -> Result<(), CaptureError> {
    match opened {
        Ok(true) => Ok(()),
        Ok(false) => Err(CaptureError::DeviceUnavailable { index }),
        Err(e) => {
            log::debug!("VideoCapture({index}).is_opened() failed: {e}");
            Err(CaptureError::DeviceUnavailable { index })
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_open_is_capture_failure() {
        let mut source = CameraSource::new(0);
        match source.read() {
            Err(CaptureError::FrameCapture { frame_index, .. }) => assert_eq!(frame_index, 0),
            other => panic!("expected FrameCapture, got {other:?}"),
        }
    }

    #[test]
    fn test_is_opened_error_is_device_unavailable() {
        let failed = Err(opencv::Error::new(opencv::core::StsError, "backend gone"));
        assert!(matches!(
            ensure_opened(failed, 2),
            Err(CaptureError::DeviceUnavailable { index: 2 })
        ));
    }

    #[test]
    fn test_closed_handle_is_device_unavailable() {
        assert!(matches!(
            ensure_opened(Ok(false), 0),
            Err(CaptureError::DeviceUnavailable { index: 0 })
        ));
        assert!(ensure_opened(Ok(true), 0).is_ok());
    }

    #[test]
    fn test_release_without_open_is_noop() {
        let mut source = CameraSource::new(3);
        source.release();
        source.release();
        assert!(!source.is_open());
        assert_eq!(source.index(), 3);
    }
}
