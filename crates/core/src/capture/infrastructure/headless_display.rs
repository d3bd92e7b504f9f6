use crate::capture::domain::frame_display::FrameDisplay;
use crate::shared::frame::Frame;

/// Display that shows nothing and never sees a key press.
///
/// Used for runs without a window system; detections still go to the log.
#[derive(Default)]
pub struct HeadlessDisplay {
    frames_shown: usize,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }
}

impl FrameDisplay for HeadlessDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.frames_shown += 1;
        log::trace!(
            "Frame {} ({}x{}) rendered headless",
            frame.index(),
            frame.width(),
            frame.height()
        );
        Ok(())
    }

    fn poll_key(&mut self, _timeout_ms: i32) -> Result<Option<i32>, Box<dyn std::error::Error>> {
        Ok(None)
    }

    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Mat;

    #[test]
    fn test_counts_frames_and_reports_no_keys() {
        let mut display = HeadlessDisplay::new();
        display.show(&Frame::new(Mat::default(), 0)).unwrap();
        display.show(&Frame::new(Mat::default(), 1)).unwrap();
        assert_eq!(display.frames_shown(), 2);
        assert_eq!(display.poll_key(10).unwrap(), None);
        display.close();
    }
}
