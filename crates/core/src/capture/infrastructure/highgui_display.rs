use opencv::highgui;

use crate::capture::domain::frame_display::FrameDisplay;
use crate::shared::frame::Frame;

/// OpenCV HighGUI window. Created on the first frame, destroyed on close.
pub struct HighguiDisplay {
    title: String,
    window_open: bool,
}

impl HighguiDisplay {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            window_open: false,
        }
    }
}

impl FrameDisplay for HighguiDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if !self.window_open {
            highgui::named_window(&self.title, highgui::WINDOW_AUTOSIZE)?;
            self.window_open = true;
        }
        highgui::imshow(&self.title, frame.mat())?;
        Ok(())
    }

    fn poll_key(&mut self, timeout_ms: i32) -> Result<Option<i32>, Box<dyn std::error::Error>> {
        let key = highgui::wait_key(timeout_ms)?;
        // Some backends set modifier flags above the low byte.
        Ok((key >= 0).then_some(key & 0xFF))
    }

    fn close(&mut self) {
        if self.window_open {
            if let Err(e) = highgui::destroy_window(&self.title) {
                log::debug!("Failed to destroy window '{}': {e}", self.title);
            }
            self.window_open = false;
        }
    }
}

impl Drop for HighguiDisplay {
    fn drop(&mut self) {
        self.close();
    }
}
