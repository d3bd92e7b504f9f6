use crate::overlay::domain::eye_marker::EyeMarker;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Draws detection results onto a frame in place.
pub trait OverlayRenderer {
    fn draw_face(&self, frame: &mut Frame, face: &Region) -> Result<(), Box<dyn std::error::Error>>;

    fn draw_eye(&self, frame: &mut Frame, marker: &EyeMarker)
        -> Result<(), Box<dyn std::error::Error>>;
}
