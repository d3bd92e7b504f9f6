use opencv::core::{Point, Scalar};
use opencv::imgproc;

use crate::overlay::domain::eye_marker::EyeMarker;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Stroke colour and width for one kind of overlay, BGR order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub bgr: (f64, f64, f64),
    pub thickness: i32,
}

impl Stroke {
    fn scalar(&self) -> Scalar {
        Scalar::new(self.bgr.0, self.bgr.1, self.bgr.2, 0.0)
    }
}

pub const FACE_STROKE: Stroke = Stroke {
    bgr: (0.0, 0.0, 255.0),
    thickness: 2,
};

pub const EYE_STROKE: Stroke = Stroke {
    bgr: (255.0, 0.0, 0.0),
    thickness: 4,
};

/// Red rectangles around faces, blue circles over eyes.
pub struct OpencvOverlayRenderer {
    face: Stroke,
    eye: Stroke,
}

impl OpencvOverlayRenderer {
    pub fn new(face: Stroke, eye: Stroke) -> Self {
        Self { face, eye }
    }
}

impl Default for OpencvOverlayRenderer {
    fn default() -> Self {
        Self::new(FACE_STROKE, EYE_STROKE)
    }
}

impl OverlayRenderer for OpencvOverlayRenderer {
    fn draw_face(
        &self,
        frame: &mut Frame,
        face: &Region,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Far corner is exclusive of the region, one past its last pixel.
        imgproc::rectangle_points(
            frame.mat_mut(),
            Point::new(face.x, face.y),
            Point::new(face.x + face.width, face.y + face.height),
            self.face.scalar(),
            self.face.thickness,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }

    fn draw_eye(
        &self,
        frame: &mut Frame,
        marker: &EyeMarker,
    ) -> Result<(), Box<dyn std::error::Error>> {
        imgproc::circle(
            frame.mat_mut(),
            Point::new(marker.center_x, marker.center_y),
            marker.radius,
            self.eye.scalar(),
            self.eye.thickness,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_frame(width: u32, height: u32) -> Frame {
        Frame::from_rgb(&vec![0u8; (width * height * 3) as usize], width, height, 0).unwrap()
    }

    fn bgr_at(frame: &Frame, x: usize, y: usize) -> (u8, u8, u8) {
        let px = frame.as_ndarray().unwrap();
        (px[[y, x, 0]], px[[y, x, 1]], px[[y, x, 2]])
    }

    #[test]
    fn test_face_rectangle_is_red_on_border_only() {
        let renderer = OpencvOverlayRenderer::default();
        let mut frame = black_frame(50, 50);
        renderer
            .draw_face(&mut frame, &Region::new(10, 10, 20, 20))
            .unwrap();

        assert_eq!(bgr_at(&frame, 10, 20), (0, 0, 255));
        assert_eq!(bgr_at(&frame, 20, 20), (0, 0, 0));
        assert_eq!(bgr_at(&frame, 45, 45), (0, 0, 0));
    }

    #[test]
    fn test_face_rectangle_reaches_far_corner() {
        let thin = Stroke {
            bgr: (0.0, 0.0, 255.0),
            thickness: 1,
        };
        let renderer = OpencvOverlayRenderer::new(thin, EYE_STROKE);
        let mut frame = black_frame(50, 50);
        renderer
            .draw_face(&mut frame, &Region::new(10, 10, 20, 20))
            .unwrap();

        assert_eq!(bgr_at(&frame, 30, 20), (0, 0, 255));
        assert_eq!(bgr_at(&frame, 20, 30), (0, 0, 255));
        assert_eq!(bgr_at(&frame, 30, 30), (0, 0, 255));
        assert_eq!(bgr_at(&frame, 29, 20), (0, 0, 0));
    }

    #[test]
    fn test_eye_circle_is_blue_on_ring() {
        let renderer = OpencvOverlayRenderer::default();
        let mut frame = black_frame(100, 100);
        let marker = EyeMarker {
            center_x: 45,
            center_y: 45,
            radius: 15,
        };
        renderer.draw_eye(&mut frame, &marker).unwrap();

        assert_eq!(bgr_at(&frame, 60, 45), (255, 0, 0));
        assert_eq!(bgr_at(&frame, 45, 45), (0, 0, 0));
    }

    #[test]
    fn test_default_strokes() {
        assert_eq!(FACE_STROKE.thickness, 2);
        assert_eq!(EYE_STROKE.thickness, 4);
        assert_eq!(FACE_STROKE.bgr, (0.0, 0.0, 255.0));
        assert_eq!(EYE_STROKE.bgr, (255.0, 0.0, 0.0));
    }
}
