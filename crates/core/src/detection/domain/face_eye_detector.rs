use opencv::core::{Mat, Rect};
use opencv::imgproc;
use opencv::prelude::*;
use serde::{Deserialize, Serialize};

use crate::detection::domain::object_classifier::ObjectClassifier;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Which image the face classifier is run on.
///
/// The staging buffer is equalized grayscale either way; eyes are always
/// detected on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceInput {
    /// The untouched camera frame.
    #[default]
    Color,
    /// The equalized grayscale staging buffer.
    Equalized,
}

/// Result of one face pass: the faces found plus the grayscale staging
/// buffer that eye detection crops from.
///
/// The buffer belongs to this scan only, so nothing leaks between frames.
pub struct FaceScan {
    pub faces: Vec<Region>,
    stage: Mat,
}

impl FaceScan {
    pub fn stage(&self) -> &Mat {
        &self.stage
    }

    /// Copies the staging buffer under `face` into its own matrix.
    ///
    /// The face is clamped to the buffer first; a face entirely outside
    /// yields an error from OpenCV.
    pub fn face_roi(&self, face: &Region) -> opencv::Result<Mat> {
        let bounded = face
            .clamped(self.stage.cols(), self.stage.rows())
            .unwrap_or(*face);
        Mat::roi(&self.stage, Rect::from(bounded))?.try_clone()
    }
}

/// Two-stage detector: faces on the whole frame, then eyes inside each face.
pub struct FaceEyeDetector {
    face_classifier: Box<dyn ObjectClassifier>,
    eye_classifier: Box<dyn ObjectClassifier>,
    face_input: FaceInput,
}

impl FaceEyeDetector {
    pub fn new(
        face_classifier: Box<dyn ObjectClassifier>,
        eye_classifier: Box<dyn ObjectClassifier>,
        face_input: FaceInput,
    ) -> Self {
        Self {
            face_classifier,
            eye_classifier,
            face_input,
        }
    }

    pub fn detect_faces(&mut self, frame: &Frame) -> Result<FaceScan, Box<dyn std::error::Error>> {
        let stage = equalized_gray(frame.mat())?;

        let raw = match self.face_input {
            FaceInput::Color => self.face_classifier.detect(frame.mat())?,
            FaceInput::Equalized => self.face_classifier.detect(&stage)?,
        };
        let faces = raw
            .iter()
            .filter_map(|r| r.clamped(frame.width(), frame.height()))
            .collect();

        Ok(FaceScan { faces, stage })
    }

    /// Detects eyes inside a face crop. Results are local to the crop and
    /// always lie within it.
    pub fn detect_eyes(
        &mut self,
        face_roi: &Mat,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let (w, h) = (face_roi.cols(), face_roi.rows());
        Ok(self
            .eye_classifier
            .detect(face_roi)?
            .iter()
            .filter_map(|r| r.clamped(w, h))
            .collect())
    }
}

fn equalized_gray(src: &Mat) -> opencv::Result<Mat> {
    let mut gray = Mat::default();
    if src.channels() == 1 {
        src.copy_to(&mut gray)?;
    } else {
        imgproc::cvt_color_def(src, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    }
    let mut equalized = Mat::default();
    imgproc::equalize_hist(&gray, &mut equalized)?;
    Ok(equalized)
}
