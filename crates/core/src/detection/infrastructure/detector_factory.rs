use std::path::Path;

use crate::detection::domain::face_eye_detector::{FaceEyeDetector, FaceInput};

use super::cascade_classifier::{CascadeObjectClassifier, DetectionParams, ModelLoadError};

/// Everything needed to build a [`FaceEyeDetector`] besides the model files.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DetectorSettings {
    pub face_params: DetectionParams,
    pub eye_params: DetectionParams,
    pub face_input: FaceInput,
}

/// Loads the face and eye cascades and wires them into a detector.
///
/// Both models are validated here; the face model is loaded first, so a bad
/// face path is reported even if the eye path is bad too.
pub fn create_detector(
    face_path: &Path,
    eye_path: &Path,
    settings: &DetectorSettings,
) -> Result<FaceEyeDetector, ModelLoadError> {
    let face = CascadeObjectClassifier::load(face_path, settings.face_params)?;
    let eyes = CascadeObjectClassifier::load(eye_path, settings.eye_params)?;
    log::info!(
        "Using face cascade {} and eye cascade {} (faces on {:?} input)",
        face.path().display(),
        eyes.path().display(),
        settings.face_input
    );
    Ok(FaceEyeDetector::new(
        Box::new(face),
        Box::new(eyes),
        settings.face_input,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_face_cascade_reported_first() {
        let tmp = TempDir::new().unwrap();
        let face = tmp.path().join("face.xml");
        let eye = tmp.path().join("eye.xml");

        match create_detector(&face, &eye, &DetectorSettings::default()) {
            Err(ModelLoadError::NotFound(p)) => assert_eq!(p, face),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_invalid_face_cascade_fails_before_eyes() {
        let tmp = TempDir::new().unwrap();
        let face = tmp.path().join("face.xml");
        fs::write(&face, b"not xml at all").unwrap();
        let eye = tmp.path().join("missing_eye.xml");

        let err = create_detector(&face, &eye, &DetectorSettings::default())
            .err()
            .unwrap();
        assert!(!matches!(err, ModelLoadError::NotFound(ref p) if *p == eye));
    }

    #[test]
    fn test_default_settings_keep_color_input() {
        assert_eq!(DetectorSettings::default().face_input, FaceInput::Color);
    }

    /// Set FACECAM_FIXTURE_IMAGE to a portrait and FACECAM_FIXTURE_FACE to
    /// its annotated face box as `x,y,w,h`.
    #[test]
    #[ignore] // Requires cascade download and an annotated fixture image
    fn test_real_cascades_find_annotated_face() {
        use crate::detection::infrastructure::model_resolver::{resolve, CascadeSource};
        use crate::shared::constants::*;
        use crate::shared::frame::Frame;
        use crate::shared::region::{Region, DEFAULT_IOU_THRESHOLD};

        let cascade = |name: &str, url: &str| {
            let source = CascadeSource {
                explicit: None,
                name,
                url,
                bundled_dir: None,
            };
            resolve(&source, None).expect("Failed to resolve cascade")
        };
        let face_path = cascade(FACE_CASCADE_NAME, FACE_CASCADE_URL);
        let eye_path = cascade(EYE_CASCADE_NAME, EYE_CASCADE_URL);
        let mut detector =
            create_detector(&face_path, &eye_path, &DetectorSettings::default()).unwrap();

        let image_path = std::env::var("FACECAM_FIXTURE_IMAGE").expect("FACECAM_FIXTURE_IMAGE");
        let coords: Vec<i32> = std::env::var("FACECAM_FIXTURE_FACE")
            .expect("FACECAM_FIXTURE_FACE")
            .split(',')
            .map(|v| v.trim().parse().unwrap())
            .collect();
        let expected = Region::new(coords[0], coords[1], coords[2], coords[3]);

        let rgb = image::open(&image_path).unwrap().into_rgb8();
        let frame = Frame::from_rgb(rgb.as_raw(), rgb.width(), rgb.height(), 0).unwrap();
        let scan = detector.detect_faces(&frame).unwrap();

        let best = scan
            .faces
            .iter()
            .map(|f| f.iou(&expected))
            .fold(0.0, f64::max);
        assert!(
            best >= DEFAULT_IOU_THRESHOLD,
            "best IoU {best:.2} below {DEFAULT_IOU_THRESHOLD} for {:?}",
            scan.faces
        );
    }
}
