use std::path::{Path, PathBuf};

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::object_classifier::ObjectClassifier;
use crate::shared::region::Region;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("cascade file not found: {0}")]
    NotFound(PathBuf),
    #[error("cascade path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),
    #[error("failed to load cascade {path}: {source}")]
    Backend {
        path: PathBuf,
        #[source]
        source: opencv::Error,
    },
    #[error("{0} is not a valid cascade classifier file")]
    Empty(PathBuf),
}

/// Multi-scale detection settings passed straight to OpenCV.
///
/// A zero `max_size` means "no upper bound".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    pub flags: i32,
    pub min_size: [i32; 2],
    pub max_size: [i32; 2],
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 3,
            flags: 0,
            min_size: [0, 0],
            max_size: [0, 0],
        }
    }
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.scale_factor <= 1.0 {
            return Err(format!(
                "scale_factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if self.min_neighbors < 0 {
            return Err(format!(
                "min_neighbors must be non-negative, got {}",
                self.min_neighbors
            ));
        }
        if self.min_size.iter().chain(&self.max_size).any(|&v| v < 0) {
            return Err("min_size and max_size must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Haar/LBP cascade backed by OpenCV's `CascadeClassifier`.
///
/// The model is validated when loaded, so a bad path surfaces here rather
/// than on the first detection call.
pub struct CascadeObjectClassifier {
    classifier: CascadeClassifier,
    params: DetectionParams,
    path: PathBuf,
}

impl CascadeObjectClassifier {
    pub fn load(path: &Path, params: DetectionParams) -> Result<Self, ModelLoadError> {
        if !path.is_file() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| ModelLoadError::InvalidPath(path.to_path_buf()))?;

        let classifier =
            CascadeClassifier::new(path_str).map_err(|source| ModelLoadError::Backend {
                path: path.to_path_buf(),
                source,
            })?;

        let empty = classifier
            .empty()
            .map_err(|source| ModelLoadError::Backend {
                path: path.to_path_buf(),
                source,
            })?;
        if empty {
            return Err(ModelLoadError::Empty(path.to_path_buf()));
        }

        log::debug!("Loaded cascade {}", path.display());
        Ok(Self {
            classifier,
            params,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObjectClassifier for CascadeObjectClassifier {
    fn detect(&mut self, image: &Mat) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let mut found: Vector<Rect> = Vector::new();
        self.classifier.detect_multi_scale(
            image,
            &mut found,
            self.params.scale_factor,
            self.params.min_neighbors,
            self.params.flags,
            Size::new(self.params.min_size[0], self.params.min_size[1]),
            Size::new(self.params.max_size[0], self.params.max_size[1]),
        )?;
        Ok(found.iter().map(Region::from).collect())
    }
}
