use opencv::core::Mat;

use crate::shared::region::Region;

/// Domain interface for a loaded object model.
///
/// Given an image, returns the bounding boxes of every detected object in
/// that image's own coordinate space. Implementations may keep scratch
/// state inside the native library, hence `&mut self`.
pub trait ObjectClassifier {
    fn detect(&mut self, image: &Mat) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
