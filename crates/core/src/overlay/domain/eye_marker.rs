use crate::shared::region::Region;

/// Circle drawn over one detected eye, in full-frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EyeMarker {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: i32,
}

impl EyeMarker {
    /// Builds the marker for an eye found inside `face`'s crop.
    ///
    /// The center uses integer halves of the eye size; the radius is a
    /// quarter of width plus height, rounded half away from zero.
    pub fn from_face_local(face: &Region, eye: &Region) -> Self {
        let global = eye.translated(face.x, face.y);
        Self {
            center_x: global.x + global.width / 2,
            center_y: global.y + global.height / 2,
            radius: ((global.width + global.height) as f64 * 0.25).round() as i32,
        }
    }
}
