use opencv::core::Rect;

/// Overlap above which a detection counts as matching a ground-truth box.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.3;

/// An axis-aligned detection rectangle in pixel coordinates.
///
/// Regions carry no identity across frames; they are recomputed every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }

    /// Moves a region from a sub-image's coordinate space into its parent's,
    /// given the sub-image origin `(origin_x, origin_y)`.
    pub fn translated(&self, origin_x: i32, origin_y: i32) -> Region {
        Region {
            x: self.x + origin_x,
            y: self.y + origin_y,
            ..*self
        }
    }

    /// Intersects the region with `[0, width) x [0, height)`.
    ///
    /// Returns `None` when nothing of the region is left inside the bounds.
    pub fn clamped(&self, width: i32, height: i32) -> Option<Region> {
        let x1 = self.x.clamp(0, width);
        let y1 = self.y.clamp(0, height);
        let x2 = (self.x + self.width).clamp(0, width);
        let y2 = (self.y + self.height).clamp(0, height);
        let clamped = Region::new(x1, y1, x2 - x1, y2 - y1);
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }

    pub fn fits_within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x + self.width <= width && self.y + self.height <= height
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::new(rect.x, rect.y, rect.width, rect.height)
    }
}

impl From<Region> for Rect {
    fn from(region: Region) -> Self {
        Rect::new(region.x, region.y, region.width, region.height)
    }
}
