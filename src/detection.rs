use serde::Serialize;

const IOU_EPSILON: f32 = 1e-6;

/// Axis-aligned rectangle in image pixel coordinates, origin top-left.
///
/// `score` is the mean normalized similarity inside the rectangle, in [0,1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub score: f32,
}

impl Region {
    pub fn area(&self) -> f32 {
        (self.width * self.height) as f32
    }

    pub fn intersection_area(&self, other: &Region) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 > x1 && y2 > y1 {
            ((x2 - x1) * (y2 - y1)) as f32
        } else {
            0.0
        }
    }

    /// Intersection-over-union. The epsilon keeps zero-area rectangles from
    /// dividing by zero.
    pub fn iou(&self, other: &Region) -> f32 {
        let intersection = self.intersection_area(other);
        intersection / (self.area() + other.area() - intersection + IOU_EPSILON)
    }
}

/// A single litter detection. `confidence` is the category-level oracle
/// score, not the region score. A detection with no region is a valid
/// terminal state: the oracle reported the category present but no area
/// survived localization.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub category: String,
    pub confidence: f64,
    pub severity: u8,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}
