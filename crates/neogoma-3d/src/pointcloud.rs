/// A point color as `[blue, green, red]`.
pub type Bgr8 = [u8; 3];

/// The color given to points that can not be sampled.
pub const BLACK: Bgr8 = [0, 0, 0];

/// A reconstructed point in world coordinates, with its color when colorization is enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCloudRecord {
    /// The point in world coordinates.
    pub point: [f32; 3],
    /// The color of the point in blue, green, red order.
    pub color: Option<Bgr8>,
}

impl PointCloudRecord {
    /// Create a record without color.
    pub fn new(point: [f32; 3]) -> Self {
        Self { point, color: None }
    }

    /// Create a record with a color.
    pub fn with_color(point: [f32; 3], color: Bgr8) -> Self {
        Self {
            point,
            color: Some(color),
        }
    }

    /// Check if the record carries a color.
    #[inline]
    pub fn has_color(&self) -> bool {
        self.color.is_some()
    }
}
