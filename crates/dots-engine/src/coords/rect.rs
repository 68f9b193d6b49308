use super::Vec2;

/// Axis-aligned rectangle: `origin` is the bottom-left corner, `size` the extents.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Builds a rect from its center and full extents.
    #[inline]
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        let size = Vec2::new(width, height);
        Self {
            origin: center - size * 0.5,
            size,
        }
    }

    /// Bottom-left corner.
    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    /// Top-right corner.
    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Returns this rect in a normalized space where `extent` maps to `1.0`.
    ///
    /// Used to turn a pixel region of a texture into texture coordinates.
    #[inline]
    pub fn scaled_into(self, extent: Vec2) -> Self {
        let sx = if extent.x != 0.0 { 1.0 / extent.x } else { 0.0 };
        let sy = if extent.y != 0.0 { 1.0 / extent.y } else { 0.0 };
        Self {
            origin: Vec2::new(self.origin.x * sx, self.origin.y * sy),
            size: Vec2::new(self.size.x * sx, self.size.y * sy),
        }
    }
}
