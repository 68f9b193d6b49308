/// Viewport size in logical pixels.
///
/// Uploaded to the batch shader as the basis for the pixel → NDC mapping.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Logical viewport of a drawable `width` x `height` physical pixels at `scale_factor`.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Self::new(width as f32, height as f32);
        }
        Self::new(
            (width as f64 / scale_factor) as f32,
            (height as f64 / scale_factor) as f32,
        )
    }

    /// A minimized window reports zero size; nothing can be drawn into it.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}
