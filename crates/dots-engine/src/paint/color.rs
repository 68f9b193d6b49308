/// Straight RGB color with components normalized to `[0, 1]`.
///
/// Every vertex path (triangles, lines, line loops) stores colors in this range;
/// byte colors are converted once at construction.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_rgb_const(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::from_rgb_const(0.0, 0.0, 0.0);
    pub const RED: Color = Color::from_rgb_const(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::from_rgb_const(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::from_rgb_const(0.0, 0.0, 1.0);

    const fn from_rgb_const(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from `f32` components; out-of-range values are clamped.
    #[inline]
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Creates a color from `0`–`255` channel bytes.
    #[inline]
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Decodes the sRGB-encoded components to linear light.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self {
            r: decode(self.r),
            g: decode(self.g),
            b: decode(self.b),
        }
    }
}
