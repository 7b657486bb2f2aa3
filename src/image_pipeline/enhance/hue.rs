/// Reference hue of the blue band, in degrees.
pub const BLUE_HUE: f32 = 180.0;
/// Reference hue of the green band, in degrees.
pub const GREEN_HUE: f32 = 90.0;

const BAND_WIDTH: f32 = 1000.0;

/// Selective hue rotation of the blue and green bands plus a global
/// saturation gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueShift {
    pub blues: f32,
    pub greens: f32,
    pub saturation: f32,
}

impl HueShift {
    #[inline]
    fn band(hue: f32, center: f32) -> f32 {
        let d = hue - center;
        (-(d * d) / BAND_WIDTH).exp()
    }

    /// Shifts `[h, s, v]` (hue in degrees). The hue is left unwrapped.
    #[inline]
    pub fn apply(&self, [h, s, v]: [f32; 3]) -> [f32; 3] {
        let h = h + self.blues * Self::band(h, BLUE_HUE) + self.greens * Self::band(h, GREEN_HUE);
        [h, (s * self.saturation).clamp(0.0, 1.0), v]
    }
}

impl Default for HueShift {
    fn default() -> Self {
        Self {
            blues: 0.0,
            greens: 0.0,
            saturation: 1.0,
        }
    }
}
