/// Linear RGBA in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);
    pub const CYAN: Color = Color([0.0, 1.0, 1.0, 1.0]);

    pub const fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Color([r, g, b, alpha])
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_css_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Some(Color([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }
}

/// A screen-sized point marker with an outline ring.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: Color,
    pub pixel_size: f32,
    pub outline_color: Color,
    pub outline_width: f32,
}

impl MarkerStyle {
    pub const fn new(
        color: Color,
        pixel_size: f32,
        outline_color: Color,
        outline_width: f32,
    ) -> Self {
        Self {
            color,
            pixel_size,
            outline_color,
            outline_width,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width_px: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::CYAN.with_alpha(0.5),
            width_px: 5.0,
        }
    }
}
