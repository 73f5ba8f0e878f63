// ── Color ─────────────────────────────────────────────────────────────────────

/// RGBA color with `f32` channels in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    pub const GRAY: Self = Self([0.6, 0.6, 0.6, 1.0]);
    pub const DARK_GRAY: Self = Self([0.2, 0.2, 0.2, 1.0]);
    pub const RED: Self = Self([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Self = Self([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Self = Self([0.0, 0.0, 1.0, 1.0]);
    pub const YELLOW: Self = Self([1.0, 1.0, 0.0, 1.0]);
    pub const CYAN: Self = Self([0.0, 1.0, 1.0, 1.0]);
    pub const MAGENTA: Self = Self([1.0, 0.0, 1.0, 1.0]);
    pub const ORANGE: Self = Self([1.0, 0.55, 0.0, 1.0]);
    pub const DARK_GREEN: Self = Self([0.0, 0.35, 0.05, 1.0]);
    pub const DARK_BLUE: Self = Self([0.0, 0.1, 0.4, 1.0]);
    pub const DARK_RED: Self = Self([0.45, 0.0, 0.0, 1.0]);
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);

    /// Pack into the `0xRRGGBBAA` cell-storage form.
    pub fn pack(self) -> PackedColor {
        PackedColor::from(self)
    }
}

// ── PackedColor ───────────────────────────────────────────────────────────────

/// A color packed into a single `u32` as `0xRRGGBBAA`.
///
/// This is the form stored per grid cell and handed to the batch as a tint;
/// [`Color`] converts into it, so both forms are accepted wherever a color
/// argument is taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    pub const BLACK: Self = Self(0x0000_00FF);

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    /// Unpack to `[r, g, b, a]` with channels in `[0, 1]`.
    pub fn to_array(self) -> [f32; 4] {
        let [r, g, b, a] = self.0.to_be_bytes();
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }
}

impl From<Color> for PackedColor {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.0;
        Self::from_rgba(
            (r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (a.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

impl From<u32> for PackedColor {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_packs_to_all_ones() {
        assert_eq!(Color::WHITE.pack(), PackedColor::WHITE);
    }

    #[test]
    fn black_keeps_full_alpha() {
        assert_eq!(Color::BLACK.pack(), PackedColor(0x0000_00FF));
    }

    #[test]
    fn channel_order_is_rgba_big_endian() {
        let c = PackedColor::from_rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x1234_5678);
    }

    #[test]
    fn to_array_recovers_channels() {
        let arr = PackedColor::from_rgba(255, 0, 128, 255).to_array();
        assert_eq!(arr[0], 1.0);
        assert_eq!(arr[1], 0.0);
        assert!((arr[2] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(arr[3], 1.0);
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        let c = Color([2.0, -1.0, 0.5, 1.0]).pack();
        let [r, g, _, _] = c.0.to_be_bytes();
        assert_eq!(r, 255);
        assert_eq!(g, 0);
    }
}
