// color.rs

use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_float(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: (r.clamp(0.0, 1.0) * 255.0) as u8,
            g: (g.clamp(0.0, 1.0) * 255.0) as u8,
            b: (b.clamp(0.0, 1.0) * 255.0) as u8,
        }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

}

impl Mul<f32> for Color {
    type Output = Color;
    fn mul(self, s: f32) -> Color {
        Color {
            r: (self.r as f32 * s).clamp(0.0, 255.0) as u8,
            g: (self.g as f32 * s).clamp(0.0, 255.0) as u8,
            b: (self.b as f32 * s).clamp(0.0, 255.0) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let c = Color::new(0x12, 0x34, 0x56);
        assert_eq!(c.to_hex(), 0x123456);
        assert_eq!(Color::from_hex(0x123456), c);
    }

    #[test]
    fn intensity_scaling_clamps() {
        assert_eq!(Color::new(100, 200, 50) * 0.5, Color::new(50, 100, 25));
        assert_eq!(Color::new(200, 200, 200) * 2.0, Color::new(255, 255, 255));
        assert_eq!(Color::WHITE * 0.0, Color::new(0, 0, 0));
    }
}
