// texture.rs

use anyhow::{Context, Result};
use log::debug;

use crate::color::Color;

/// Decoded texture image. Sampling takes normalized u/v in [0, 1] with the
/// origin at the bottom-left, matching the mesh's texture-coordinate space.
pub struct Texture {
    pixels: Vec<Color>,
    width: usize,
    height: usize,
}

impl Texture {
    pub fn load(path: &str) -> Result<Texture> {
        let img = image::open(path)
            .with_context(|| format!("failed to load texture {path}"))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        debug!("loaded texture {path}: {width}x{height}");
        Ok(Texture {
            pixels,
            width: width as usize,
            height: height as usize,
        })
    }

    #[cfg(test)]
    pub fn from_pixels(pixels: Vec<Color>, width: usize, height: usize) -> Texture {
        assert_eq!(pixels.len(), width * height);
        Texture { pixels, width, height }
    }

    /// Nearest-neighbour sample. Coordinates outside [0, 1] are clamped to
    /// the edge texel.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let x = (u * self.width as f32) as i64;
        // Image rows are stored top-down; v grows upward.
        let y = ((1.0 - v) * self.height as f32) as i64;
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // 2x2: top row red/green, bottom row blue/white (storage order).
        Texture::from_pixels(
            vec![
                Color::RED,
                Color::new(0, 255, 0),
                Color::new(0, 0, 255),
                Color::WHITE,
            ],
            2,
            2,
        )
    }

    #[test]
    fn sample_origin_is_bottom_left() {
        let tex = checker();
        assert_eq!(tex.sample(0.0, 0.0), Color::new(0, 0, 255));
        assert_eq!(tex.sample(0.99, 0.99), Color::new(0, 255, 0));
        assert_eq!(tex.sample(0.0, 0.99), Color::RED);
        assert_eq!(tex.sample(0.99, 0.0), Color::WHITE);
    }

    #[test]
    fn out_of_range_coordinates_clamp() {
        let tex = checker();
        assert_eq!(tex.sample(-1.0, -1.0), Color::new(0, 0, 255));
        assert_eq!(tex.sample(2.0, 2.0), Color::new(0, 255, 0));
    }
}
