// framebuffer.rs

use crate::color::Color;

/// Output raster. Pixels are packed 0xRRGGBB (alpha is attached when the
/// buffer is handed to the image encoder). The origin is the bottom-left
/// corner during rendering; call `flip_vertically` before encoding so the
/// saved image has the conventional top-left origin.
pub struct Framebuffer {
    pub buffer: Vec<u32>,
    pub width: usize,
    pub height: usize,
    background_color: u32,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            buffer: vec![0; width * height],
            width,
            height,
            background_color: 0,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.fill(self.background_color);
    }

    pub fn set_background_color(&mut self, color: u32) {
        self.background_color = color;
    }

    pub fn point(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.buffer[y * self.width + x] = color.to_hex();
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(Color::from_hex(self.buffer[y * self.width + x]))
        } else {
            None
        }
    }

    pub fn flip_vertically(&mut self) {
        let w = self.width;
        for y in 0..self.height / 2 {
            let opposite = self.height - 1 - y;
            for x in 0..w {
                self.buffer.swap(y * w + x, opposite * w + x);
            }
        }
    }

    /// Expand to RGBA bytes for the image encoder (alpha fixed at 255).
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.buffer.len() * 4);
        for &px in &self.buffer {
            bytes.push(((px >> 16) & 0xff) as u8);
            bytes.push(((px >> 8) & 0xff) as u8);
            bytes.push((px & 0xff) as u8);
            bytes.push(0xff);
        }
        bytes
    }
}

/// Per-pixel depth record, transient for one render pass. Stored values only
/// ever increase: larger depth means nearer to the camera under the
/// projection convention used by the transform pipeline.
pub struct DepthBuffer {
    depths: Vec<f32>,
    width: usize,
    height: usize,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        DepthBuffer {
            depths: vec![f32::NEG_INFINITY; width * height],
            width,
            height,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.depths[y * self.width + x]
    }

    /// Strict depth test: accept and record the fragment only if it is
    /// nearer than everything seen at this pixel so far.
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32) -> bool {
        debug_assert!(x < self.width && y < self.height);
        let index = y * self.width + x;
        if depth > self.depths[index] {
            self.depths[index] = depth;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_writes_and_ignores_out_of_bounds() {
        let mut fb = Framebuffer::new(4, 4);
        fb.point(1, 2, Color::RED);
        assert_eq!(fb.get(1, 2), Some(Color::RED));
        fb.point(10, 10, Color::WHITE); // silently dropped
        assert_eq!(fb.get(10, 10), None);
    }

    #[test]
    fn flip_swaps_rows() {
        let mut fb = Framebuffer::new(2, 3);
        fb.point(0, 0, Color::RED);
        fb.point(1, 2, Color::WHITE);
        fb.flip_vertically();
        assert_eq!(fb.get(0, 2), Some(Color::RED));
        assert_eq!(fb.get(1, 0), Some(Color::WHITE));
        assert_eq!(fb.get(0, 0), Some(Color::new(0, 0, 0)));
    }

    #[test]
    fn depth_only_increases() {
        let mut zb = DepthBuffer::new(4, 4);
        assert_eq!(zb.get(2, 2), f32::NEG_INFINITY);
        assert!(zb.test_and_set(2, 2, 1.0));
        assert!(!zb.test_and_set(2, 2, 1.0)); // strict comparison
        assert!(!zb.test_and_set(2, 2, 0.5));
        assert!(zb.test_and_set(2, 2, 2.0));
        assert_eq!(zb.get(2, 2), 2.0);
    }

    #[test]
    fn rgba_expansion() {
        let mut fb = Framebuffer::new(1, 1);
        fb.point(0, 0, Color::new(0x11, 0x22, 0x33));
        assert_eq!(fb.to_rgba_bytes(), vec![0x11, 0x22, 0x33, 0xff]);
    }
}
