// rasterizer.rs
//
// Canonical triangle fill: axis-aligned bounding box clamped to the frame,
// barycentric containment test per pixel, strict depth test, fragment
// shading. The line drawer below backs the wireframe overlay.

use crate::color::Color;
use crate::framebuffer::{DepthBuffer, Framebuffer};
use crate::math::{Vec2f, Vec2i, Vec3f};
use crate::shaders::Shader;

/// Candidate pixel contribution from one triangle; lives only inside the
/// fill loop.
pub struct Fragment {
    pub position: Vec2i,
    pub depth: f32,
    pub weights: Vec3f,
}

/// Barycentric weights of `p` with respect to triangle `abc`, via the
/// z-component of the cross product of the edge vectors. `None` when the
/// signed-area term is too small to divide by, i.e. the triangle is
/// degenerate on screen.
pub fn barycentric(a: Vec3f, b: Vec3f, c: Vec3f, p: Vec2f) -> Option<Vec3f> {
    let u = Vec3f::new(c.x - a.x, b.x - a.x, a.x - p.x)
        .cross(Vec3f::new(c.y - a.y, b.y - a.y, a.y - p.y));
    if u.z.abs() < 1.0 {
        return None;
    }
    Some(Vec3f::new(
        1.0 - (u.x + u.y) / u.z,
        u.y / u.z,
        u.x / u.z,
    ))
}

/// Fills one screen-space triangle. Returns the number of fragments that
/// survived the depth test (written or shader-discarded pixels included,
/// since both update the depth buffer).
pub fn triangle(
    pts: &[Vec3f; 3],
    shader: &dyn Shader,
    framebuffer: &mut Framebuffer,
    depth_buffer: &mut DepthBuffer,
) -> usize {
    let clamp = Vec2f::new(
        framebuffer.width as f32 - 1.0,
        framebuffer.height as f32 - 1.0,
    );
    let mut bbox_min = Vec2f::new(f32::MAX, f32::MAX);
    let mut bbox_max = Vec2f::new(f32::MIN, f32::MIN);
    for pt in pts {
        bbox_min.x = bbox_min.x.min(pt.x).max(0.0);
        bbox_min.y = bbox_min.y.min(pt.y).max(0.0);
        bbox_max.x = bbox_max.x.max(pt.x).min(clamp.x);
        bbox_max.y = bbox_max.y.max(pt.y).min(clamp.y);
    }

    let mut accepted = 0;
    for y in bbox_min.y as i32..=bbox_max.y as i32 {
        for x in bbox_min.x as i32..=bbox_max.x as i32 {
            let p = Vec2f::new(x as f32, y as f32);
            let weights = match barycentric(pts[0], pts[1], pts[2], p) {
                Some(w) => w,
                None => continue,
            };
            if weights.x < 0.0 || weights.y < 0.0 || weights.z < 0.0 {
                continue;
            }
            let fragment = Fragment {
                position: Vec2i::new(x, y),
                depth: pts[0].z * weights.x + pts[1].z * weights.y + pts[2].z * weights.z,
                weights,
            };
            // Depth is recorded before the color write on purpose: a shader
            // discard must still occlude at this pixel.
            if !depth_buffer.test_and_set(x as usize, y as usize, fragment.depth) {
                continue;
            }
            accepted += 1;
            let mut color = Color::new(0, 0, 0);
            if !shader.fragment(fragment.weights, &mut color) {
                framebuffer.point(
                    fragment.position.x as usize,
                    fragment.position.y as usize,
                    color,
                );
            }
        }
    }
    accepted
}

/// Integer Bresenham line, used for the wireframe overlay. No depth test.
pub fn line(from: Vec2i, to: Vec2i, framebuffer: &mut Framebuffer, color: Color) {
    let (mut x0, mut y0, mut x1, mut y1) = (from.x, from.y, to.x, to.y);
    let mut steep = false;
    if (x0 - x1).abs() < (y0 - y1).abs() {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
        steep = true;
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }
    let dx = x1 - x0;
    let dy = y1 - y0;
    let derror2 = dy.abs() * 2;
    let mut error2 = 0;
    let mut y = y0;
    for x in x0..=x1 {
        let (px, py) = if steep { (y, x) } else { (x, y) };
        if px >= 0 && py >= 0 {
            framebuffer.point(px as usize, py as usize, color);
        }
        error2 += derror2;
        if error2 > dx {
            y += if y1 > y0 { 1 } else { -1 };
            error2 -= dx * 2;
        }
    }
}
