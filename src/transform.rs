// transform.rs
//
// Builds and composes the three matrices every vertex travels through:
// model-view (camera basis change), projection (perspective divide term) and
// viewport (NDC to framebuffer pixels).

use anyhow::Result;

use crate::camera::Camera;
use crate::math::{embed, project, Matrix, Vec3f};

/// Depth resolution of the viewport transform: NDC z is scaled into
/// [0, DEPTH_RANGE] before interpolation and depth testing.
pub const DEPTH_RANGE: f32 = 255.0;

/// Perspective matrix: identity with `-1/distance` at row 3 col 2, so a
/// transformed vertex ends up with w' = 1 - z/distance.
pub fn projection(camera_distance: f32) -> Matrix {
    let mut m = Matrix::identity(4);
    m[(3, 2)] = -1.0 / camera_distance;
    m
}

/// Maps NDC into a sub-rectangle of the output raster with a margin of one
/// eighth of the frame on each side, and z into [0, depth].
pub fn viewport(width: usize, height: usize, depth: f32) -> Matrix {
    let x = width as f32 / 8.0;
    let y = height as f32 / 8.0;
    let w = width as f32 * 3.0 / 4.0;
    let h = height as f32 * 3.0 / 4.0;

    let mut m = Matrix::identity(4);
    m[(0, 0)] = w / 2.0;
    m[(1, 1)] = h / 2.0;
    m[(2, 2)] = depth / 2.0;
    m[(0, 3)] = x + w / 2.0;
    m[(1, 3)] = y + h / 2.0;
    m[(2, 3)] = depth / 2.0;
    m
}

/// The per-frame transform stack, built once per render and threaded through
/// the shading stage explicitly.
pub struct Transforms {
    pub model_view: Matrix,
    pub projection: Matrix,
    pub viewport: Matrix,
}

impl Transforms {
    pub fn build(camera: &Camera, width: usize, height: usize) -> Result<Transforms> {
        let model_view = camera.model_view()?;
        Ok(Transforms {
            model_view,
            projection: projection(camera.distance()),
            viewport: viewport(width, height, DEPTH_RANGE),
        })
    }

    /// viewport × projection × model-view, still homogeneous.
    pub fn combined(&self) -> Matrix {
        &(&self.viewport * &self.projection) * &self.model_view
    }

    /// Object space to screen space, perspective divide included.
    pub fn apply(&self, v: Vec3f) -> Vec3f {
        project(&(&self.combined() * &embed(v)))
    }

    /// Screen space back to object space. `None` when the combined
    /// transform is singular.
    pub fn unapply(&self, screen: Vec3f) -> Option<Vec3f> {
        let inverse = self.combined().inverse()?;
        Some(project(&(&inverse * &embed(screen))))
    }
}
