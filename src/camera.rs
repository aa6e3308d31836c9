// camera.rs

use anyhow::{anyhow, Result};

use crate::math::{Matrix, Vec3f};

/// Fixed camera for one rendered frame.
pub struct Camera {
    pub eye: Vec3f,
    pub center: Vec3f,
    pub up: Vec3f,
}

impl Camera {
    pub fn new(eye: Vec3f, center: Vec3f, up: Vec3f) -> Self {
        Camera { eye, center, up }
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.center).length()
    }

    /// Orthonormal basis change placing the camera at the origin looking
    /// down -z. Errors when eye == center (no view direction) or when up is
    /// parallel to it (no usable right vector).
    pub fn model_view(&self) -> Result<Matrix> {
        let forward = (self.eye - self.center)
            .normalized()
            .ok_or_else(|| anyhow!("camera eye and center coincide"))?;
        let right = self
            .up
            .cross(forward)
            .normalized()
            .ok_or_else(|| anyhow!("camera up vector is parallel to the view direction"))?;
        let true_up = forward.cross(right);

        let mut basis = Matrix::identity(4);
        let mut translation = Matrix::identity(4);
        let axes = [right, true_up, forward];
        for (i, axis) in axes.iter().enumerate() {
            basis[(i, 0)] = axis.x;
            basis[(i, 1)] = axis.y;
            basis[(i, 2)] = axis.z;
        }
        translation[(0, 3)] = -self.eye.x;
        translation[(1, 3)] = -self.eye.y;
        translation[(2, 3)] = -self.eye.z;

        Ok(&basis * &translation)
    }
}
