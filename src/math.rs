// math.rs
//
// Fixed-size vectors and the square matrix type the transform pipeline is
// built on. Vectors are generic over the scalar so the rasterizer can work
// with integer pixel coordinates and the pipeline with floats.

use std::ops::{Add, Index, IndexMut, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec4<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

pub type Vec2f = Vec2<f32>;
pub type Vec2i = Vec2<i32>;
pub type Vec3f = Vec3<f32>;
pub type Vec4f = Vec4<f32>;

impl<T> Vec2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T> Vec3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T> Vec4<T> {
    pub fn new(x: T, y: T, z: T, w: T) -> Self {
        Self { x, y, z, w }
    }
}

impl<T: Add<Output = T>> Add for Vec2<T> {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y)
    }
}

impl<T: Sub<Output = T>> Sub for Vec2<T> {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y)
    }
}

impl<T: Mul<Output = T> + Copy> Mul<T> for Vec2<T> {
    type Output = Self;
    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl<T: Add<Output = T>> Add for Vec3<T> {
    type Output = Self;
    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl<T: Sub<Output = T>> Sub for Vec3<T> {
    type Output = Self;
    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl<T: Mul<Output = T> + Copy> Mul<T> for Vec3<T> {
    type Output = Self;
    fn mul(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl<T: Mul<Output = T> + Add<Output = T> + Sub<Output = T> + Copy> Vec3<T> {
    pub fn dot(self, o: Self) -> T {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Self) -> Self {
        Self::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }
}

impl Vec3f {
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy, or `None` for a zero vector (no direction to keep).
    pub fn normalized(self) -> Option<Vec3f> {
        let len = self.length();
        if len == 0.0 {
            return None;
        }
        Some(self * (1.0 / len))
    }
}

impl Vec4f {
    /// Homogeneous to Cartesian: divide through by w.
    pub fn to_cartesian(self) -> Vec3f {
        Vec3f::new(self.x / self.w, self.y / self.w, self.z / self.w)
    }
}

/// Row-major rows×cols grid of floats; the pipeline only ever builds 4×4s
/// but the elimination code below does not care about the size.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn transpose(&self) -> Matrix {
        let mut t = Matrix::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    /// Gauss-Jordan elimination with partial pivoting on an [A | I] block.
    /// Returns `None` when the matrix is singular (a pivot column collapses
    /// to ~0), so a degenerate transform never leaks NaNs downstream.
    pub fn inverse(&self) -> Option<Matrix> {
        assert_eq!(self.rows, self.cols, "inverse of a non-square matrix");
        let n = self.rows;
        let mut aug = Matrix::new(n, 2 * n);
        for i in 0..n {
            for j in 0..n {
                aug[(i, j)] = self[(i, j)];
            }
            aug[(i, n + i)] = 1.0;
        }

        for col in 0..n {
            // Pick the largest-magnitude pivot left in this column.
            let mut pivot = col;
            for row in col + 1..n {
                if aug[(row, col)].abs() > aug[(pivot, col)].abs() {
                    pivot = row;
                }
            }
            if aug[(pivot, col)].abs() < 1e-9 {
                return None;
            }
            if pivot != col {
                for j in 0..2 * n {
                    let tmp = aug[(col, j)];
                    aug[(col, j)] = aug[(pivot, j)];
                    aug[(pivot, j)] = tmp;
                }
            }

            let inv_pivot = 1.0 / aug[(col, col)];
            for j in 0..2 * n {
                aug[(col, j)] *= inv_pivot;
            }
            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = aug[(row, col)];
                for j in 0..2 * n {
                    aug[(row, j)] -= factor * aug[(col, j)];
                }
            }
        }

        let mut inv = Matrix::new(n, n);
        for i in 0..n {
            for j in 0..n {
                inv[(i, j)] = aug[(i, n + j)];
            }
        }
        Some(inv)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;
    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        &mut self.data[i * self.cols + j]
    }
}

impl Mul for &Matrix {
    type Output = Matrix;
    fn mul(self, o: &Matrix) -> Matrix {
        assert_eq!(self.cols, o.rows, "matrix dimension mismatch");
        let mut m = Matrix::new(self.rows, o.cols);
        for i in 0..self.rows {
            for j in 0..o.cols {
                let mut acc = 0.0;
                for k in 0..self.cols {
                    acc += self[(i, k)] * o[(k, j)];
                }
                m[(i, j)] = acc;
            }
        }
        m
    }
}

/// Pack a point into a homogeneous 4×1 column with w = 1.
pub fn embed(v: Vec3f) -> Matrix {
    let mut m = Matrix::new(4, 1);
    m[(0, 0)] = v.x;
    m[(1, 0)] = v.y;
    m[(2, 0)] = v.z;
    m[(3, 0)] = 1.0;
    m
}

/// Unpack a homogeneous 4×1 column back to a point (perspective divide).
pub fn project(m: &Matrix) -> Vec3f {
    let w = m[(3, 0)];
    Vec3f::new(m[(0, 0)] / w, m[(1, 0)] / w, m[(2, 0)] / w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn vector_ops() {
        let a = Vec3f::new(1.0, 2.0, 3.0);
        let b = Vec3f::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3f::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3f::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3f::new(2.0, 4.0, 6.0));
        assert!(approx(a.dot(b), 32.0));
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vec3f::new(1.0, 0.0, 0.0);
        let y = Vec3f::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vec3f::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Vec3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn normalize_guards_zero_vector() {
        assert!(Vec3f::new(0.0, 0.0, 0.0).normalized().is_none());
        let n = Vec3f::new(3.0, 0.0, 4.0).normalized().unwrap();
        assert!(approx(n.length(), 1.0));
        assert!(approx(n.x, 0.6));
        assert!(approx(n.z, 0.8));
    }

    #[test]
    fn homogeneous_divide() {
        let v = Vec4f::new(2.0, 4.0, 6.0, 2.0);
        assert_eq!(v.to_cartesian(), Vec3f::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn identity_is_multiplicative_unit() {
        let mut m = Matrix::new(4, 4);
        for i in 0..4 {
            for j in 0..4 {
                m[(i, j)] = (i * 4 + j) as f32;
            }
        }
        let id = Matrix::identity(4);
        assert_eq!(&m * &id, m);
        assert_eq!(&id * &m, m);
    }

    #[test]
    fn transpose_swaps_indices() {
        let mut m = Matrix::new(2, 3);
        m[(0, 1)] = 5.0;
        m[(1, 2)] = 7.0;
        let t = m.transpose();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t[(1, 0)], 5.0);
        assert_eq!(t[(2, 1)], 7.0);
    }

    #[test]
    fn inverse_times_original_is_identity() {
        let mut m = Matrix::identity(4);
        m[(0, 3)] = 2.5;
        m[(1, 3)] = -1.0;
        m[(2, 2)] = 3.0;
        m[(3, 2)] = -0.5;
        let inv = m.inverse().unwrap();
        let prod = &m * &inv;
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(approx(prod[(i, j)], expected), "at ({i},{j}): {}", prod[(i, j)]);
            }
        }
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix::new(4, 4);
        assert!(m.inverse().is_none());
        let mut rank_deficient = Matrix::identity(4);
        rank_deficient[(2, 2)] = 0.0;
        assert!(rank_deficient.inverse().is_none());
    }

    #[test]
    fn embed_project_round_trip() {
        let v = Vec3f::new(1.5, -2.0, 0.25);
        assert_eq!(project(&embed(v)), v);
    }
}
