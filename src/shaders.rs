// shaders.rs
//
// The programmable half of the pipeline. The rasterizer only ever calls the
// two operations below; everything about color, lighting and discard lives
// in the shader variants.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::Color;
use crate::math::{embed, Matrix, Vec3f, Vec4f};
use crate::obj::Mesh;
use crate::texture::Texture;

/// Read-only state shared by every shader for the duration of one render.
pub struct RenderContext<'a> {
    pub mesh: &'a Mesh,
    /// viewport × projection × model-view, composed once per frame.
    pub transform: Matrix,
    pub light_dir: Vec3f,
    pub lighting: bool,
    pub width: usize,
    pub height: usize,
}

impl<'a> RenderContext<'a> {
    pub fn clip_position(&self, v: Vec3f) -> Vec4f {
        let m = &self.transform * &embed(v);
        Vec4f::new(m[(0, 0)], m[(1, 0)], m[(2, 0)], m[(3, 0)])
    }

    /// Per-face lighting intensity: dot of the world-space face normal and
    /// the light direction. Degenerate faces get 0 and end up culled.
    fn face_intensity(&self, face: usize) -> f32 {
        if !self.lighting {
            return 1.0;
        }
        let [a, b, c] = self.mesh.face_positions(face);
        match (b - a).cross(c - a).normalized() {
            Some(normal) => normal.dot(self.light_dir),
            None => 0.0,
        }
    }

    /// Per-corner lighting intensity from the mesh normal, falling back to
    /// the face normal when the mesh carries none.
    fn corner_intensity(&self, face: usize, nth: usize) -> f32 {
        if !self.lighting {
            return 1.0;
        }
        if self.mesh.has_normals() {
            let corner = self.mesh.face(face)[nth];
            match self.mesh.normal(corner.normal).normalized() {
                Some(normal) => normal.dot(self.light_dir).max(0.0),
                None => 0.0,
            }
        } else {
            self.face_intensity(face).max(0.0)
        }
    }
}

/// Minimal programmable-pipeline contract: `vertex` returns the transformed
/// homogeneous position for one corner of a face (and may stash varyings for
/// the fragment stage); `fragment` resolves the color of one covered pixel
/// from the barycentric weights, returning true to discard it. `cull` is
/// consulted after the three `vertex` calls of a face, before any pixel work.
pub trait Shader {
    fn vertex(&mut self, ctx: &RenderContext, face: usize, nth: usize) -> Vec4f;
    fn fragment(&self, bar: Vec3f, color: &mut Color) -> bool;
    fn cull(&self) -> bool {
        false
    }
}

/// One base color per mesh, lit once per face; unlit and back faces are
/// rejected before rasterization.
pub struct FlatShader {
    base: Color,
    intensity: f32,
}

impl FlatShader {
    pub fn new(base: Color) -> Self {
        FlatShader { base, intensity: 0.0 }
    }
}

impl Shader for FlatShader {
    fn vertex(&mut self, ctx: &RenderContext, face: usize, nth: usize) -> Vec4f {
        if nth == 0 {
            self.intensity = ctx.face_intensity(face);
        }
        let corner = ctx.mesh.face(face)[nth];
        ctx.clip_position(ctx.mesh.position(corner.position))
    }

    fn fragment(&self, _bar: Vec3f, color: &mut Color) -> bool {
        *color = self.base * self.intensity;
        false
    }

    fn cull(&self) -> bool {
        self.intensity <= 0.0
    }
}

/// Lighting computed per vertex and interpolated per pixel.
pub struct GouraudShader {
    base: Color,
    varying_intensity: [f32; 3],
}

impl GouraudShader {
    pub fn new(base: Color) -> Self {
        GouraudShader {
            base,
            varying_intensity: [0.0; 3],
        }
    }
}

impl Shader for GouraudShader {
    fn vertex(&mut self, ctx: &RenderContext, face: usize, nth: usize) -> Vec4f {
        self.varying_intensity[nth] = ctx.corner_intensity(face, nth);
        let corner = ctx.mesh.face(face)[nth];
        ctx.clip_position(ctx.mesh.position(corner.position))
    }

    fn fragment(&self, bar: Vec3f, color: &mut Color) -> bool {
        let intensity = self.varying_intensity[0] * bar.x
            + self.varying_intensity[1] * bar.y
            + self.varying_intensity[2] * bar.z;
        *color = self.base * intensity;
        false
    }
}

/// Samples a texture at the barycentric-interpolated UV of each pixel,
/// scaled by flat per-face lighting.
pub struct TexturedShader<'t> {
    texture: &'t Texture,
    varying_uv: [Vec3f; 3],
    intensity: f32,
}

impl<'t> TexturedShader<'t> {
    pub fn new(texture: &'t Texture) -> Self {
        TexturedShader {
            texture,
            varying_uv: [Vec3f::default(); 3],
            intensity: 0.0,
        }
    }
}

impl Shader for TexturedShader<'_> {
    fn vertex(&mut self, ctx: &RenderContext, face: usize, nth: usize) -> Vec4f {
        if nth == 0 {
            self.intensity = ctx.face_intensity(face);
        }
        let corner = ctx.mesh.face(face)[nth];
        self.varying_uv[nth] = ctx.mesh.texcoord(corner.texcoord);
        ctx.clip_position(ctx.mesh.position(corner.position))
    }

    fn fragment(&self, bar: Vec3f, color: &mut Color) -> bool {
        let uv = self.varying_uv[0] * bar.x + self.varying_uv[1] * bar.y + self.varying_uv[2] * bar.z;
        *color = self.texture.sample(uv.x, uv.y) * self.intensity;
        false
    }

    fn cull(&self) -> bool {
        self.intensity <= 0.0
    }
}

/// Debug visualization: a deterministic pseudo-random color per triangle,
/// so adjacent faces stay distinguishable across runs.
pub struct RandomShader {
    face_color: Color,
    intensity: f32,
}

impl RandomShader {
    pub fn new() -> Self {
        RandomShader {
            face_color: Color::WHITE,
            intensity: 0.0,
        }
    }
}

impl Shader for RandomShader {
    fn vertex(&mut self, ctx: &RenderContext, face: usize, nth: usize) -> Vec4f {
        if nth == 0 {
            self.intensity = ctx.face_intensity(face);
            let mut rng = StdRng::seed_from_u64(face as u64);
            self.face_color = Color::new(
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
            );
        }
        let corner = ctx.mesh.face(face)[nth];
        ctx.clip_position(ctx.mesh.position(corner.position))
    }

    fn fragment(&self, _bar: Vec3f, color: &mut Color) -> bool {
        *color = self.face_color * self.intensity;
        false
    }

    fn cull(&self) -> bool {
        self.intensity <= 0.0
    }
}

/// Procedural gradient over the screen position of each pixel.
pub struct GradientShader {
    varying_screen: [Vec3f; 3],
    intensity: f32,
    frame: (f32, f32),
}

impl GradientShader {
    pub fn new() -> Self {
        GradientShader {
            varying_screen: [Vec3f::default(); 3],
            intensity: 0.0,
            frame: (1.0, 1.0),
        }
    }
}

impl Shader for GradientShader {
    fn vertex(&mut self, ctx: &RenderContext, face: usize, nth: usize) -> Vec4f {
        if nth == 0 {
            self.intensity = ctx.face_intensity(face);
            self.frame = (ctx.width as f32, ctx.height as f32);
        }
        let corner = ctx.mesh.face(face)[nth];
        let clip = ctx.clip_position(ctx.mesh.position(corner.position));
        self.varying_screen[nth] = clip.to_cartesian();
        clip
    }

    fn fragment(&self, bar: Vec3f, color: &mut Color) -> bool {
        let p = self.varying_screen[0] * bar.x
            + self.varying_screen[1] * bar.y
            + self.varying_screen[2] * bar.z;
        *color = Color::from_float(p.x / self.frame.0, p.y / self.frame.1, 0.35) * self.intensity;
        false
    }

    fn cull(&self) -> bool {
        self.intensity <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::transform::Transforms;
    use std::fs;

    fn quad_mesh(name: &str) -> Mesh {
        // Two triangles facing +z and -z respectively.
        let path = std::env::temp_dir().join(name);
        fs::write(
            &path,
            "v -1 -1 0\nv 1 -1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0.5 1\nf 1/1 2/2 3/3\nf 1/1 3/3 2/2\n",
        )
        .unwrap();
        Mesh::load(path.to_str().unwrap()).unwrap()
    }

    fn context(mesh: &Mesh, lighting: bool) -> RenderContext<'_> {
        let camera = Camera::new(
            Vec3f::new(0.0, 0.0, 3.0),
            Vec3f::new(0.0, 0.0, 0.0),
            Vec3f::new(0.0, 1.0, 0.0),
        );
        let transforms = Transforms::build(&camera, 100, 100).unwrap();
        RenderContext {
            mesh,
            transform: transforms.combined(),
            light_dir: Vec3f::new(0.0, 0.0, 1.0),
            lighting,
            width: 100,
            height: 100,
        }
    }

    fn run_vertex_stage(shader: &mut dyn Shader, ctx: &RenderContext, face: usize) {
        for nth in 0..3 {
            shader.vertex(ctx, face, nth);
        }
    }

    #[test]
    fn flat_shader_culls_faces_turned_away_from_light() {
        let mesh = quad_mesh("softrender_flat_cull.obj");
        let ctx = context(&mesh, true);
        let mut shader = FlatShader::new(Color::WHITE);

        run_vertex_stage(&mut shader, &ctx, 0);
        assert!(!shader.cull());
        run_vertex_stage(&mut shader, &ctx, 1);
        assert!(shader.cull());
    }

    #[test]
    fn disabling_lighting_pins_intensity_to_one() {
        let mesh = quad_mesh("softrender_nolight.obj");
        let ctx = context(&mesh, false);
        let mut shader = FlatShader::new(Color::new(100, 100, 100));

        run_vertex_stage(&mut shader, &ctx, 1);
        assert!(!shader.cull());
        let mut color = Color::new(0, 0, 0);
        assert!(!shader.fragment(Vec3f::new(0.3, 0.3, 0.4), &mut color));
        assert_eq!(color, Color::new(100, 100, 100));
    }

    #[test]
    fn gouraud_interpolates_vertex_intensities() {
        let mesh = quad_mesh("softrender_gouraud.obj");
        let ctx = context(&mesh, true);
        let mut shader = GouraudShader::new(Color::WHITE);
        run_vertex_stage(&mut shader, &ctx, 0);

        // The fixture has no normals, so every corner falls back to the
        // face intensity and interpolation is constant across the face.
        let mut at_corner = Color::new(0, 0, 0);
        let mut inside = Color::new(0, 0, 0);
        shader.fragment(Vec3f::new(1.0, 0.0, 0.0), &mut at_corner);
        shader.fragment(Vec3f::new(0.25, 0.25, 0.5), &mut inside);
        assert_eq!(at_corner, inside);
    }

    #[test]
    fn textured_shader_interpolates_uv() {
        let mesh = quad_mesh("softrender_textured.obj");
        let ctx = context(&mesh, false);
        let texture = Texture::from_pixels(
            vec![Color::RED, Color::RED, Color::WHITE, Color::WHITE],
            2,
            2,
        );
        let mut shader = TexturedShader::new(&texture);
        run_vertex_stage(&mut shader, &ctx, 0);

        let mut near_base = Color::new(0, 0, 0);
        shader.fragment(Vec3f::new(0.5, 0.5, 0.0), &mut near_base);
        let mut near_apex = Color::new(0, 0, 0);
        shader.fragment(Vec3f::new(0.05, 0.05, 0.9), &mut near_apex);
        assert_ne!(near_base, near_apex);
    }

    #[test]
    fn random_shader_is_deterministic_per_face() {
        let mesh = quad_mesh("softrender_random.obj");
        let ctx = context(&mesh, false);
        let mut first = RandomShader::new();
        let mut second = RandomShader::new();
        run_vertex_stage(&mut first, &ctx, 0);
        run_vertex_stage(&mut second, &ctx, 0);

        let (mut a, mut b) = (Color::new(0, 0, 0), Color::new(0, 0, 0));
        first.fragment(Vec3f::new(0.4, 0.3, 0.3), &mut a);
        second.fragment(Vec3f::new(0.1, 0.1, 0.8), &mut b);
        assert_eq!(a, b);
    }
}
