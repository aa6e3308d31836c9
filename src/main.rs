use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use minifb::{Key, Window, WindowOptions};
use std::time::Instant;

mod camera;
mod color;
mod framebuffer;
mod math;
mod obj;
mod rasterizer;
mod shaders;
mod texture;
mod transform;

use camera::Camera;
use color::Color;
use framebuffer::{DepthBuffer, Framebuffer};
use math::{Vec2i, Vec3f};
use obj::Mesh;
use shaders::{
    FlatShader, GouraudShader, GradientShader, RandomShader, RenderContext, Shader,
    TexturedShader,
};
use texture::Texture;
use transform::Transforms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShadingMode {
    Flat,
    Gouraud,
    Textured,
    Random,
    Gradient,
}

struct Config {
    mesh_path: String,
    output_path: String,
    texture_path: Option<String>,
    shading: ShadingMode,
    base_color: Color,
    background: Color,
    light_dir: Vec3f,
    eye: Vec3f,
    center: Vec3f,
    up: Vec3f,
    width: usize,
    height: usize,
    lighting: bool,
    wireframe: bool,
    preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mesh_path: "assets/models/head.obj".to_string(),
            output_path: "output.png".to_string(),
            texture_path: None,
            shading: ShadingMode::Flat,
            base_color: Color::WHITE,
            background: Color::new(0, 0, 0),
            light_dir: Vec3f::new(0.0, 0.0, 1.0),
            eye: Vec3f::new(1.0, 1.0, 3.0),
            center: Vec3f::new(0.0, 0.0, 0.0),
            up: Vec3f::new(0.0, 1.0, 0.0),
            width: 800,
            height: 800,
            lighting: true,
            wireframe: false,
            preview: false,
        }
    }
}

const USAGE: &str = "usage: softrender [MESH.obj] [options]
  --output PATH        output image (png/tga/jpg by extension, default output.png)
  --shader MODE        flat | gouraud | textured | random | gradient
  --texture PATH       texture image, required for --shader textured
  --color RRGGBB       base color for flat/gouraud shading
  --background RRGGBB  frame clear color (default 000000)
  --light X,Y,Z        light direction
  --eye X,Y,Z          camera position
  --center X,Y,Z       camera look-at target
  --up X,Y,Z           camera up vector
  --width N            frame width in pixels
  --height N           frame height in pixels
  --no-lighting        disable lighting and unlit-face culling
  --wireframe          overlay triangle edges
  --preview            show the result in a window";

fn parse_vec3(s: &str) -> Result<Vec3f> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        bail!("expected three comma-separated numbers, got {s:?}");
    }
    let mut v = [0.0f32; 3];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .with_context(|| format!("bad number {part:?} in {s:?}"))?;
    }
    Ok(Vec3f::new(v[0], v[1], v[2]))
}

fn parse_color(s: &str) -> Result<Color> {
    let hex = u32::from_str_radix(s.trim_start_matches('#'), 16)
        .with_context(|| format!("bad color {s:?}, expected RRGGBB"))?;
    Ok(Color::from_hex(hex))
}

impl Config {
    fn parse(args: impl Iterator<Item = String>) -> Result<Config> {
        let mut config = Config::default();
        let mut positional_seen = false;

        let mut iter = args;
        while let Some(arg) = iter.next() {
            let mut take = |flag: &str| -> Result<String> {
                iter.next().ok_or_else(|| anyhow!("{flag} needs a value"))
            };
            match arg.as_str() {
                "--output" => config.output_path = take("--output")?,
                "--texture" => config.texture_path = Some(take("--texture")?),
                "--shader" => {
                    config.shading = match take("--shader")?.as_str() {
                        "flat" => ShadingMode::Flat,
                        "gouraud" => ShadingMode::Gouraud,
                        "textured" => ShadingMode::Textured,
                        "random" => ShadingMode::Random,
                        "gradient" => ShadingMode::Gradient,
                        other => bail!("unknown shader mode {other:?}"),
                    }
                }
                "--color" => config.base_color = parse_color(&take("--color")?)?,
                "--background" => config.background = parse_color(&take("--background")?)?,
                "--light" => config.light_dir = parse_vec3(&take("--light")?)?,
                "--eye" => config.eye = parse_vec3(&take("--eye")?)?,
                "--center" => config.center = parse_vec3(&take("--center")?)?,
                "--up" => config.up = parse_vec3(&take("--up")?)?,
                "--width" => config.width = take("--width")?.parse().context("bad --width")?,
                "--height" => config.height = take("--height")?.parse().context("bad --height")?,
                "--no-lighting" => config.lighting = false,
                "--wireframe" => config.wireframe = true,
                "--preview" => config.preview = true,
                "--help" | "-h" => bail!("{USAGE}"),
                flag if flag.starts_with('-') => bail!("unknown option {flag:?}\n{USAGE}"),
                path => {
                    if positional_seen {
                        bail!("more than one mesh path given\n{USAGE}");
                    }
                    config.mesh_path = path.to_string();
                    positional_seen = true;
                }
            }
        }

        if config.shading == ShadingMode::Textured && config.texture_path.is_none() {
            bail!("--shader textured requires --texture PATH");
        }
        if config.width == 0 || config.height == 0 {
            bail!("frame dimensions must be positive");
        }
        Ok(config)
    }
}

/// One pass over the face list: vertex stage, per-face culling, rasterization.
/// Returns (faces culled, fragments accepted by the depth test).
fn render(
    ctx: &RenderContext,
    shader: &mut dyn Shader,
    framebuffer: &mut Framebuffer,
    depth_buffer: &mut DepthBuffer,
) -> (usize, usize) {
    let mut culled = 0;
    let mut fragments = 0;
    for face in 0..ctx.mesh.face_count() {
        let mut screen = [Vec3f::default(); 3];
        for (nth, slot) in screen.iter_mut().enumerate() {
            *slot = shader.vertex(ctx, face, nth).to_cartesian();
        }
        if shader.cull() {
            culled += 1;
            continue;
        }
        fragments += rasterizer::triangle(&screen, &*shader, framebuffer, depth_buffer);
    }
    (culled, fragments)
}

/// White edge overlay on top of the filled render. Drawn without a depth
/// test, so hidden edges show through.
fn wireframe_overlay(ctx: &RenderContext, framebuffer: &mut Framebuffer) {
    for face in 0..ctx.mesh.face_count() {
        let screen = ctx
            .mesh
            .face_positions(face)
            .map(|v| ctx.clip_position(v).to_cartesian());
        for i in 0..3 {
            let a = screen[i];
            let b = screen[(i + 1) % 3];
            rasterizer::line(
                Vec2i::new(a.x as i32, a.y as i32),
                Vec2i::new(b.x as i32, b.y as i32),
                framebuffer,
                Color::WHITE,
            );
        }
    }
}

fn save_image(framebuffer: &Framebuffer, path: &str) -> Result<()> {
    let img = image::RgbaImage::from_raw(
        framebuffer.width as u32,
        framebuffer.height as u32,
        framebuffer.to_rgba_bytes(),
    )
    .ok_or_else(|| anyhow!("framebuffer size does not match its pixel data"))?;
    img.save(path)
        .with_context(|| format!("failed to write image {path}"))?;
    Ok(())
}

fn preview(framebuffer: &Framebuffer) -> Result<()> {
    let mut window = Window::new(
        "softrender",
        framebuffer.width,
        framebuffer.height,
        WindowOptions::default(),
    )
    .context("failed to open preview window")?;
    window.set_target_fps(30);
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&framebuffer.buffer, framebuffer.width, framebuffer.height)
            .context("failed to present framebuffer")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse(std::env::args().skip(1))?;

    let mesh = Mesh::load(&config.mesh_path)?;
    info!(
        "mesh {}: {} vertices, {} faces",
        config.mesh_path,
        mesh.vertex_count(),
        mesh.face_count()
    );

    let loaded_texture = match &config.texture_path {
        Some(path) => Some(Texture::load(path)?),
        None => None,
    };
    if config.shading == ShadingMode::Textured && !mesh.has_texcoords() {
        bail!("mesh {} has no texture coordinates", config.mesh_path);
    }

    let camera = Camera::new(config.eye, config.center, config.up);
    let transforms = Transforms::build(&camera, config.width, config.height)?;
    let light_dir = config
        .light_dir
        .normalized()
        .ok_or_else(|| anyhow!("light direction must be a non-zero vector"))?;

    let ctx = RenderContext {
        mesh: &mesh,
        transform: transforms.combined(),
        light_dir,
        lighting: config.lighting,
        width: config.width,
        height: config.height,
    };

    let mut shader: Box<dyn Shader + '_> = match config.shading {
        ShadingMode::Flat => Box::new(FlatShader::new(config.base_color)),
        ShadingMode::Gouraud => Box::new(GouraudShader::new(config.base_color)),
        ShadingMode::Textured => {
            let texture = loaded_texture
                .as_ref()
                .ok_or_else(|| anyhow!("--shader textured requires --texture PATH"))?;
            Box::new(TexturedShader::new(texture))
        }
        ShadingMode::Random => Box::new(RandomShader::new()),
        ShadingMode::Gradient => Box::new(GradientShader::new()),
    };

    let mut framebuffer = Framebuffer::new(config.width, config.height);
    framebuffer.set_background_color(config.background.to_hex());
    framebuffer.clear();
    let mut depth_buffer = DepthBuffer::new(config.width, config.height);

    let started = Instant::now();
    let (culled, fragments) = render(&ctx, shader.as_mut(), &mut framebuffer, &mut depth_buffer);
    if config.wireframe {
        wireframe_overlay(&ctx, &mut framebuffer);
    }
    drop(depth_buffer);
    info!(
        "rendered {} faces in {:?} ({culled} culled, {fragments} fragments)",
        mesh.face_count(),
        started.elapsed()
    );
    debug!("shading mode {:?}", config.shading);

    framebuffer.flip_vertically();
    save_image(&framebuffer, &config.output_path)?;
    info!("wrote {}", config.output_path);

    if config.preview {
        preview(&framebuffer)?;
    }
    Ok(())
}
