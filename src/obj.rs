// obj.rs

use anyhow::{Context, Result};
use log::debug;

use crate::math::Vec3f;

/// One corner of a triangular face: indices into the mesh's position,
/// texture-coordinate and normal arrays, zero-based after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: usize,
    pub texcoord: usize,
    pub normal: usize,
}

pub type Face = [FaceVertex; 3];

/// In-memory mesh, read-only for the duration of a render. Texture
/// coordinates keep the source format's third component slot (unused, kept
/// as 0) so the arrays line up with the face indices one-to-one.
pub struct Mesh {
    positions: Vec<Vec3f>,
    texcoords: Vec<Vec3f>,
    normals: Vec<Vec3f>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn load(path: &str) -> Result<Mesh> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: false,
                ..Default::default()
            },
        )
        .with_context(|| format!("failed to load mesh {path}"))?;

        let mut mesh = Mesh {
            positions: Vec::new(),
            texcoords: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
        };

        for model in models {
            let m = model.mesh;
            let position_base = mesh.positions.len();
            let texcoord_base = mesh.texcoords.len();
            let normal_base = mesh.normals.len();

            mesh.positions
                .extend(m.positions.chunks(3).map(|p| Vec3f::new(p[0], p[1], p[2])));
            mesh.texcoords
                .extend(m.texcoords.chunks(2).map(|t| Vec3f::new(t[0], t[1], 0.0)));
            mesh.normals
                .extend(m.normals.chunks(3).map(|n| Vec3f::new(n[0], n[1], n[2])));

            for tri in 0..m.indices.len() / 3 {
                let mut face = [FaceVertex { position: 0, texcoord: 0, normal: 0 }; 3];
                for (nth, slot) in face.iter_mut().enumerate() {
                    let i = tri * 3 + nth;
                    slot.position = position_base + m.indices[i] as usize;
                    slot.texcoord = texcoord_base
                        + m.texcoord_indices.get(i).map(|&t| t as usize).unwrap_or(0);
                    slot.normal =
                        normal_base + m.normal_indices.get(i).map(|&n| n as usize).unwrap_or(0);
                }
                mesh.faces.push(face);
            }
        }

        debug!(
            "loaded {path}: {} vertices, {} texcoords, {} faces",
            mesh.vertex_count(),
            mesh.texcoord_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn texcoord_count(&self) -> usize {
        self.texcoords.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, index: usize) -> &Face {
        &self.faces[index]
    }

    pub fn position(&self, index: usize) -> Vec3f {
        self.positions[index]
    }

    /// u/v in [0, 1]; the z component is the unused slot from the source.
    pub fn texcoord(&self, index: usize) -> Vec3f {
        self.texcoords.get(index).copied().unwrap_or_default()
    }

    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn normal(&self, index: usize) -> Vec3f {
        self.normals.get(index).copied().unwrap_or_default()
    }

    /// World-space corner positions of one face.
    pub fn face_positions(&self, index: usize) -> [Vec3f; 3] {
        let face = self.faces[index];
        [
            self.positions[face[0].position],
            self.positions[face[1].position],
            self.positions[face[2].position],
        ]
    }
}
