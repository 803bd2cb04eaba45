//! Mesh and material definitions.
//!
//! Geometry is kept on the CPU as [`MeshData`] for picking and mirrored to
//! the GPU as [`GpuMesh`] the first time it is drawn. Materials are flat:
//! a base colour and an emissive strength, both carried per instance.

use std::ops::Range;

use cgmath::{InnerSpace, MetricSpace};
use wgpu::util::DeviceExt;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Smallest sphere (approximately) enclosing a mesh, in the mesh's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: cgmath::Point3<f32>,
    pub radius: f32,
}

impl BoundingSphere {
    /// Centre of the axis-aligned bounds, radius to the farthest vertex.
    pub fn from_positions(positions: &[[f32; 3]]) -> Self {
        if positions.is_empty() {
            return Self {
                center: cgmath::Point3::new(0.0, 0.0, 0.0),
                radius: 0.0,
            };
        }
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        let center = cgmath::Point3::new(
            (min[0] + max[0]) * 0.5,
            (min[1] + max[1]) * 0.5,
            (min[2] + max[2]) * 0.5,
        );
        let radius = positions
            .iter()
            .map(|&p| center.distance(p.into()))
            .fold(0.0, f32::max);
        Self { center, radius }
    }
}

/// CPU-side triangle mesh.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub bounds: BoundingSphere,
}

impl MeshData {
    /// Builds a mesh, computing smooth normals when none are supplied.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<u32>,
    ) -> Self {
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => compute_normals(&positions, &indices),
        };
        let bounds = BoundingSphere::from_positions(&positions);
        Self {
            name: name.into(),
            positions,
            normals,
            indices,
            bounds,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices of triangle `i`, or `None` when an index is out of range.
    pub fn triangle(&self, i: usize) -> Option<[cgmath::Point3<f32>; 3]> {
        let tri = self.indices.get(i * 3..i * 3 + 3)?;
        let a = *self.positions.get(tri[0] as usize)?;
        let b = *self.positions.get(tri[1] as usize)?;
        let c = *self.positions.get(tri[2] as usize)?;
        Some([a.into(), b.into(), c.into()])
    }

    pub fn vertices(&self) -> Vec<ModelVertex> {
        self.positions
            .iter()
            .zip(self.normals.iter())
            .map(|(&position, &normal)| ModelVertex { position, normal })
            .collect()
    }
}

/// Area-weighted vertex normals.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if ia >= positions.len() || ib >= positions.len() || ic >= positions.len() {
            continue;
        }
        let a: cgmath::Vector3<f32> = positions[ia].into();
        let b: cgmath::Vector3<f32> = positions[ib].into();
        let c: cgmath::Vector3<f32> = positions[ic].into();
        let face = (b - a).cross(c - a);
        normals[ia] += face;
        normals[ib] += face;
        normals[ic] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

/// Flat material carried per instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub base_colour: [f32; 4],
    pub emissive: f32,
}

impl Material {
    pub fn from_hex(hex: u32) -> Self {
        let [r, g, b] = crate::config::hex_to_rgb(hex);
        Self {
            base_colour: [r, g, b, 1.0],
            emissive: 0.0,
        }
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_colour: [0.8, 0.8, 0.8, 1.0],
            emissive: 0.0,
        }
    }
}

/// GPU copy of a [`MeshData`].
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_elements: mesh.indices.len() as u32,
        }
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a GpuMesh,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'b GpuMesh,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, camera_bind_group, &[]);
        self.set_bind_group(1, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}
