//! Scene rendering and draw batching.
//!
//! [`GpuScene`] mirrors the CPU [`World`] on the GPU: meshes are uploaded
//! once the first time a node references them, and every frame the visible
//! mesh nodes are flattened into one instance buffer sorted by mesh so each
//! mesh costs a single instanced draw.

use std::{collections::HashMap, ops::Range};

use wgpu::RenderPass;

use crate::data_structures::{
    instance::InstanceRaw,
    model::{DrawModel, GpuMesh},
    scene_graph::{MeshId, World},
};

const INITIAL_INSTANCE_CAPACITY: usize = 256;

/// One instanced draw: a mesh and its slice of the instance buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub mesh: MeshId,
    pub instances: Range<u32>,
}

/// Walks the world from its roots and collects the instance data of every
/// visible mesh node. A hidden node hides its whole subtree.
///
/// The result is grouped by mesh in first-seen order.
pub fn collect_batches(world: &World) -> (Vec<Batch>, Vec<InstanceRaw>) {
    let mut order: Vec<MeshId> = Vec::new();
    let mut grouped: HashMap<MeshId, Vec<InstanceRaw>> = HashMap::new();

    let mut stack = world.roots().iter().rev().copied().collect::<Vec<_>>();
    while let Some(id) = stack.pop() {
        let Some(node) = world.node(id) else {
            continue;
        };
        if !node.visible {
            continue;
        }
        if let Some(mesh) = node.mesh {
            grouped
                .entry(mesh)
                .or_insert_with(|| {
                    order.push(mesh);
                    Vec::new()
                })
                .push(InstanceRaw::new(&node.world, &node.material));
        }
        stack.extend(node.children.iter().rev().copied());
    }

    let mut batches = Vec::with_capacity(order.len());
    let mut instances = Vec::new();
    for mesh in order {
        let Some(raws) = grouped.remove(&mesh) else {
            continue;
        };
        let start = instances.len() as u32;
        instances.extend(raws);
        batches.push(Batch {
            mesh,
            instances: start..instances.len() as u32,
        });
    }
    (batches, instances)
}

#[derive(Debug)]
pub struct GpuScene {
    meshes: HashMap<MeshId, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    batches: Vec<Batch>,
}

impl GpuScene {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            meshes: HashMap::new(),
            instance_buffer: mk_instance_buffer(device, INITIAL_INSTANCE_CAPACITY),
            capacity: INITIAL_INSTANCE_CAPACITY,
            batches: Vec::new(),
        }
    }

    /// Uploads new meshes and this frame's instances.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, world: &World) {
        let (batches, instances) = collect_batches(world);

        for batch in &batches {
            if self.meshes.contains_key(&batch.mesh) {
                continue;
            }
            match world.mesh(batch.mesh) {
                Some(mesh) => {
                    log::debug!("Uploading mesh {:?} ({} triangles)", mesh.name, mesh.triangle_count());
                    self.meshes.insert(batch.mesh, GpuMesh::upload(device, mesh));
                }
                None => log::warn!("Node references unknown mesh {:?}", batch.mesh),
            }
        }

        if instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two();
            log::debug!("Growing instance buffer to {} instances", self.capacity);
            self.instance_buffer = mk_instance_buffer(device, self.capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.batches = batches;
    }

    pub fn draw<'pass>(
        &'pass self,
        render_pass: &mut RenderPass<'pass>,
        camera_bind_group: &'pass wgpu::BindGroup,
        light_bind_group: &'pass wgpu::BindGroup,
    ) {
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for batch in &self.batches {
            let Some(mesh) = self.meshes.get(&batch.mesh) else {
                continue;
            };
            render_pass.draw_mesh_instanced(
                mesh,
                batch.instances.clone(),
                camera_bind_group,
                light_bind_group,
            );
        }
    }
}

fn mk_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
