//! Project model loading.
//!
//! Every project's model is fetched concurrently by the event loop; each
//! finished fetch (successful or not) is handed to [`AssetLoader::settle`],
//! which places the model, falls back to a placeholder cat on failure and
//! keeps the loading bar up to date.

use std::{collections::HashSet, f32::consts::PI};

use cgmath::{Quaternion, Rotation3, Vector3};

use crate::{
    config::{ProjectDescriptor, ProjectId},
    data_structures::{
        instance::Instance,
        model::Material,
        scene_graph::{InteractiveTag, NodeId, NodeKind, SceneNode, World},
    },
    host::HostPage,
    resources::{AssetNode, ModelAsset, mesh},
};

/// Placeholder colours, picked by `id % 4`.
pub const PLACEHOLDER_PALETTE: [u32; 4] = [0xf7d6aa, 0x5b5b5b, 0x000000, 0xffffff];

/// Tracks which projects have settled and signals completion once.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    expected: HashSet<ProjectId>,
    settled: HashSet<ProjectId>,
    completed: bool,
}

impl AssetLoader {
    pub fn new(projects: &[ProjectDescriptor]) -> Self {
        Self {
            expected: projects.iter().map(|p| p.id).collect(),
            settled: HashSet::new(),
            completed: false,
        }
    }

    /// Resets the progress bar. With nothing to load, completes at once.
    pub fn begin(&mut self, host: &mut dyn HostPage) {
        host.set_progress(0);
        self.check_complete(host);
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    pub fn percent(&self) -> u32 {
        if self.expected.is_empty() {
            return 100;
        }
        (self.settled.len() * 100 / self.expected.len()) as u32
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Places the outcome of one fetch in the world.
    ///
    /// Returns the project's root node, or `None` if the project is unknown
    /// or has already settled.
    pub fn settle(
        &mut self,
        world: &mut World,
        descriptor: &ProjectDescriptor,
        result: anyhow::Result<ModelAsset>,
        host: &mut dyn HostPage,
    ) -> Option<NodeId> {
        if !self.expected.contains(&descriptor.id) {
            log::warn!("Ignoring model for unknown project {}", descriptor.id);
            return None;
        }
        if self.settled.contains(&descriptor.id) {
            log::warn!("Project {} already settled, ignoring duplicate", descriptor.id);
            return None;
        }

        let root = match result {
            Ok(asset) => {
                log::info!(
                    "Model {} loaded for project {} ({} triangles)",
                    asset.name,
                    descriptor.id,
                    asset.triangle_count()
                );
                spawn_model(world, &asset, descriptor, descriptor.scale)
            }
            Err(e) => {
                log::warn!(
                    "Could not load model {} for project {}: {:#}. Using a placeholder",
                    descriptor.model,
                    descriptor.id,
                    e
                );
                spawn_model(world, &placeholder_model(descriptor.id), descriptor, 1.0)
            }
        };

        self.settled.insert(descriptor.id);
        let percent = self.percent();
        log::info!("Overall loading progress: {}%", percent);
        host.set_progress(percent);
        self.check_complete(host);
        Some(root)
    }

    fn check_complete(&mut self, host: &mut dyn HostPage) {
        if !self.completed && self.settled.len() >= self.expected.len() {
            self.completed = true;
            log::info!("All {} project models settled", self.expected.len());
            host.loading_complete();
        }
    }
}

/// Adds `asset` to the world as the project's root node and tags the whole
/// subtree with the project's id.
pub fn spawn_model(
    world: &mut World,
    asset: &ModelAsset,
    descriptor: &ProjectDescriptor,
    scale: f32,
) -> NodeId {
    let mesh_ids = asset
        .meshes
        .iter()
        .cloned()
        .map(|mesh| world.add_mesh(mesh))
        .collect::<Vec<_>>();

    let position = descriptor.position();
    let mut root = SceneNode::new(format!("project-{}", descriptor.id), NodeKind::Project)
        .with_local(Instance::placed(
            Vector3::new(position.x, position.y, position.z),
            descriptor.rotation,
            scale,
        ));
    root.base_height = Some(position.y);
    let root_id = world.add_node(root, None);

    // Iterative walk; each entry is (asset node, parent in the world)
    let mut stack = asset.roots.iter().map(|node| (node, root_id)).collect::<Vec<_>>();
    while let Some((asset_node, parent)) = stack.pop() {
        let mut node = SceneNode::new(asset_node.name.clone(), NodeKind::Part).with_local(asset_node.local);
        if let Some((index, material)) = asset_node.mesh {
            match mesh_ids.get(index) {
                Some(&mesh) => node = node.with_mesh(mesh, material),
                None => log::warn!("{}: node {} references missing mesh {}", asset.name, asset_node.name, index),
            }
        }
        let id = world.add_node(node, Some(parent));
        stack.extend(asset_node.children.iter().map(|child| (child, id)));
    }

    world.tag_subtree(
        root_id,
        InteractiveTag {
            project: descriptor.id,
        },
    );
    root_id
}

/// Low-poly cat: body and head spheres with two cone ears, one flat colour.
pub fn placeholder_model(project: ProjectId) -> ModelAsset {
    let colour = PLACEHOLDER_PALETTE[project as usize % PLACEHOLDER_PALETTE.len()];
    let material = Material::from_hex(colour);
    let ear_tilt = Quaternion::from_angle_x(cgmath::Rad(-PI / 4.0));

    let body = AssetNode::part("body", 0, material)
        .with_local(Instance::from(Vector3::new(0.0, 0.5, 0.0)));
    let head = AssetNode::part("head", 1, material)
        .with_local(Instance::from(Vector3::new(0.0, 0.8, 0.5)));
    let ear_left = AssetNode::part("ear_left", 2, material).with_local(
        Instance::from(Vector3::new(-0.15, 1.05, 0.5)).with_rotation(ear_tilt),
    );
    let ear_right = AssetNode::part("ear_right", 2, material).with_local(
        Instance::from(Vector3::new(0.15, 1.05, 0.5)).with_rotation(ear_tilt),
    );

    let mut group = AssetNode::group("placeholder");
    group.children = vec![body, head, ear_left, ear_right];

    ModelAsset {
        name: format!("placeholder-{project}"),
        meshes: vec![
            mesh::uv_sphere(0.5, 16, 16),
            mesh::uv_sphere(0.3, 16, 16),
            mesh::cone(0.1, 0.2, 8),
        ],
        roots: vec![group],
    }
}
