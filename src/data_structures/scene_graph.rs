//! Scene graph and hierarchical scene organization.
//!
//! The [`World`] is the single container every component reads and mutates.
//! Nodes are stored in an arena and linked both ways: parents keep a list of
//! children for the world-transform pass, children keep a parent link for
//! the picking walk. Nodes are never removed during a session, so ids stay
//! valid forever.

use cgmath::SquareMatrix;
use id_arena::{Arena, Id};

use crate::{
    config::ProjectId,
    data_structures::{
        instance::Instance,
        model::{Material, MeshData},
    },
};

pub type NodeId = Id<SceneNode>;
pub type MeshId = Id<MeshData>;

/// Upper bound for the upward walk from a hit to its tagged ancestor.
pub const MAX_ANCESTOR_DEPTH: usize = 16;

/// Marks a node (and, by propagation, all its sub-parts) as standing for a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InteractiveTag {
    pub project: ProjectId,
}

/// What a node is for. Only `Project` roots take part in idle animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Ground,
    Prop,
    Marker,
    Project,
    Part,
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub local: Instance,
    pub world: cgmath::Matrix4<f32>,
    pub mesh: Option<MeshId>,
    pub material: Material,
    pub tag: Option<InteractiveTag>,
    /// Height the idle bob oscillates around.
    pub base_height: Option<f32>,
    pub visible: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
            local: Instance::default(),
            world: cgmath::Matrix4::identity(),
            mesh: None,
            material: Material::default(),
            tag: None,
            base_height: None,
            visible: true,
        }
    }

    pub fn with_local(mut self, local: Instance) -> Self {
        self.local = local;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshId, material: Material) -> Self {
        self.mesh = Some(mesh);
        self.material = material;
        self
    }
}

/// Global lighting rig, mirrored into the light uniform every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub ambient_colour: [f32; 3],
    pub ambient_intensity: f32,
    pub sky_colour: [f32; 3],
    pub ground_colour: [f32; 3],
    pub sun_direction: cgmath::Vector3<f32>,
    pub sun_colour: [f32; 3],
    pub sun_intensity: f32,
    pub point_position: cgmath::Point3<f32>,
    pub point_colour: [f32; 3],
    pub point_intensity: f32,
    pub point_range: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient_colour: [1.0, 1.0, 1.0],
            ambient_intensity: 0.5,
            sky_colour: [1.0, 1.0, 1.0],
            ground_colour: [1.0, 1.0, 1.0],
            sun_direction: cgmath::Vector3::new(-1.0, -1.0, -1.0),
            sun_colour: [1.0, 1.0, 1.0],
            sun_intensity: 1.0,
            point_position: cgmath::Point3::new(0.0, 2.0, 0.0),
            point_colour: [1.0, 1.0, 1.0],
            point_intensity: 0.0,
            point_range: 1.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct World {
    nodes: Arena<SceneNode>,
    meshes: Arena<MeshData>,
    roots: Vec<NodeId>,
    pub lighting: Lighting,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.alloc(mesh)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id)
    }

    /// Inserts `node` under `parent` (or as a root) and returns its id.
    pub fn add_node(&mut self, mut node: SceneNode, parent: Option<NodeId>) -> NodeId {
        node.parent = parent;
        let id = self.nodes.alloc(node);
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(id),
            None => {
                if parent.is_some() {
                    log::warn!("Parent of node {:?} does not exist, adding it as a root", id);
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.parent = None;
                    }
                }
                self.roots.push(id);
            }
        }
        self.update_subtree(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// All ids in the subtree rooted at `id`, `id` first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Applies `tag` to `id` and every node below it.
    pub fn tag_subtree(&mut self, id: NodeId, tag: InteractiveTag) {
        for node_id in self.descendants(id) {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.tag = Some(tag);
            }
        }
    }

    /// Walks parent links from `id` until a tagged node is found, giving up after
    /// [`MAX_ANCESTOR_DEPTH`] steps.
    pub fn tagged_ancestor(&self, id: NodeId) -> Option<(NodeId, InteractiveTag)> {
        let mut current = Some(id);
        for _ in 0..=MAX_ANCESTOR_DEPTH {
            let node_id = current?;
            let node = self.nodes.get(node_id)?;
            if let Some(tag) = node.tag {
                return Some((node_id, tag));
            }
            current = node.parent;
        }
        None
    }

    /// Root node standing for `project`, if it has been loaded.
    pub fn project_root(&self, project: ProjectId) -> Option<NodeId> {
        self.roots.iter().copied().find(|&id| {
            self.nodes.get(id).is_some_and(|node| {
                node.kind == NodeKind::Project && node.tag.map(|t| t.project) == Some(project)
            })
        })
    }

    pub fn project_roots(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.roots
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|node| (id, node)))
            .filter(|(_, node)| node.kind == NodeKind::Project)
    }

    /// World-space position of a node's origin.
    pub fn world_position(&self, id: NodeId) -> Option<cgmath::Point3<f32>> {
        self.nodes
            .get(id)
            .map(|node| cgmath::Point3::new(node.world.w.x, node.world.w.y, node.world.w.z))
    }

    /// Recomputes every cached world matrix from the local transforms.
    pub fn update_world_transforms(&mut self) {
        let roots = self.roots.clone();
        for root in roots {
            self.update_subtree(root);
        }
    }

    /// Recomputes the cached world matrices below (and including) `id`.
    pub fn update_subtree(&mut self, id: NodeId) {
        let parent_world = self
            .nodes
            .get(id)
            .and_then(|node| node.parent)
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.world)
            .unwrap_or_else(cgmath::Matrix4::identity);
        let mut stack = vec![(id, parent_world)];
        while let Some((node_id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(node_id) else {
                continue;
            };
            node.world = parent_world * node.local.to_matrix();
            let world = node.world;
            stack.extend(node.children.iter().map(|&child| (child, world)));
        }
    }
}
