//! Object picking.
//!
//! Picking is done on the CPU against the geometry kept in the [`World`]:
//!
//! 1. Cast a ray from the camera through the cursor
//! 2. Transform it into each visible mesh's local space and reject meshes whose bounding sphere it misses
//! 3. Run a ray/triangle test on the remaining meshes and keep the nearest hit
//! 4. Walk from the hit node up the parent links until a node with an [`InteractiveTag`] is found
//!
//! The walk in step 4 is what lets a hit on any sub-part of a loaded model
//! resolve to the project the whole model stands for.

use cgmath::{InnerSpace, Point3, SquareMatrix, Transform, Vector3};

use crate::{
    config::ProjectId,
    data_structures::{
        model::MeshData,
        scene_graph::{InteractiveTag, MAX_ANCESTOR_DEPTH, NodeId, World},
    },
};

const EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// The same ray in another space. The direction is not renormalized, so a
    /// parameter `t` names the same point in both spaces.
    pub fn transform(&self, matrix: &cgmath::Matrix4<f32>) -> Self {
        Self {
            origin: matrix.transform_point(self.origin),
            direction: matrix.transform_vector(self.direction),
        }
    }
}

/// Nearest non-negative ray parameter at which `ray` meets the sphere.
/// A ray starting inside the sphere hits at its exit point.
pub fn intersect_sphere(ray: &Ray, center: Point3<f32>, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    if a < EPSILON {
        return None;
    }
    let half_b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = (-half_b - sqrt_d) / a;
    if near >= 0.0 {
        return Some(near);
    }
    let far = (-half_b + sqrt_d) / a;
    (far >= 0.0).then_some(far)
}

/// Möller-Trumbore ray/triangle test. Both faces count.
pub fn intersect_triangle(ray: &Ray, [v0, v1, v2]: [Point3<f32>; 3]) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    // Parallel to the triangle, or the triangle is degenerate
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Nearest triangle of `mesh` hit by a ray given in the mesh's local space.
pub fn intersect_mesh(local_ray: &Ray, mesh: &MeshData) -> Option<f32> {
    intersect_sphere(local_ray, mesh.bounds.center, mesh.bounds.radius)?;
    (0..mesh.triangle_count())
        .filter_map(|i| mesh.triangle(i))
        .filter_map(|triangle| intersect_triangle(local_ray, triangle))
        .min_by(f32::total_cmp)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    /// Ray parameter; a world distance when the ray direction is normalized.
    pub distance: f32,
    pub point: Point3<f32>,
}

/// A node is drawn only if it and all its ancestors are visible.
fn is_effectively_visible(world: &World, id: NodeId) -> bool {
    let mut current = Some(id);
    for _ in 0..=MAX_ANCESTOR_DEPTH {
        let Some(node) = current.and_then(|id| world.node(id)) else {
            return true;
        };
        if !node.visible {
            return false;
        }
        current = node.parent;
    }
    true
}

/// Nearest visible mesh surface hit by `ray`, tagged or not.
pub fn raycast(world: &World, ray: &Ray) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;
    for (id, node) in world.nodes() {
        let Some(mesh) = node.mesh.and_then(|mesh| world.mesh(mesh)) else {
            continue;
        };
        if !is_effectively_visible(world, id) {
            continue;
        }
        // Zero scale collapses the mesh; there is nothing to hit
        let Some(inverse) = node.world.invert() else {
            continue;
        };
        let Some(t) = intersect_mesh(&ray.transform(&inverse), mesh) else {
            continue;
        };
        if nearest.is_none_or(|hit| t < hit.distance) {
            nearest = Some(Hit {
                node: id,
                distance: t,
                point: ray.at(t),
            });
        }
    }
    nearest
}

/// Resolves `ray` to the interactive node it points at, if any.
///
/// Only the nearest surface counts: an untagged occluder in front of a
/// project hides it.
pub fn resolve_interactive(world: &World, ray: &Ray) -> Option<(NodeId, InteractiveTag)> {
    let hit = raycast(world, ray)?;
    world.tagged_ancestor(hit.node)
}

/// Shorthand for the project id under `ray`.
pub fn pick_project(world: &World, ray: &Ray) -> Option<ProjectId> {
    resolve_interactive(world, ray).map(|(_, tag)| tag.project)
}
