//! Static scene content: ground, lights, rocks, clouds and project markers.
//!
//! [`SceneBuilder::build`] runs before any model has loaded so the page
//! looks finished while the loading bar fills. It returns [`SceneHandles`],
//! the few nodes and parameters that keep moving afterwards.

use std::f32::consts::TAU;

use cgmath::{Point3, Vector3};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    config::{PortfolioConfig, ProjectId, hex_to_rgb},
    data_structures::{
        instance::Instance,
        model::Material,
        scene_graph::{Lighting, NodeId, NodeKind, SceneNode, World},
    },
    resources::mesh,
};

pub const GROUND_SIZE: f32 = 20.0;
pub const GROUND_HEIGHT: f32 = -1.0;
const GROUND_COLOUR: u32 = 0x303030;
const SKY_COLOUR: u32 = 0xa6c8ff;
const ACCENT_COLOUR: u32 = 0x4a5af8;
const ROCK_COLOUR: u32 = 0x6b6259;
const CLOUD_COLOUR: u32 = 0xe8ecf4;

const DEFAULT_SEED: u64 = 0x5eed_f011;
const ROCK_COUNT: usize = 14;
const ROCK_VARIANTS: u64 = 3;
const CLOUD_COUNT: usize = 5;
/// Clouds leaving `[-CLOUD_WRAP, CLOUD_WRAP]` on x re-enter on the other side.
pub const CLOUD_WRAP: f32 = 12.0;
/// Lift above the ground so the markers do not z-fight with it.
const MARKER_LIFT: f32 = 0.01;
const MARKER_GLOW: f32 = 0.25;

/// Circular path of the moving point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightOrbit {
    pub radius: f32,
    pub height: f32,
    /// Radians per second.
    pub speed: f32,
}

impl LightOrbit {
    pub fn position_at(&self, t: f32) -> Point3<f32> {
        let angle = t * self.speed;
        Point3::new(angle.sin() * self.radius, self.height, angle.cos() * self.radius)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cloud {
    pub node: NodeId,
    pub start: Vector3<f32>,
    /// Drift along +x in units per second.
    pub speed: f32,
}

impl Cloud {
    /// Position at time `t`, wrapped into the cloud band.
    pub fn position_at(&self, t: f32) -> Vector3<f32> {
        let span = 2.0 * CLOUD_WRAP;
        let x = (self.start.x + self.speed * t + CLOUD_WRAP).rem_euclid(span) - CLOUD_WRAP;
        Vector3::new(x, self.start.y, self.start.z)
    }
}

#[derive(Clone, Debug)]
pub struct SceneHandles {
    pub ground: NodeId,
    pub light: LightOrbit,
    pub clouds: Vec<Cloud>,
    pub markers: Vec<(ProjectId, NodeId)>,
    pub rocks: Vec<NodeId>,
    marker_material: Material,
}

impl SceneHandles {
    /// Moves everything cosmetic to where it belongs at time `t`.
    /// `spotlight` in `[0, 1]` brightens the project markers.
    pub fn animate(&self, world: &mut World, t: f32, spotlight: f32) {
        world.lighting.point_position = self.light.position_at(t);

        for cloud in &self.clouds {
            if let Some(node) = world.node_mut(cloud.node) {
                node.local.position = cloud.position_at(t);
            }
        }

        let emissive = self.marker_material.emissive + spotlight.clamp(0.0, 1.0);
        for &(_, marker) in &self.markers {
            if let Some(node) = world.node_mut(marker) {
                node.material.emissive = emissive;
            }
        }
    }
}

pub struct SceneBuilder<'a> {
    config: &'a PortfolioConfig,
    seed: u64,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(config: &'a PortfolioConfig) -> Self {
        Self {
            config,
            seed: DEFAULT_SEED,
        }
    }

    /// Seed for rock and cloud placement.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(&self, world: &mut World) -> SceneHandles {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let light = self.add_lights(world);
        let ground = self.add_ground(world);
        let rocks = self.add_rocks(world, &mut rng);
        let clouds = self.add_clouds(world, &mut rng);
        let marker_material = Material::from_hex(ACCENT_COLOUR).with_emissive(MARKER_GLOW);
        let markers = self.add_markers(world, marker_material);
        world.update_world_transforms();
        log::info!(
            "Scene built: {} rocks, {} clouds, {} markers",
            rocks.len(),
            clouds.len(),
            markers.len()
        );

        SceneHandles {
            ground,
            light,
            clouds,
            markers,
            rocks,
            marker_material,
        }
    }

    fn add_lights(&self, world: &mut World) -> LightOrbit {
        let light = LightOrbit {
            radius: 5.0,
            height: 2.0,
            speed: 0.5,
        };
        world.lighting = Lighting {
            ambient_colour: [1.0, 1.0, 1.0],
            ambient_intensity: 0.6,
            sky_colour: hex_to_rgb(SKY_COLOUR),
            ground_colour: hex_to_rgb(GROUND_COLOUR),
            sun_direction: Vector3::new(-5.0, -5.0, -5.0),
            sun_colour: [1.0, 1.0, 1.0],
            sun_intensity: 1.0,
            point_position: Point3::new(0.0, light.height, 0.0),
            point_colour: hex_to_rgb(ACCENT_COLOUR),
            point_intensity: 1.0,
            point_range: 15.0,
        };
        light
    }

    fn add_ground(&self, world: &mut World) -> NodeId {
        let mesh = world.add_mesh(mesh::plane(GROUND_SIZE, GROUND_SIZE));
        let node = SceneNode::new("ground", NodeKind::Ground)
            .with_local(Instance::from(Vector3::new(0.0, GROUND_HEIGHT, 0.0)))
            .with_mesh(mesh, Material::from_hex(GROUND_COLOUR));
        world.add_node(node, None)
    }

    /// Rocks go in a ring outside the project area so they never hide a model.
    fn add_rocks(&self, world: &mut World, rng: &mut SmallRng) -> Vec<NodeId> {
        let variants = (0..ROCK_VARIANTS)
            .map(|i| world.add_mesh(mesh::rock(0.4, self.seed.wrapping_add(i))))
            .collect::<Vec<_>>();
        let material = Material::from_hex(ROCK_COLOUR);
        (0..ROCK_COUNT)
            .map(|i| {
                let angle = rng.random_range(0.0..TAU);
                let distance = rng.random_range(4.5..GROUND_SIZE * 0.45);
                let scale = rng.random_range(0.5..1.6);
                let instance = Instance::placed(
                    Vector3::new(angle.cos() * distance, GROUND_HEIGHT, angle.sin() * distance),
                    rng.random_range(0.0..TAU),
                    scale,
                );
                let node = SceneNode::new(format!("rock-{i}"), NodeKind::Prop)
                    .with_local(instance)
                    .with_mesh(variants[i % variants.len()], material);
                world.add_node(node, None)
            })
            .collect()
    }

    fn add_clouds(&self, world: &mut World, rng: &mut SmallRng) -> Vec<Cloud> {
        let puff = world.add_mesh(mesh::uv_sphere(1.0, 12, 8));
        let material = Material::from_hex(CLOUD_COLOUR).with_emissive(0.1);
        (0..CLOUD_COUNT)
            .map(|i| {
                // Keep the band over the centre clear for the overview camera
                let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                let start = Vector3::new(
                    rng.random_range(-CLOUD_WRAP..CLOUD_WRAP),
                    rng.random_range(5.0..7.5),
                    side * rng.random_range(4.5..9.0),
                );
                let cluster = world.add_node(
                    SceneNode::new(format!("cloud-{i}"), NodeKind::Prop).with_local(Instance::from(start)),
                    None,
                );
                let puffs = rng.random_range(3..=5);
                for j in 0..puffs {
                    let offset = Vector3::new(
                        j as f32 * 0.7 - puffs as f32 * 0.35,
                        rng.random_range(-0.2..0.3),
                        rng.random_range(-0.4..0.4),
                    );
                    let size = rng.random_range(0.5..0.9);
                    let instance = Instance::from(offset).with_scale(Vector3::new(size, size * 0.7, size));
                    let node = SceneNode::new(format!("cloud-{i}-puff-{j}"), NodeKind::Prop)
                        .with_local(instance)
                        .with_mesh(puff, material);
                    world.add_node(node, Some(cluster));
                }
                Cloud {
                    node: cluster,
                    start,
                    speed: rng.random_range(0.15..0.45),
                }
            })
            .collect()
    }

    fn add_markers(&self, world: &mut World, material: Material) -> Vec<(ProjectId, NodeId)> {
        let ring = world.add_mesh(mesh::ring(0.6, 0.75, 48));
        self.config
            .projects
            .iter()
            .map(|project| {
                let position = Vector3::new(
                    project.position[0],
                    project.position[1] + MARKER_LIFT,
                    project.position[2],
                );
                let node = SceneNode::new(format!("marker-{}", project.id), NodeKind::Marker)
                    .with_local(Instance::from(position))
                    .with_mesh(ring, material);
                (project.id, world.add_node(node, None))
            })
            .collect()
    }
}
