//! The landing scene as one unit.
//!
//! [`Portfolio`] wires the world, the static scene, the loader, pointer
//! interaction, the camera director and the orbit controls together. It has
//! no GPU state, so the whole interaction model runs headless; the event
//! loop only forwards input to it and renders what it holds.

use cgmath::{Point3, Quaternion, Rotation3};
use rand::{SeedableRng, rngs::SmallRng};
use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    camera::{Camera, OrbitController, Projection},
    config::{IdleConfig, PortfolioConfig, ProjectDescriptor, ProjectId},
    data_structures::scene_graph::{NodeId, World},
    director::CameraDirector,
    host::{CameraCommand, HostPage},
    interaction::{FocusMove, PointerInteraction},
    loader::AssetLoader,
    pick::Ray,
    resources::ModelAsset,
    scene::{SceneBuilder, SceneHandles},
};

#[derive(Debug)]
pub struct Portfolio {
    pub config: PortfolioConfig,
    pub world: World,
    pub scene: SceneHandles,
    pub loader: AssetLoader,
    pub director: CameraDirector,
    pub interaction: PointerInteraction,
    pub camera: Camera,
    pub controller: OrbitController,
    pub projection: Projection,
    size: (u32, u32),
    elapsed: f32,
    rng: SmallRng,
}

impl Portfolio {
    /// Builds the static scene and puts the camera at its home pose.
    pub fn new(config: PortfolioConfig, width: u32, height: u32) -> Self {
        let mut world = World::new();
        let scene = SceneBuilder::new(&config).build(&mut world);
        let home = config.camera.home;
        let camera = Camera::new(home.position, home.look_at);
        let projection = Projection::from_config(width, height, &config.camera);
        let mut controller = OrbitController::new(home.look_at.into(), config.orbit.clone());
        controller.resize(height, &projection);

        Self {
            loader: AssetLoader::new(&config.projects),
            director: CameraDirector::new(config.camera.clone()),
            interaction: PointerInteraction::new(config.interaction.clone()),
            rng: SmallRng::seed_from_u64(instant::now().to_bits()),
            config,
            world,
            scene,
            camera,
            controller,
            projection,
            size: (width, height),
            elapsed: 0.0,
        }
    }

    /// Replaces the click randomness, e.g. for reproducible camera moves.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.projection.resize(width, height);
        self.controller.resize(height, &self.projection);
    }

    /// Every project with the resource path of its model, in table order.
    pub fn model_requests(&self) -> Vec<(ProjectId, String)> {
        self.config
            .projects
            .iter()
            .map(|project| (project.id, self.config.model_path(project)))
            .collect()
    }

    pub fn begin_loading(&mut self, host: &mut dyn HostPage) {
        log::info!("Loading {} project models", self.config.projects.len());
        self.loader.begin(host);
    }

    /// Hands the outcome of one model fetch to the loader.
    pub fn model_loaded(
        &mut self,
        project: ProjectId,
        result: anyhow::Result<ModelAsset>,
        host: &mut dyn HostPage,
    ) -> Option<NodeId> {
        let Some(descriptor) = self.config.projects.iter().find(|p| p.id == project).cloned() else {
            log::warn!("Model arrived for unknown project {}", project);
            return None;
        };
        let root = self.loader.settle(&mut self.world, &descriptor, result, host)?;
        // Join the idle motion where the other projects are right now
        animate_projects(&mut self.world, &self.config.projects, &self.config.idle, self.elapsed);
        self.world.update_subtree(root);
        Some(root)
    }

    pub fn ray_at(&self, cursor: (f64, f64)) -> Ray {
        self.camera.cast_ray_from_mouse(cursor, self.size, &self.projection)
    }

    pub fn pointer_moved(&mut self, cursor: (f64, f64), host: &mut dyn HostPage) {
        self.controller.cursor_moved(cursor, &self.camera);
        let ray = self.ray_at(cursor);
        self.interaction.on_pointer_move(cursor, &ray, &self.world, host);
    }

    /// Button press or release at the last known cursor position.
    ///
    /// A left press released without dragging is a click; a click on a
    /// project starts a camera move towards it.
    pub fn pointer_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        host: &mut dyn HostPage,
    ) -> Option<FocusMove> {
        self.controller.button(button, pressed);
        if button != MouseButton::Left {
            return None;
        }
        let cursor = self.interaction.cursor()?;
        if pressed {
            self.interaction.on_pointer_down(cursor);
            return None;
        }
        if !self.interaction.on_pointer_up(cursor) {
            return None;
        }
        let ray = self.ray_at(cursor);
        let focus = self
            .interaction
            .on_click(&ray, &self.world, host, &mut self.rng)?;
        self.director.move_to(focus.position, focus.look_at);
        Some(focus)
    }

    /// Routes pointer, wheel and key events. Returns the camera move a click started, if any.
    pub fn window_event(&mut self, event: &WindowEvent, host: &mut dyn HostPage) -> Option<FocusMove> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved((position.x, position.y), host);
                None
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.pointer_button(*button, *state == ElementState::Pressed, host)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 100.0) as f32,
                };
                self.scroll(lines);
                None
            }
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                self.controller.release();
                None
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyR) => self.command(CameraCommand::Reset),
                    PhysicalKey::Code(KeyCode::KeyO) => self.command(CameraCommand::Overview),
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }

    pub fn scroll(&mut self, lines: f32) {
        self.controller.scroll(lines);
    }

    pub fn command(&mut self, command: CameraCommand) {
        match command {
            CameraCommand::Reset => self.director.reset_view(),
            CameraCommand::Overview => self.director.overview(),
        }
    }

    /// One frame: idle motion, cosmetic animation, camera and world matrices.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        let t = self.elapsed;
        animate_projects(&mut self.world, &self.config.projects, &self.config.idle, t);
        self.director.update(&mut self.camera, &mut self.controller, dt);
        self.scene
            .animate(&mut self.world, t, self.director.spotlight_strength());
        self.controller.update(&mut self.camera);
        self.world.update_world_transforms();
    }

    /// Current world position of a project's model, once it has settled.
    pub fn project_position(&self, project: ProjectId) -> Option<Point3<f32>> {
        self.world
            .project_root(project)
            .and_then(|root| self.world.world_position(root))
    }
}

/// Bobs and spins every project root for time `t`.
///
/// Only the vertical position and the yaw change; both are computed from
/// `t` alone, so calling this twice for the same `t` is a no-op.
pub fn animate_projects(world: &mut World, projects: &[ProjectDescriptor], idle: &IdleConfig, t: f32) {
    for (index, project) in projects.iter().enumerate() {
        let Some(root) = world.project_root(project.id) else {
            continue;
        };
        let Some(node) = world.node_mut(root) else {
            continue;
        };
        let base = node.base_height.unwrap_or(project.position[1]);
        node.local.position.y = base + idle.bob_amplitude * (t + index as f32).sin();
        node.local.rotation =
            Quaternion::from_angle_y(cgmath::Rad(project.rotation + idle.spin_rate * t));
    }
}
