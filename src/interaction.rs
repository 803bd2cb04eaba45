//! Pointer hover and click handling.

use cgmath::Point3;
use rand::Rng;

use crate::{
    config::{InteractionConfig, ProjectId},
    data_structures::scene_graph::{NodeId, World},
    host::HostPage,
    pick::{Ray, resolve_interactive},
};

/// Camera move requested by a click on a project.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusMove {
    pub project: ProjectId,
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
}

#[derive(Debug, Clone)]
pub struct PointerInteraction {
    config: InteractionConfig,
    cursor: Option<(f64, f64)>,
    hovered: Option<NodeId>,
    hovering: bool,
    pressed_at: Option<(f64, f64)>,
    dragged: bool,
}

impl PointerInteraction {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            cursor: None,
            hovered: None,
            hovering: false,
            pressed_at: None,
            dragged: false,
        }
    }

    /// Last known cursor position in physical pixels.
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Records the cursor and resolves what is under it.
    ///
    /// The host cursor glyph is only written when the hover state flips.
    /// Nothing happens while an overlay is open.
    pub fn on_pointer_move(
        &mut self,
        cursor: (f64, f64),
        ray: &Ray,
        world: &World,
        host: &mut dyn HostPage,
    ) {
        self.cursor = Some(cursor);
        if let Some(start) = self.pressed_at {
            let (dx, dy) = (cursor.0 - start.0, cursor.1 - start.1);
            if dx.hypot(dy) > self.config.drag_threshold_px {
                self.dragged = true;
            }
        }
        if host.overlay_active() {
            return;
        }

        self.hovered = resolve_interactive(world, ray).map(|(node, _)| node);
        let hovering = self.hovered.is_some();
        if hovering != self.hovering {
            self.hovering = hovering;
            host.set_hovering(hovering);
        }
    }

    pub fn on_pointer_down(&mut self, cursor: (f64, f64)) {
        self.cursor = Some(cursor);
        self.pressed_at = Some(cursor);
        self.dragged = false;
    }

    /// Ends a press. Returns true if it was a click rather than an orbit drag.
    pub fn on_pointer_up(&mut self, cursor: (f64, f64)) -> bool {
        self.cursor = Some(cursor);
        let click = self.pressed_at.take().is_some() && !self.dragged;
        self.dragged = false;
        click
    }

    /// Resolves a click. On a project, notifies the host and returns where
    /// the camera should go: a random side of the project, at a fixed
    /// distance and height.
    pub fn on_click<R: Rng>(
        &mut self,
        ray: &Ray,
        world: &World,
        host: &mut dyn HostPage,
        rng: &mut R,
    ) -> Option<FocusMove> {
        if host.overlay_active() {
            log::debug!("Click ignored while an overlay is open");
            return None;
        }
        let (node, tag) = resolve_interactive(world, ray)?;
        log::info!("Clicked on project {}", tag.project);
        host.project_selected(tag.project);

        let look_at = world
            .project_root(tag.project)
            .and_then(|root| world.world_position(root))
            .or_else(|| world.world_position(node))?;
        let angle = if self.config.azimuth_range > 0.0 {
            rng.random_range(0.0..self.config.azimuth_range)
        } else {
            0.0
        };
        let radius = self.config.focus_distance;
        let position = Point3::new(
            look_at.x + angle.cos() * radius,
            look_at.y + self.config.focus_elevation,
            look_at.z + angle.sin() * radius,
        );
        Some(FocusMove {
            project: tag.project,
            position,
            look_at,
        })
    }
}
