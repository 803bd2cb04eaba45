//! Scripted camera transitions.
//!
//! The [`CameraDirector`] owns one pending target pose. Every frame it moves
//! the camera and the orbit look-at a fixed fraction of the remaining way
//! towards it. A new request overwrites the pending one, it is never queued.

use cgmath::{InnerSpace, MetricSpace, Point3};

use crate::{
    camera::{Camera, OrbitController},
    config::{CameraConfig, Pose},
};

#[derive(Debug, Clone)]
pub struct CameraDirector {
    target_position: Point3<f32>,
    target_look_at: Point3<f32>,
    transitioning: bool,
    config: CameraConfig,
    spotlight_left: f32,
}

impl CameraDirector {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            target_position: config.home.position.into(),
            target_look_at: config.home.look_at.into(),
            transitioning: false,
            config,
            spotlight_left: 0.0,
        }
    }

    /// Starts (or retargets) a transition to `position` looking at `look_at`.
    pub fn move_to(&mut self, position: Point3<f32>, look_at: Point3<f32>) {
        if self.transitioning {
            log::debug!("Camera transition retargeted to {:?}", position);
        }
        self.target_position = position;
        self.target_look_at = look_at;
        self.transitioning = true;
    }

    pub fn move_to_pose(&mut self, pose: Pose) {
        self.move_to(pose.position.into(), pose.look_at.into());
    }

    pub fn reset_view(&mut self) {
        log::info!("Camera reset to the default position");
        self.move_to_pose(self.config.home);
    }

    /// Top-down view of every project, with the markers lit up for a while.
    pub fn overview(&mut self) {
        log::info!("Camera moved to the overview position");
        self.move_to_pose(self.config.overview);
        self.spotlight_left = self.config.spotlight_secs;
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn target(&self) -> (Point3<f32>, Point3<f32>) {
        (self.target_position, self.target_look_at)
    }

    /// `1.0` right after [`Self::overview`], fading linearly to `0.0`.
    pub fn spotlight_strength(&self) -> f32 {
        if self.config.spotlight_secs <= 0.0 {
            return 0.0;
        }
        (self.spotlight_left / self.config.spotlight_secs).clamp(0.0, 1.0)
    }

    /// Advances the transition by one frame. Returns true on the frame it finishes.
    pub fn update(&mut self, camera: &mut Camera, controller: &mut OrbitController, dt: f32) -> bool {
        self.spotlight_left = (self.spotlight_left - dt).max(0.0);
        if !self.transitioning {
            return false;
        }

        let speed = self.config.transition_speed.clamp(0.0, 1.0);
        camera.position += (self.target_position - camera.position) * speed;
        controller.target += (self.target_look_at - controller.target) * speed;
        camera.target = controller.target;

        let position_distance = camera.position.distance(self.target_position);
        let to_target = self.target_look_at - camera.position;
        let look_angle = if to_target.magnitude2() > f32::EPSILON {
            camera.forward().angle(to_target.normalize()).0
        } else {
            0.0
        };

        if position_distance < self.config.position_threshold
            && look_angle < self.config.angle_threshold
        {
            controller.target = self.target_look_at;
            camera.target = self.target_look_at;
            self.transitioning = false;
            log::debug!("Camera transition finished");
            return true;
        }
        false
    }
}
