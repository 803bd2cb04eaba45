//! Portfolio configuration.
//!
//! Every tunable of the landing scene lives in [`PortfolioConfig`]. The
//! `Default` implementation reproduces the stock page; an optional
//! `portfolio.json` in the asset root can override any subset of fields.

use std::{collections::HashSet, f32::consts::PI};

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::resources::load_string;

/// File looked up in the asset root on startup.
pub const CONFIG_FILE: &str = "portfolio.json";

pub type ProjectId = u32;

/// Static record describing one showcased work.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProjectDescriptor {
    pub id: ProjectId,
    pub position: [f32; 3],
    /// Yaw in radians.
    pub rotation: f32,
    pub model: String,
    pub scale: f32,
}

impl ProjectDescriptor {
    pub fn new(id: ProjectId, position: [f32; 3], rotation: f32, model: &str, scale: f32) -> Self {
        Self {
            id,
            position,
            rotation,
            model: model.to_string(),
            scale,
        }
    }

    pub fn position(&self) -> cgmath::Point3<f32> {
        self.position.into()
    }
}

/// A camera position together with the point it looks at.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Pose {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
}

impl Pose {
    pub const fn new(position: [f32; 3], look_at: [f32; 3]) -> Self {
        Self { position, look_at }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fovy_deg: f32,
    pub znear: f32,
    pub zfar: f32,
    pub home: Pose,
    pub overview: Pose,
    /// Fraction of the remaining distance covered per frame.
    pub transition_speed: f32,
    pub position_threshold: f32,
    pub angle_threshold: f32,
    pub spotlight_secs: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_deg: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            home: Pose::new([3.0, 2.0, 5.0], [0.0, 0.0, 0.0]),
            overview: Pose::new([0.0, 6.0, 0.0], [0.0, 0.0, 0.0]),
            transition_speed: 0.05,
            position_threshold: 0.1,
            angle_threshold: 0.05,
            spotlight_secs: 2.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping: 0.05,
            rotate_speed: 0.8,
            zoom_speed: 1.2,
            pan_speed: 1.0,
            min_distance: 2.0,
            max_distance: 15.0,
            max_polar_angle: PI / 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub focus_distance: f32,
    pub focus_elevation: f32,
    /// Azimuths are drawn uniformly from `[0, azimuth_range)`.
    pub azimuth_range: f32,
    /// Pointer travel in pixels after which a press counts as a drag.
    pub drag_threshold_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            focus_distance: 2.5,
            focus_elevation: 1.5,
            azimuth_range: PI,
            drag_threshold_px: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub bob_amplitude: f32,
    /// Radians per second.
    pub spin_rate: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            bob_amplitude: 0.1,
            spin_rate: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub projects: Vec<ProjectDescriptor>,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub interaction: InteractionConfig,
    pub idle: IdleConfig,
    /// `0xRRGGBB`
    pub clear_colour: u32,
    pub model_dir: String,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            projects: vec![
                ProjectDescriptor::new(0, [-2.0, -1.0, -2.0], PI * 0.25, "cat", 3.5),
                ProjectDescriptor::new(1, [2.0, -1.0, -2.0], PI * 0.75, "cats", 0.1),
                ProjectDescriptor::new(2, [-2.0, -1.0, 2.0], PI * 1.25, "maxwell", 0.05),
                ProjectDescriptor::new(3, [2.0, -1.0, 2.0], PI * 1.75, "oiia", 2.5),
            ],
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            interaction: InteractionConfig::default(),
            idle: IdleConfig::default(),
            clear_colour: 0x111111,
            model_dir: "models".to_string(),
        }
    }
}

impl PortfolioConfig {
    /// Parse a JSON document. Fields that are absent keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("portfolio config is not valid JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads [`CONFIG_FILE`] from the asset root, falling back to the
    /// defaults when it is missing or invalid.
    pub async fn load() -> Self {
        let json = match load_string(CONFIG_FILE).await {
            Ok(json) => json,
            Err(e) => {
                log::info!("No {} found ({}), using the default portfolio", CONFIG_FILE, e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring {}: {:#}", CONFIG_FILE, e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.projects.is_empty() {
            bail!("at least one project is required");
        }
        if !(4..=5).contains(&self.projects.len()) {
            log::warn!(
                "The landing page is laid out for 4-5 projects, got {}",
                self.projects.len()
            );
        }
        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.id) {
                bail!("project id {} is used more than once", project.id);
            }
            if !(project.scale > 0.0) {
                bail!("project {} has a non-positive scale {}", project.id, project.scale);
            }
            if project.model.is_empty() {
                bail!("project {} has no model identifier", project.id);
            }
        }
        Ok(())
    }

    /// Resource path of a project's model, by convention.
    pub fn model_path(&self, descriptor: &ProjectDescriptor) -> String {
        format!("{}/{}/scene.gltf", self.model_dir, descriptor.model)
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b] = hex_to_rgb(self.clear_colour);
        wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        }
    }
}

/// Splits an sRGB `0xRRGGBB` colour into linear `[0, 1]` channels.
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    let linear = |channel: u32| {
        let c = (channel & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [linear(hex >> 16), linear(hex >> 8), linear(hex)]
}
