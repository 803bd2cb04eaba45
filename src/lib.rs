//! folio-ngin
//!
//! An interactive 3D landing scene for a developer portfolio. Each project
//! is a model floating over a small island; hovering highlights it, clicking
//! flies the camera over and tells the host page which project to show. The
//! same crate runs natively in a winit window and in the browser on a page
//! canvas through WebGL.
//!
//! High-level modules
//! - `config`: project table and tunables, loadable from JSON
//! - `data_structures`: scene graph, meshes, instances and the depth texture
//! - `resources`: asset fetching, glTF decoding and procedural meshes
//! - `scene`: static scene content (ground, lights, rocks, clouds, markers)
//! - `loader`: per-project model loading with placeholder fallback and progress
//! - `pick`: ray casting against the scene graph
//! - `interaction`: hover and click handling
//! - `camera` / `director`: orbit controls and scripted camera transitions
//! - `host`: bridge to the hosting page or window
//! - `portfolio`: all of the above wired into one headless unit
//! - `context`, `pipelines`, `render`, `flow`: GPU state, drawing and the event loop
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod director;
pub mod flow;
pub mod host;
pub mod interaction;
pub mod loader;
pub mod pick;
pub mod pipelines;
pub mod portfolio;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use config::{PortfolioConfig, ProjectDescriptor, ProjectId};
pub use host::{CameraCommand, HostPage};
pub use portfolio::Portfolio;
pub use winit::event::WindowEvent;
