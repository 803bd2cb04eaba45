//! Engine data structures: meshes, instances, textures and the scene graph.
//!
//! - `model` contains CPU meshes, flat materials and their GPU counterparts
//! - `texture` wraps the depth buffer
//! - `instance` holds per-node transformation data and its GPU layout
//! - `scene_graph` is the world container shared by every component

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
