//! Render pipelines and their uniforms.
//!
//! - `basic` builds the lit colour pipeline shared by every mesh
//! - `light` owns the light uniform mirrored from the world's lighting rig

pub mod basic;
pub mod light;
