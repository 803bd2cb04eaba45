#![allow(dead_code)]

use cgmath::{InnerSpace, Point3};
use folio_ngin::{
    camera::{Camera, Projection},
    config::{PortfolioConfig, ProjectDescriptor, ProjectId},
    host::HostPage,
};

/// Host that records every effect instead of touching a page.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub overlay: bool,
    pub progress: Vec<u32>,
    pub completions: u32,
    pub selected: Vec<ProjectId>,
    pub hover_writes: Vec<bool>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlay() -> Self {
        Self {
            overlay: true,
            ..Self::default()
        }
    }
}

impl HostPage for RecordingHost {
    fn overlay_active(&self) -> bool {
        self.overlay
    }

    fn set_progress(&mut self, percent: u32) {
        self.progress.push(percent);
    }

    fn loading_complete(&mut self) {
        self.completions += 1;
    }

    fn project_selected(&mut self, project: ProjectId) {
        self.selected.push(project);
    }

    fn set_hovering(&mut self, hovering: bool) {
        self.hover_writes.push(hovering);
    }
}

pub(crate) fn descriptors(count: u32) -> Vec<ProjectDescriptor> {
    (0..count)
        .map(|id| {
            let angle = id as f32 * std::f32::consts::TAU / count.max(1) as f32;
            ProjectDescriptor::new(
                id,
                [angle.cos() * 2.0, -1.0, angle.sin() * 2.0],
                0.0,
                &format!("model-{id}"),
                1.0,
            )
        })
        .collect()
}

pub(crate) fn config_with(projects: Vec<ProjectDescriptor>) -> PortfolioConfig {
    PortfolioConfig {
        projects,
        ..PortfolioConfig::default()
    }
}

/// Pixel on a `size` surface that `point` is drawn at, the inverse of
/// [`Camera::cast_ray_from_mouse`].
pub(crate) fn pixel_for(
    camera: &Camera,
    projection: &Projection,
    size: (u32, u32),
    point: Point3<f32>,
) -> (f64, f64) {
    let forward = camera.forward();
    let up_hint = if forward.cross(camera.up).magnitude2() < 1e-8 {
        -cgmath::Vector3::unit_z()
    } else {
        camera.up
    };
    let right = forward.cross(up_hint).normalize();
    let up = right.cross(forward);
    let d = point - camera.position;
    let depth = d.dot(forward);
    let half_height = (projection.fovy.0 * 0.5).tan();
    let half_width = half_height * projection.aspect;
    let ndc_x = d.dot(right) / depth / half_width;
    let ndc_y = d.dot(up) / depth / half_height;
    (
        ((ndc_x + 1.0) * 0.5 * size.0 as f32) as f64,
        ((1.0 - ndc_y) * 0.5 * size.1 as f32) as f64,
    )
}

/// Self-contained GLB with one unit quad (two triangles in the xy plane,
/// facing +z) under a parent node at `translation`. The quad sits on an
/// unnamed child node so hits land below the root.
pub(crate) fn quad_glb(translation: [f32; 3], colour: [f32; 4]) -> Vec<u8> {
    let positions: [[f32; 3]; 4] = [
        [-0.5, -0.5, 0.0],
        [0.5, -0.5, 0.0],
        [0.5, 0.5, 0.0],
        [-0.5, 0.5, 0.0],
    ];
    let indices: [u32; 6] = [0, 1, 2, 0, 2, 3];

    let mut bin = Vec::new();
    for p in positions {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let index_offset = bin.len();
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let json = serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "root", "translation": translation, "children": [1] },
            { "mesh": 0 }
        ],
        "meshes": [{
            "name": "quad",
            "primitives": [{
                "attributes": { "POSITION": 0 },
                "indices": 1,
                "material": 0
            }]
        }],
        "materials": [{
            "pbrMetallicRoughness": { "baseColorFactor": colour },
            "emissiveFactor": [0.0, 0.5, 0.0]
        }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": index_offset },
            { "buffer": 0, "byteOffset": index_offset, "byteLength": bin.len() - index_offset }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 4,
                "type": "VEC3",
                "min": [-0.5, -0.5, 0.0],
                "max": [0.5, 0.5, 0.0]
            },
            {
                "bufferView": 1,
                "componentType": 5125,
                "count": 6,
                "type": "SCALAR"
            }
        ]
    });
    glb(&json, bin)
}

/// Valid glTF with a scene but nothing to draw.
pub(crate) fn empty_glb() -> Vec<u8> {
    let json = serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "lonely" }]
    });
    glb(&json, Vec::new())
}

/// Wraps a JSON document and an optional binary chunk in a GLB container.
pub(crate) fn glb(json: &serde_json::Value, mut bin: Vec<u8>) -> Vec<u8> {
    let mut json = serde_json::to_vec(json).expect("json serializes");
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let mut total = 12 + 8 + json.len();
    if !bin.is_empty() {
        total += 8 + bin.len();
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    if !bin.is_empty() {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
    }
    out
}
