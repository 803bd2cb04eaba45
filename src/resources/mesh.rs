//! Procedural primitives for the static scene and for placeholder models.
//!
//! All meshes are wound counter-clockwise when seen from outside and are
//! centred on their local origin.

use std::f32::consts::{PI, TAU};

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::data_structures::model::MeshData;

/// Flat rectangle in the XZ plane facing +y.
pub fn plane(width: f32, depth: f32) -> MeshData {
    let (w, d) = (width * 0.5, depth * 0.5);
    let positions = vec![[-w, 0.0, -d], [-w, 0.0, d], [w, 0.0, d], [w, 0.0, -d]];
    let normals = vec![[0.0, 1.0, 0.0]; 4];
    MeshData::new("plane", positions, Some(normals), vec![0, 1, 2, 0, 2, 3])
}

pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut positions = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    for i in 0..=rings {
        let theta = PI * i as f32 / rings as f32;
        for j in 0..=segments {
            let phi = TAU * j as f32 / segments as f32;
            let n = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            normals.push(n);
            positions.push([n[0] * radius, n[1] * radius, n[2] * radius]);
        }
    }
    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for i in 0..rings {
        for j in 0..segments {
            let a = i * stride + j;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    MeshData::new("sphere", positions, Some(normals), indices)
}

/// Cone standing on +y, centred on half its height.
pub fn cone(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let (top, bottom) = (height * 0.5, -height * 0.5);
    let rim = |j: u32| {
        let phi = TAU * j as f32 / segments as f32;
        [radius * phi.cos(), bottom, radius * phi.sin()]
    };
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    // Each side face gets its own vertices so the base stays sharp
    for j in 0..segments {
        let base = positions.len() as u32;
        positions.extend_from_slice(&[rim(j), [0.0, top, 0.0], rim(j + 1)]);
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    let centre = positions.len() as u32;
    positions.push([0.0, bottom, 0.0]);
    for j in 0..segments {
        let base = positions.len() as u32;
        positions.extend_from_slice(&[rim(j), rim(j + 1)]);
        indices.extend_from_slice(&[centre, base, base + 1]);
    }
    MeshData::new("cone", positions, None, indices)
}

/// Flat annulus in the XZ plane facing +y.
pub fn ring(inner: f32, outer: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut positions = Vec::with_capacity((segments * 2) as usize);
    for j in 0..segments {
        let phi = TAU * j as f32 / segments as f32;
        let (c, s) = (phi.cos(), phi.sin());
        positions.push([inner * c, 0.0, inner * s]);
        positions.push([outer * c, 0.0, outer * s]);
    }
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
    let mut indices = Vec::with_capacity((segments * 6) as usize);
    for j in 0..segments {
        let i0 = j * 2;
        let o0 = i0 + 1;
        let i1 = ((j + 1) % segments) * 2;
        let o1 = i1 + 1;
        indices.extend_from_slice(&[i0, o1, o0, i0, i1, o1]);
    }
    MeshData::new("ring", positions, Some(normals), indices)
}

const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Lumpy, squashed icosahedron. The same `seed` always yields the same rock.
pub fn rock(radius: f32, seed: u64) -> MeshData {
    let t = (1.0 + 5.0f32.sqrt()) * 0.5;
    let corners = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let mut rng = SmallRng::seed_from_u64(seed);
    let len = (1.0 + t * t).sqrt();
    let positions = corners
        .iter()
        .map(|c: &[f32; 3]| {
            let jitter = 1.0 + rng.random_range(-0.25..0.25);
            let s = radius * jitter / len;
            [c[0] * s, c[1] * s * 0.6, c[2] * s]
        })
        .collect();
    let indices = ICOSAHEDRON_FACES.iter().flatten().copied().collect();
    MeshData::new("rock", positions, None, indices)
}
