//! Loading models and config files from the asset root.
//!
//! Natively the asset root is `./assets`, on the web it is `{origin}/assets/`.
//! glTF documents are decoded into a GPU-independent [`ModelAsset`] that the
//! loader then instantiates into the world.

use std::collections::HashMap;

use anyhow::{Context, bail};

use crate::data_structures::{
    instance::Instance,
    model::{Material, MeshData},
};

pub mod mesh;

/// Depth limit for glTF node trees; deeper branches are dropped.
const MAX_NODE_DEPTH: usize = 64;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window available")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("could not read page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn asset_path(file_name: &str) -> std::path::PathBuf {
    std::path::Path::new("./").join("assets").join(file_name)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = std::fs::read_to_string(asset_path(file_name))
        .with_context(|| format!("could not read {file_name}"))?;

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = std::fs::read(asset_path(file_name))
        .with_context(|| format!("could not read {file_name}"))?;

    Ok(data)
}

/// A decoded model: shared meshes plus the node tree that places them.
#[derive(Clone, Debug)]
pub struct ModelAsset {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub roots: Vec<AssetNode>,
}

#[derive(Clone, Debug)]
pub struct AssetNode {
    pub name: String,
    pub local: Instance,
    /// Index into [`ModelAsset::meshes`] and the material to draw it with.
    pub mesh: Option<(usize, Material)>,
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: Instance::new(),
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn part(name: impl Into<String>, mesh: usize, material: Material) -> Self {
        Self {
            mesh: Some((mesh, material)),
            ..Self::group(name)
        }
    }

    pub fn with_local(mut self, local: Instance) -> Self {
        self.local = local;
        self
    }
}

impl ModelAsset {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    /// Decodes an already fetched glTF document. `buffers` must hold the
    /// data of every buffer in document order.
    pub fn from_gltf(
        name: &str,
        document: &gltf::Document,
        buffers: &[Vec<u8>],
    ) -> anyhow::Result<Self> {
        let mut decoder = Decoder {
            buffers,
            meshes: Vec::new(),
            cache: HashMap::new(),
        };
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .context("glTF document has no scene")?;
        let roots = scene
            .nodes()
            .map(|node| decoder.node(node, 0))
            .collect::<Vec<_>>();

        let asset = Self {
            name: name.to_string(),
            meshes: decoder.meshes,
            roots,
        };
        if asset.triangle_count() == 0 {
            bail!("{name} contains no drawable triangles");
        }
        Ok(asset)
    }

    /// Decodes a self-contained glTF (GLB or JSON with only embedded binary data).
    pub fn from_slice(name: &str, bytes: &[u8]) -> anyhow::Result<Self> {
        let gltf = gltf::Gltf::from_slice(bytes).with_context(|| format!("could not parse {name}"))?;
        let mut buffers = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    let blob = gltf.blob.clone().context("GLB binary chunk missing")?;
                    buffers.push(blob);
                }
                gltf::buffer::Source::Uri(uri) => {
                    bail!("{name} references external buffer {uri}")
                }
            }
        }
        Self::from_gltf(name, &gltf.document, &buffers)
    }
}

/// Fetches `file_name` and every external buffer it references, then decodes it.
pub async fn load_model_gltf(file_name: &str) -> anyhow::Result<ModelAsset> {
    let bytes = load_binary(file_name).await?;
    let gltf =
        gltf::Gltf::from_slice(&bytes).with_context(|| format!("could not parse {file_name}"))?;
    let base_dir = file_name
        .rsplit_once('/')
        .map(|(dir, _)| format!("{dir}/"))
        .unwrap_or_default();

    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf.blob.clone().context("GLB binary chunk missing")?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                bail!("{file_name}: embedded data URIs are not supported")
            }
            gltf::buffer::Source::Uri(uri) => load_binary(&format!("{base_dir}{uri}"))
                .await
                .with_context(|| format!("could not load buffer {uri} of {file_name}"))?,
        };
        if data.len() < buffer.length() {
            bail!(
                "buffer {} of {file_name} is truncated ({} < {} bytes)",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        buffers.push(data);
    }
    ModelAsset::from_gltf(file_name, &gltf.document, &buffers)
}

struct Decoder<'a> {
    buffers: &'a [Vec<u8>],
    meshes: Vec<MeshData>,
    /// (mesh index, primitive index) -> index into `meshes`
    cache: HashMap<(usize, usize), usize>,
}

impl Decoder<'_> {
    fn node(&mut self, node: gltf::Node, depth: usize) -> AssetNode {
        let (translation, rotation, scale) = node.transform().decomposed();
        let local = Instance {
            position: translation.into(),
            rotation: rotation.into(),
            scale: scale.into(),
        };
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node{}", node.index()));
        let mut asset_node = AssetNode::group(name).with_local(local);

        // Each primitive becomes its own part so it can keep its own material
        if let Some(gltf_mesh) = node.mesh() {
            let mut parts = gltf_mesh
                .primitives()
                .filter_map(|primitive| self.primitive(&gltf_mesh, primitive))
                .collect::<Vec<_>>();
            if parts.len() == 1 {
                asset_node.mesh = parts.pop().and_then(|part| part.mesh);
            } else {
                asset_node.children.append(&mut parts);
            }
        }

        if depth >= MAX_NODE_DEPTH {
            log::warn!("glTF node {} is nested too deep, dropping its children", node.index());
            return asset_node;
        }
        for child in node.children() {
            let child = self.node(child, depth + 1);
            asset_node.children.push(child);
        }
        asset_node
    }

    fn primitive(
        &mut self,
        gltf_mesh: &gltf::Mesh,
        primitive: gltf::Primitive,
    ) -> Option<AssetNode> {
        let mesh_name = gltf_mesh.name().unwrap_or("unknown_mesh").to_string();
        let material = {
            let gltf_material = primitive.material();
            Material {
                base_colour: gltf_material.pbr_metallic_roughness().base_color_factor(),
                emissive: gltf_material.emissive_factor().into_iter().fold(0.0, f32::max),
            }
        };
        let key = (gltf_mesh.index(), primitive.index());
        if let Some(&index) = self.cache.get(&key) {
            return Some(AssetNode::part(mesh_name, index, material));
        }
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping {mesh_name}: primitive mode {:?} is not supported", primitive.mode());
            return None;
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let Some(positions) = reader.read_positions() else {
            log::warn!("Skipping {mesh_name}: primitive has no positions");
            return None;
        };
        let positions = positions.collect::<Vec<[f32; 3]>>();
        let normals = reader.read_normals().map(|n| n.collect::<Vec<[f32; 3]>>());
        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect::<Vec<u32>>(),
            None => (0..positions.len() as u32).collect(),
        };
        let vertex_count = positions.len() as u32;
        let indices = indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| i < vertex_count))
            .flatten()
            .copied()
            .collect::<Vec<u32>>();
        if indices.is_empty() {
            return None;
        }

        let index = self.meshes.len();
        self.meshes
            .push(MeshData::new(mesh_name.clone(), positions, normals, indices));
        self.cache.insert(key, index);
        Some(AssetNode::part(mesh_name, index, material))
    }
}
