use anyhow::anyhow;
use folio_ngin::{
    data_structures::scene_graph::{NodeKind, World},
    loader::{AssetLoader, placeholder_model},
    resources::ModelAsset,
};

use crate::common::test_utils::{RecordingHost, descriptors, quad_glb};

mod common;

fn quad() -> anyhow::Result<ModelAsset> {
    ModelAsset::from_slice("quad.glb", &quad_glb([0.0; 3], [1.0; 4]))
}

#[test]
fn should_complete_once_after_every_project_settled() {
    let projects = descriptors(5);
    let mut world = World::new();
    let mut host = RecordingHost::new();
    let mut loader = AssetLoader::new(&projects);
    loader.begin(&mut host);

    // Out of order, two failures
    for &index in &[3usize, 0, 4, 1, 2] {
        let result = if index == 1 || index == 4 {
            Err(anyhow!("network error"))
        } else {
            quad()
        };
        assert_eq!(host.completions, 0);
        let root = loader.settle(&mut world, &projects[index], result, &mut host);
        assert!(root.is_some());
    }

    assert!(loader.is_complete());
    assert_eq!(host.completions, 1);
    assert_eq!(host.progress, vec![0, 20, 40, 60, 80, 100]);
}

#[test]
fn should_complete_even_when_everything_fails() {
    let projects = descriptors(3);
    let mut world = World::new();
    let mut host = RecordingHost::new();
    let mut loader = AssetLoader::new(&projects);
    loader.begin(&mut host);

    for project in &projects {
        loader.settle(&mut world, project, Err(anyhow!("404")), &mut host);
    }

    assert_eq!(host.completions, 1);
    assert_eq!(world.project_roots().count(), 3);
    assert_eq!(host.progress.last(), Some(&100));
}

#[test]
fn should_ignore_duplicate_settle() {
    let projects = descriptors(2);
    let mut world = World::new();
    let mut host = RecordingHost::new();
    let mut loader = AssetLoader::new(&projects);

    assert!(loader.settle(&mut world, &projects[0], quad(), &mut host).is_some());
    let nodes = world.len();
    assert!(loader.settle(&mut world, &projects[0], quad(), &mut host).is_none());

    assert_eq!(world.len(), nodes);
    assert_eq!(loader.settled_count(), 1);
    assert_eq!(host.progress, vec![50]);
    assert_eq!(host.completions, 0);
}

#[test]
fn should_ignore_unknown_project() {
    let projects = descriptors(2);
    let stranger = descriptors(3).pop().expect("three descriptors");
    let mut world = World::new();
    let mut host = RecordingHost::new();
    let mut loader = AssetLoader::new(&projects);

    assert!(loader.settle(&mut world, &stranger, quad(), &mut host).is_none());
    assert!(world.is_empty());
    assert!(host.progress.is_empty());
}

#[test]
fn should_complete_immediately_without_projects() {
    let mut host = RecordingHost::new();
    let mut loader = AssetLoader::new(&[]);
    loader.begin(&mut host);
    assert!(loader.is_complete());
    assert_eq!(host.completions, 1);
}

#[test]
fn should_place_and_tag_every_part() {
    let projects = descriptors(4);
    let mut world = World::new();
    let mut host = RecordingHost::new();
    let mut loader = AssetLoader::new(&projects);

    for (i, project) in projects.iter().enumerate() {
        let result = if i % 2 == 0 { quad() } else { Err(anyhow!("decode error")) };
        loader.settle(&mut world, project, result, &mut host);
    }

    for project in &projects {
        let roots = world
            .project_roots()
            .filter(|(_, node)| node.tag.map(|t| t.project) == Some(project.id))
            .collect::<Vec<_>>();
        assert_eq!(roots.len(), 1, "project {} has one root", project.id);

        let (root, node) = roots[0];
        assert_eq!(node.kind, NodeKind::Project);
        assert_eq!(node.base_height, Some(project.position[1]));
        let position = world.world_position(root).expect("root has a transform");
        assert!((position.x - project.position[0]).abs() < 1e-5);
        assert!((position.y - project.position[1]).abs() < 1e-5);
        assert!((position.z - project.position[2]).abs() < 1e-5);

        for id in world.descendants(root) {
            let part = world.node(id).expect("descendant exists");
            assert_eq!(part.tag.map(|t| t.project), Some(project.id));
        }
    }
}

#[test]
fn should_scale_loaded_models_but_not_placeholders() {
    let mut projects = descriptors(2);
    projects[0].scale = 3.0;
    projects[1].scale = 3.0;
    let mut world = World::new();
    let mut host = RecordingHost::new();
    let mut loader = AssetLoader::new(&projects);

    let loaded = loader
        .settle(&mut world, &projects[0], quad(), &mut host)
        .expect("settles");
    let fallback = loader
        .settle(&mut world, &projects[1], Err(anyhow!("missing")), &mut host)
        .expect("settles");

    assert_eq!(world.node(loaded).map(|n| n.local.scale.x), Some(3.0));
    assert_eq!(world.node(fallback).map(|n| n.local.scale.x), Some(1.0));
}

#[test]
fn should_build_placeholder_cat_from_palette() {
    let first = placeholder_model(0);
    let fifth = placeholder_model(4);
    let second = placeholder_model(1);

    assert_eq!(first.meshes.len(), 3);
    assert!(first.triangle_count() > 0);
    let parts = &first.roots[0].children;
    assert_eq!(parts.len(), 4);

    let colour = |asset: &ModelAsset| asset.roots[0].children[0].mesh.map(|(_, m)| m.base_colour);
    assert_eq!(colour(&first), colour(&fifth));
    assert_ne!(colour(&first), colour(&second));
}
