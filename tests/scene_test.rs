use cgmath::{InnerSpace, Vector3};
use folio_ngin::{
    config::PortfolioConfig,
    data_structures::scene_graph::{NodeKind, World},
    scene::{CLOUD_WRAP, GROUND_HEIGHT, SceneBuilder},
};

#[test]
fn should_build_static_scene() {
    let config = PortfolioConfig::default();
    let mut world = World::new();
    let handles = SceneBuilder::new(&config).build(&mut world);

    let ground = world.node(handles.ground).expect("ground exists");
    assert_eq!(ground.kind, NodeKind::Ground);
    assert_eq!(ground.local.position.y, GROUND_HEIGHT);
    assert!(!handles.rocks.is_empty());
    assert!(!handles.clouds.is_empty());
    assert_eq!(handles.markers.len(), config.projects.len());

    // Nothing static is interactive
    assert!(world.nodes().all(|(_, node)| node.tag.is_none()));
    assert_eq!(world.project_roots().count(), 0);
}

#[test]
fn should_put_markers_under_projects() {
    let config = PortfolioConfig::default();
    let mut world = World::new();
    let handles = SceneBuilder::new(&config).build(&mut world);

    for (project, marker) in &handles.markers {
        let descriptor = config
            .projects
            .iter()
            .find(|p| p.id == *project)
            .expect("marker belongs to a project");
        let position = world.world_position(*marker).expect("marker placed");
        assert!((position.x - descriptor.position[0]).abs() < 1e-5);
        assert!((position.z - descriptor.position[2]).abs() < 1e-5);
        assert_eq!(world.node(*marker).map(|n| n.kind), Some(NodeKind::Marker));
    }
}

#[test]
fn should_keep_rocks_clear_of_projects() {
    let config = PortfolioConfig::default();
    let mut world = World::new();
    let handles = SceneBuilder::new(&config).build(&mut world);

    for rock in &handles.rocks {
        let position = world.world_position(*rock).expect("rock placed");
        let horizontal = Vector3::new(position.x, 0.0, position.z).magnitude();
        assert!(horizontal >= 4.5 - 1e-4, "rock at {:?} is inside the project area", position);
    }
}

#[test]
fn should_be_deterministic_for_a_seed() {
    let config = PortfolioConfig::default();
    let positions = |seed: u64| {
        let mut world = World::new();
        let handles = SceneBuilder::new(&config).with_seed(seed).build(&mut world);
        handles
            .rocks
            .iter()
            .filter_map(|&rock| world.world_position(rock))
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(11), positions(11));
    assert_ne!(positions(11), positions(12));
}

#[test]
fn should_wrap_clouds_and_orbit_light() {
    let config = PortfolioConfig::default();
    let mut world = World::new();
    let handles = SceneBuilder::new(&config).build(&mut world);

    for cloud in &handles.clouds {
        for t in [0.0, 10.0, 100.0, 1000.0] {
            let position = cloud.position_at(t);
            assert!(position.x >= -CLOUD_WRAP && position.x < CLOUD_WRAP);
            assert_eq!(position.y, cloud.start.y);
            assert_eq!(position.z, cloud.start.z);
        }
    }

    for t in [0.0, 1.0, 7.5] {
        handles.animate(&mut world, t, 0.0);
        let light = world.lighting.point_position;
        let radius = Vector3::new(light.x, 0.0, light.z).magnitude();
        assert!((radius - handles.light.radius).abs() < 1e-4);
        assert_eq!(light.y, handles.light.height);
    }
}

#[test]
fn should_brighten_markers_with_spotlight() {
    let config = PortfolioConfig::default();
    let mut world = World::new();
    let handles = SceneBuilder::new(&config).build(&mut world);
    let (_, marker) = handles.markers[0];

    handles.animate(&mut world, 0.0, 0.0);
    let idle = world.node(marker).expect("marker").material.emissive;
    handles.animate(&mut world, 0.0, 1.0);
    let lit = world.node(marker).expect("marker").material.emissive;
    handles.animate(&mut world, 0.0, 0.0);
    let after = world.node(marker).expect("marker").material.emissive;

    assert!(lit > idle);
    assert_eq!(after, idle);
}
