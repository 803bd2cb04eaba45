use cgmath::{InnerSpace, MetricSpace, Point3, Vector3};
use folio_ngin::{
    config::InteractionConfig,
    data_structures::{
        instance::Instance,
        model::Material,
        scene_graph::{InteractiveTag, NodeKind, SceneNode, World},
    },
    interaction::PointerInteraction,
    pick::Ray,
    resources::mesh,
};
use rand::{SeedableRng, rngs::SmallRng};

use crate::common::test_utils::RecordingHost;

mod common;

fn world_with_project(project: u32, position: [f32; 3]) -> World {
    let mut world = World::new();
    let sphere = world.add_mesh(mesh::uv_sphere(0.5, 12, 8));
    let root = world.add_node(
        SceneNode::new("project", NodeKind::Project)
            .with_local(Instance::from(Vector3::from(position))),
        None,
    );
    world.add_node(
        SceneNode::new("body", NodeKind::Part).with_mesh(sphere, Material::default()),
        Some(root),
    );
    world.tag_subtree(root, InteractiveTag { project });
    world
}

fn ray_at(target: [f32; 3]) -> Ray {
    let origin = Point3::new(0.0, 3.0, 8.0);
    Ray::new(origin, (Point3::from(target) - origin).normalize())
}

fn sky() -> Ray {
    Ray::new(Point3::new(0.0, 3.0, 8.0), Vector3::unit_y())
}

#[test]
fn should_only_write_hover_on_change() {
    let world = world_with_project(1, [0.0, 0.0, 0.0]);
    let mut host = RecordingHost::new();
    let mut pointer = PointerInteraction::new(InteractionConfig::default());

    pointer.on_pointer_move((10.0, 10.0), &sky(), &world, &mut host);
    pointer.on_pointer_move((20.0, 10.0), &ray_at([0.0; 3]), &world, &mut host);
    pointer.on_pointer_move((21.0, 10.0), &ray_at([0.0; 3]), &world, &mut host);
    pointer.on_pointer_move((90.0, 10.0), &sky(), &world, &mut host);

    assert_eq!(host.hover_writes, vec![true, false]);
    assert!(!pointer.is_hovering());
}

#[test]
fn should_select_project_and_focus_on_it() {
    let target = [2.0, -1.0, 2.0];
    let world = world_with_project(3, target);
    let mut host = RecordingHost::new();
    let mut pointer = PointerInteraction::new(InteractionConfig::default());
    let mut rng = SmallRng::seed_from_u64(17);

    let focus = pointer
        .on_click(&ray_at(target), &world, &mut host, &mut rng)
        .expect("click lands on the project");

    assert_eq!(host.selected, vec![3]);
    assert_eq!(focus.project, 3);
    assert_eq!(focus.look_at, Point3::from(target));

    let offset = focus.position - focus.look_at;
    assert!((offset.y - 1.5).abs() < 1e-5);
    let horizontal = Vector3::new(offset.x, 0.0, offset.z).magnitude();
    assert!((horizontal - 2.5).abs() < 1e-4);
    // Azimuth in [0, pi) puts the camera on the +z side
    assert!(offset.z >= -1e-5);
}

#[test]
fn should_vary_approach_angle_between_clicks() {
    let target = [0.0, 0.0, 0.0];
    let world = world_with_project(0, target);
    let mut host = RecordingHost::new();
    let mut pointer = PointerInteraction::new(InteractionConfig::default());
    let mut rng = SmallRng::seed_from_u64(3);

    let positions = (0..8)
        .filter_map(|_| pointer.on_click(&ray_at(target), &world, &mut host, &mut rng))
        .map(|focus| focus.position)
        .collect::<Vec<_>>();

    assert_eq!(positions.len(), 8);
    assert!(positions.iter().any(|p| p.distance(positions[0]) > 1e-3));
}

#[test]
fn should_ignore_click_on_nothing() {
    let world = world_with_project(0, [0.0; 3]);
    let mut host = RecordingHost::new();
    let mut pointer = PointerInteraction::new(InteractionConfig::default());
    let mut rng = SmallRng::seed_from_u64(1);

    assert!(pointer.on_click(&sky(), &world, &mut host, &mut rng).is_none());
    assert!(host.selected.is_empty());
}

#[test]
fn should_do_nothing_while_overlay_is_open() {
    let target = [0.0, 0.0, 0.0];
    let world = world_with_project(5, target);
    let mut host = RecordingHost::with_overlay();
    let mut pointer = PointerInteraction::new(InteractionConfig::default());
    let mut rng = SmallRng::seed_from_u64(1);

    pointer.on_pointer_move((50.0, 50.0), &ray_at(target), &world, &mut host);
    let focus = pointer.on_click(&ray_at(target), &world, &mut host, &mut rng);

    assert!(focus.is_none());
    assert!(host.hover_writes.is_empty());
    assert!(host.selected.is_empty());
    assert!(!pointer.is_hovering());
}

#[test]
fn should_tell_clicks_from_drags() {
    let world = World::new();
    let mut host = RecordingHost::new();
    let mut pointer = PointerInteraction::new(InteractionConfig::default());

    pointer.on_pointer_down((100.0, 100.0));
    pointer.on_pointer_move((102.0, 101.0), &sky(), &world, &mut host);
    assert!(pointer.on_pointer_up((102.0, 101.0)));

    pointer.on_pointer_down((100.0, 100.0));
    pointer.on_pointer_move((140.0, 100.0), &sky(), &world, &mut host);
    pointer.on_pointer_move((100.0, 100.0), &sky(), &world, &mut host);
    assert!(!pointer.on_pointer_up((100.0, 100.0)));

    // Release without a press
    assert!(!pointer.on_pointer_up((100.0, 100.0)));
}
