use cgmath::{InnerSpace, Point3, Vector3};
use folio_ngin::{
    data_structures::{
        instance::Instance,
        model::Material,
        scene_graph::{InteractiveTag, NodeId, NodeKind, SceneNode, World},
    },
    pick::{Ray, intersect_sphere, intersect_triangle, pick_project, raycast, resolve_interactive},
    resources::mesh,
};

fn ray_towards(from: [f32; 3], to: [f32; 3]) -> Ray {
    let origin = Point3::from(from);
    Ray::new(origin, (Point3::from(to) - origin).normalize())
}

/// Tagged group at `position` with an untagged sphere two levels below it.
fn add_project(world: &mut World, project: u32, position: [f32; 3]) -> NodeId {
    let sphere = world.add_mesh(mesh::uv_sphere(0.5, 12, 8));
    let root = world.add_node(
        SceneNode::new(format!("project-{project}"), NodeKind::Project)
            .with_local(Instance::from(Vector3::from(position))),
        None,
    );
    let group = world.add_node(SceneNode::new("group", NodeKind::Part), Some(root));
    world.add_node(
        SceneNode::new("body", NodeKind::Part).with_mesh(sphere, Material::default()),
        Some(group),
    );
    world.node_mut(root).expect("root exists").tag = Some(InteractiveTag { project });
    root
}

#[test]
fn should_hit_triangle_from_both_sides() {
    let triangle = [
        Point3::new(-1.0, -1.0, 0.0),
        Point3::new(1.0, -1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let front = ray_towards([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    let back = ray_towards([0.0, 0.0, -5.0], [0.0, 0.0, 0.0]);
    let miss = ray_towards([3.0, 0.0, 5.0], [3.0, 0.0, 0.0]);

    assert!((intersect_triangle(&front, triangle).expect("front hit") - 5.0).abs() < 1e-4);
    assert!((intersect_triangle(&back, triangle).expect("back hit") - 5.0).abs() < 1e-4);
    assert!(intersect_triangle(&miss, triangle).is_none());
}

#[test]
fn should_hit_sphere_at_near_side() {
    let ray = ray_towards([0.0, 0.0, 10.0], [0.0, 0.0, 0.0]);
    let t = intersect_sphere(&ray, Point3::new(0.0, 0.0, 0.0), 2.0).expect("hit");
    assert!((t - 8.0).abs() < 1e-4);

    let behind = ray_towards([0.0, 0.0, 10.0], [0.0, 0.0, 20.0]);
    assert!(intersect_sphere(&behind, Point3::new(0.0, 0.0, 0.0), 2.0).is_none());
}

#[test]
fn should_resolve_sub_part_hit_to_tagged_ancestor() {
    let mut world = World::new();
    let root = add_project(&mut world, 7, [0.0, 0.0, 0.0]);

    let ray = ray_towards([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    let hit = raycast(&world, &ray).expect("sphere is hit");
    assert_ne!(hit.node, root);

    let (node, tag) = resolve_interactive(&world, &ray).expect("resolves");
    assert_eq!(node, root);
    assert_eq!(tag.project, 7);
}

#[test]
fn should_miss_in_empty_sky() {
    let mut world = World::new();
    add_project(&mut world, 1, [0.0, 0.0, 0.0]);
    let ray = ray_towards([0.0, 0.0, 5.0], [0.0, 10.0, 5.0]);
    assert_eq!(pick_project(&world, &ray), None);
}

#[test]
fn should_pick_nearest_project() {
    let mut world = World::new();
    add_project(&mut world, 1, [0.0, 0.0, -3.0]);
    add_project(&mut world, 2, [0.0, 0.0, 0.0]);

    let ray = ray_towards([0.0, 0.0, 5.0], [0.0, 0.0, -10.0]);
    assert_eq!(pick_project(&world, &ray), Some(2));
}

#[test]
fn should_let_untagged_occluder_hide_project() {
    let mut world = World::new();
    add_project(&mut world, 1, [0.0, 0.0, 0.0]);
    let wall = world.add_mesh(mesh::plane(4.0, 4.0));
    // The plane lies in xz; stand it up facing the ray
    let upright = Instance::from(Vector3::new(0.0, 0.0, 2.0))
        .with_rotation(cgmath::Rotation3::from_angle_x(cgmath::Deg(90.0)));
    world.add_node(
        SceneNode::new("wall", NodeKind::Prop)
            .with_local(upright)
            .with_mesh(wall, Material::default()),
        None,
    );

    let ray = ray_towards([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    assert!(raycast(&world, &ray).is_some());
    assert_eq!(pick_project(&world, &ray), None);
}

#[test]
fn should_skip_hidden_subtrees() {
    let mut world = World::new();
    let root = add_project(&mut world, 3, [0.0, 0.0, 0.0]);
    world.node_mut(root).expect("root exists").visible = false;

    let ray = ray_towards([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    assert!(raycast(&world, &ray).is_none());
}

#[test]
fn should_follow_moved_nodes_after_transform_update() {
    let mut world = World::new();
    let root = add_project(&mut world, 4, [0.0, 0.0, 0.0]);
    world.node_mut(root).expect("root exists").local.position = Vector3::new(10.0, 0.0, 0.0);
    world.update_world_transforms();

    let old = ray_towards([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    let new = ray_towards([10.0, 0.0, 5.0], [10.0, 0.0, 0.0]);
    assert_eq!(pick_project(&world, &old), None);
    assert_eq!(pick_project(&world, &new), Some(4));
}

#[test]
fn should_give_up_on_overly_deep_chains() {
    let mut world = World::new();
    let sphere = world.add_mesh(mesh::uv_sphere(0.5, 12, 8));
    let root = world.add_node(SceneNode::new("root", NodeKind::Project), None);
    world.node_mut(root).expect("root exists").tag = Some(InteractiveTag { project: 9 });

    let mut parent = root;
    for i in 0..20 {
        parent = world.add_node(SceneNode::new(format!("link-{i}"), NodeKind::Part), Some(parent));
    }
    world.add_node(
        SceneNode::new("leaf", NodeKind::Part).with_mesh(sphere, Material::default()),
        Some(parent),
    );

    let ray = ray_towards([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    assert!(raycast(&world, &ray).is_some());
    assert_eq!(pick_project(&world, &ray), None);
}
