use folio_ngin::{
    data_structures::{
        model::Material,
        scene_graph::{NodeKind, SceneNode, World},
    },
    render::collect_batches,
    resources::mesh,
};

#[test]
fn should_batch_instances_by_mesh() {
    let mut world = World::new();
    let sphere = world.add_mesh(mesh::uv_sphere(1.0, 8, 6));
    let cone = world.add_mesh(mesh::cone(0.5, 1.0, 6));

    let group = world.add_node(SceneNode::new("group", NodeKind::Prop), None);
    for i in 0..3 {
        world.add_node(
            SceneNode::new(format!("sphere-{i}"), NodeKind::Prop).with_mesh(sphere, Material::default()),
            Some(group),
        );
    }
    world.add_node(
        SceneNode::new("cone", NodeKind::Prop).with_mesh(cone, Material::default()),
        None,
    );

    let (batches, instances) = collect_batches(&world);
    assert_eq!(instances.len(), 4);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].mesh, sphere);
    assert_eq!(batches[0].instances, 0..3);
    assert_eq!(batches[1].mesh, cone);
    assert_eq!(batches[1].instances, 3..4);
}

#[test]
fn should_skip_hidden_subtrees() {
    let mut world = World::new();
    let sphere = world.add_mesh(mesh::uv_sphere(1.0, 8, 6));
    let hidden = world.add_node(SceneNode::new("hidden", NodeKind::Prop), None);
    world.add_node(
        SceneNode::new("child", NodeKind::Prop).with_mesh(sphere, Material::default()),
        Some(hidden),
    );
    world.add_node(
        SceneNode::new("shown", NodeKind::Prop).with_mesh(sphere, Material::default()),
        None,
    );
    world.node_mut(hidden).expect("exists").visible = false;

    let (batches, instances) = collect_batches(&world);
    assert_eq!(instances.len(), 1);
    assert_eq!(batches.len(), 1);
}

#[test]
fn should_draw_nothing_for_empty_world() {
    let (batches, instances) = collect_batches(&World::new());
    assert!(batches.is_empty());
    assert!(instances.is_empty());
}
