//! Integration tests for dirty propagation and tracker flushing

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use dirty_transform::foundation::math::constants::HALF_PI;
use dirty_transform::prelude::*;

/// root -> a -> a2, root -> b -> b2, attached to a fresh tracker and flushed
struct Scene {
    graph: SceneGraph,
    tracker: DirtyTracker,
    root: NodeId,
    a: NodeId,
    a2: NodeId,
    b: NodeId,
    b2: NodeId,
}

impl Scene {
    fn new() -> Self {
        Self::with_tracker(DirtyTracker::new())
    }

    fn with_tracker(tracker: DirtyTracker) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root");
        let a = graph.create_node("a");
        let a2 = graph.create_node("a2");
        let b = graph.create_node("b");
        let b2 = graph.create_node("b2");
        graph.add_child(root, a).unwrap();
        graph.add_child(a, a2).unwrap();
        graph.add_child(root, b).unwrap();
        graph.add_child(b, b2).unwrap();

        attach_subtree(&mut graph, root, Some(tracker.clone())).unwrap();
        tracker.update_all(&mut graph);

        Self { graph, tracker, root, a, a2, b, b2 }
    }

    fn all(&self) -> [NodeId; 5] {
        [self.root, self.a, self.a2, self.b, self.b2]
    }

    fn node(&self, id: NodeId) -> &SceneNode {
        self.graph.node(id).unwrap()
    }
}

#[derive(Default)]
struct Recorder {
    transforms: Rc<RefCell<Vec<NodeId>>>,
    bounds: Rc<RefCell<Vec<NodeId>>>,
}

impl DirtyObserver for Recorder {
    fn on_transform_dirty(&mut self, node: NodeId) {
        self.transforms.borrow_mut().push(node);
    }

    fn on_bounds_dirty(&mut self, node: NodeId) {
        self.bounds.borrow_mut().push(node);
    }
}

#[test]
fn test_initial_flush_leaves_everything_clean() {
    let scene = Scene::new();

    assert!(scene.tracker.is_clean());
    for id in scene.all() {
        assert_eq!(scene.node(id).dirty_flags(), Some(DirtyFlags::empty()));
    }
}

#[test]
fn test_root_move_dirties_every_world_transform() {
    let mut scene = Scene::new();

    scene.graph.set_position_x(scene.root, 10.0).unwrap();

    assert_eq!(scene.tracker.dirty_transform_count(), 5);
    assert!(scene.node(scene.root).local_transform_dirty());
    for id in scene.all() {
        let node = scene.node(id);
        assert!(node.world_transform_dirty());
        if id != scene.root {
            assert!(!node.local_transform_dirty());
        }
    }
}

#[test]
fn test_repeated_mutation_enqueues_once() {
    let mut scene = Scene::new();
    let leaf = scene.a2;

    scene.graph.set_position_x(leaf, 1.0).unwrap();
    scene.graph.set_position_y(leaf, 2.0).unwrap();
    scene.graph.set_position_x(leaf, 3.0).unwrap();
    scene.graph.set_scale_x(leaf, 1.0).unwrap();
    scene.graph.set_scale_y(leaf, 2.0).unwrap();
    scene.graph.set_scale_z(leaf, 3.0).unwrap();

    assert_eq!(scene.tracker.dirty_transforms(), vec![leaf]);
}

#[test]
fn test_every_field_setter_marks_local_dirty() {
    let mut scene = Scene::new();
    let id = scene.b;
    let setters: [fn(&mut SceneGraph, NodeId) -> Result<(), SceneError>; 9] = [
        |g: &mut SceneGraph, id: NodeId| g.set_position_x(id, 1.0),
        |g: &mut SceneGraph, id: NodeId| g.set_position_y(id, 1.0),
        |g: &mut SceneGraph, id: NodeId| g.set_position_z(id, 1.0),
        |g: &mut SceneGraph, id: NodeId| g.set_scale_x(id, 2.0),
        |g: &mut SceneGraph, id: NodeId| g.set_scale_y(id, 2.0),
        |g: &mut SceneGraph, id: NodeId| g.set_scale_z(id, 2.0),
        |g: &mut SceneGraph, id: NodeId| {
            g.set_rotation(id, Quat::from_axis_angle(&Vec3::y_axis(), 0.5))
        },
        |g: &mut SceneGraph, id: NodeId| g.set_rotation_euler(id, 1.0, 1.0, 1.0),
        |g: &mut SceneGraph, id: NodeId| g.set_transform(id, Transform::identity()),
    ];

    for set in setters {
        set(&mut scene.graph, id).unwrap();
        let node = scene.node(id);
        assert!(node.local_transform_dirty());
        assert!(node.world_transform_dirty());
        scene.graph.update_transform(id).unwrap();
        assert!(!scene.node(id).local_transform_dirty());
    }
}

#[test]
fn test_leaf_move_dirties_ancestor_bounds_only() {
    let mut scene = Scene::new();

    scene.graph.set_position_x(scene.a2, -5.0).unwrap();

    let a2 = scene.node(scene.a2);
    assert!(a2.local_transform_dirty());
    assert!(a2.world_transform_dirty());
    assert!(!a2.bounds_dirty());

    for id in [scene.a, scene.root] {
        let node = scene.node(id);
        assert!(node.bounds_dirty());
        assert!(!node.world_transform_dirty());
        assert!(!node.local_transform_dirty());
    }
    for id in [scene.b, scene.b2] {
        assert_eq!(scene.node(id).dirty_flags(), Some(DirtyFlags::empty()));
    }
    assert_eq!(scene.tracker.dirty_bounds(), vec![scene.a, scene.root]);
}

#[test]
fn test_partial_update_leaves_other_branch_dirty() {
    let mut scene = Scene::new();
    scene.graph.set_position_x(scene.root, 10.0).unwrap();

    scene.graph.update_transform(scene.a2).unwrap();

    for id in [scene.root, scene.a, scene.a2] {
        assert!(!scene.node(id).world_transform_dirty());
    }
    for id in [scene.b, scene.b2] {
        assert!(scene.node(id).world_transform_dirty());
    }
}

#[test]
fn test_flush_composes_through_parents_regardless_of_queue_order() {
    let mut scene = Scene::new();
    // The deep node is queued first, its ancestors after it.
    scene.graph.set_position_z(scene.b2, 3.0).unwrap();
    scene.graph.set_position_y(scene.b, 2.0).unwrap();
    scene.graph.set_position_x(scene.root, 1.0).unwrap();
    assert_eq!(scene.tracker.dirty_transforms()[0], scene.b2);

    scene.tracker.update_all(&mut scene.graph);

    let b_world = scene.graph.world_matrix(scene.b).unwrap();
    let b2_local = scene.graph.local_matrix(scene.b2).unwrap();
    assert_relative_eq!(scene.graph.world_matrix(scene.b2).unwrap(), b_world * b2_local);
    assert_relative_eq!(
        scene.graph.world_matrix(scene.b2).unwrap(),
        Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0))
    );
    assert!(scene.tracker.is_clean());
}

#[test]
fn test_parent_bounds_contain_rotated_child_exactly() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_node("parent");
    let child = graph.create_node("child");
    graph.add_child(parent, child).unwrap();
    let cube = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    graph.set_geometry(child, Some(Geometry::new(cube))).unwrap();
    let tracker = DirtyTracker::new();
    attach_subtree(&mut graph, parent, Some(tracker.clone())).unwrap();

    graph.set_position(child, Vec3::new(5.0, 0.0, 0.0)).unwrap();
    graph.set_rotation(child, Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI)).unwrap();
    tracker.update_all(&mut graph);

    let bounds = graph.bounding_box(parent).unwrap();
    assert_relative_eq!(bounds.min, Vec3::new(4.0, -1.0, -1.0), epsilon = 1e-5);
    assert_relative_eq!(bounds.max, Vec3::new(6.0, 1.0, 1.0), epsilon = 1e-5);

    let sphere = graph.bounding_sphere(parent).unwrap();
    assert_relative_eq!(sphere.center, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
    assert_relative_eq!(sphere.radius, 3.0_f32.sqrt(), epsilon = 1e-5);
}

#[test]
fn test_geometry_bounds_pass_through() {
    let mut graph = SceneGraph::new();
    let points = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0)];
    let geometry = Geometry::from_points(&points).unwrap();
    let mesh = graph.create_node("mesh");
    graph.set_geometry(mesh, Some(geometry)).unwrap();
    let tracker = DirtyTracker::new();
    attach_with(&mut graph, mesh, tracker.clone()).unwrap();

    graph.mark_bounds_dirty(mesh).unwrap();
    tracker.update_all(&mut graph);

    let node = graph.node(mesh).unwrap();
    assert!(!node.bounds_dirty());
    assert_eq!(node.bounding_box(), geometry.bounding_box());
    assert_eq!(node.bounding_sphere(), geometry.bounding_sphere());
}

#[test]
fn test_reparent_dirties_both_parents_and_moved_node() {
    let mut scene = Scene::new();

    scene.graph.add_child(scene.b, scene.a2).unwrap();

    assert!(scene.node(scene.a).bounds_dirty());
    assert!(scene.node(scene.b).bounds_dirty());
    assert!(scene.node(scene.a2).world_transform_dirty());
    assert!(!scene.node(scene.a2).local_transform_dirty());
    assert_eq!(scene.graph.children(scene.b).unwrap(), &[scene.b2, scene.a2]);

    scene.tracker.update_all(&mut scene.graph);
    assert_eq!(scene.node(scene.a).bounding_box(), &AABB::point());
}

#[test]
fn test_reparent_to_same_parent_is_noop() {
    let mut scene = Scene::new();

    scene.graph.add_child(scene.a, scene.a2).unwrap();

    assert!(scene.tracker.is_clean());
    for id in scene.all() {
        assert_eq!(scene.node(id).dirty_flags(), Some(DirtyFlags::empty()));
    }
}

#[test]
fn test_observer_sees_each_enqueue() {
    let mut scene = Scene::new();
    let recorder = Recorder::default();
    let transforms = recorder.transforms.clone();
    let bounds = recorder.bounds.clone();
    scene.tracker.set_observer(Some(Box::new(recorder)));

    scene.graph.set_position_x(scene.a, 1.0).unwrap();

    assert_eq!(*transforms.borrow(), vec![scene.a, scene.a2]);
    assert_eq!(*bounds.borrow(), vec![scene.root]);
    assert_eq!(scene.tracker.dirty_transforms(), vec![scene.a, scene.a2]);
}

#[test]
fn test_bounds_follow_moves_after_flush() {
    let mut scene = Scene::new();
    scene.graph.set_position(scene.a, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    scene.graph.set_position(scene.a2, Vec3::new(0.0, 2.0, 0.0)).unwrap();
    scene.graph.set_position(scene.b2, Vec3::new(0.0, 0.0, -3.0)).unwrap();

    let stats = scene.tracker.update_all(&mut scene.graph);

    assert_eq!(stats.transforms_updated, 3);
    assert_eq!(stats.bounds_updated, 3);
    let bounds = scene.graph.bounding_box(scene.root).unwrap();
    assert_relative_eq!(bounds.min, Vec3::new(0.0, 0.0, -3.0));
    assert_relative_eq!(bounds.max, Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn test_subtree_attach_binds_override_and_restores_registry() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    let child = graph.create_node("child");
    graph.add_child(root, child).unwrap();
    let tracker = DirtyTracker::new();

    let attached = attach_subtree(&mut graph, root, Some(tracker.clone())).unwrap();

    assert_eq!(attached, 2);
    assert_eq!(graph.node(child).unwrap().tracker(), Some(&tracker));
    assert_eq!(active_tracker(), default_tracker());
}

#[test]
fn test_tracker_not_rebound_on_reparent() {
    let mut graph = SceneGraph::new();
    let first = DirtyTracker::new();
    let second = DirtyTracker::new();
    let a = graph.create_node("a");
    let b = graph.create_node("b");
    attach_with(&mut graph, a, first.clone()).unwrap();
    attach_with(&mut graph, b, second.clone()).unwrap();

    graph.add_child(b, a).unwrap();

    assert_eq!(graph.node(a).unwrap().tracker(), Some(&first));
    assert_eq!(first.dirty_transforms(), vec![a]);
    assert_eq!(second.dirty_bounds(), vec![b]);
}

#[test]
fn test_detach_makes_node_a_root() {
    let mut scene = Scene::new();
    scene.graph.set_position_y(scene.root, 5.0).unwrap();
    scene.graph.set_position_x(scene.a, 2.0).unwrap();
    scene.tracker.update_all(&mut scene.graph);

    scene.graph.detach(scene.a).unwrap();

    assert_eq!(scene.graph.parent(scene.a).unwrap(), None);
    assert_eq!(scene.graph.children(scene.root).unwrap(), &[scene.b]);
    assert!(scene.node(scene.root).bounds_dirty());
    assert_eq!(scene.tracker.dirty_bounds(), vec![scene.root]);
    assert_eq!(scene.tracker.dirty_transforms(), vec![scene.a, scene.a2]);

    scene.tracker.update_all(&mut scene.graph);

    let a_local = scene.graph.local_matrix(scene.a).unwrap();
    assert_relative_eq!(scene.graph.world_matrix(scene.a).unwrap(), a_local);
    assert_relative_eq!(a_local, Mat4::new_translation(&Vec3::new(2.0, 0.0, 0.0)));
    assert_relative_eq!(scene.graph.world_matrix(scene.a2).unwrap(), a_local);
    assert_eq!(scene.node(scene.root).bounding_box(), &AABB::point());
}

#[test]
fn test_clearing_geometry_reaggregates_own_bounds() {
    let mut scene = Scene::new();
    let cube = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    scene.graph.set_geometry(scene.a, Some(Geometry::new(cube))).unwrap();
    scene.tracker.update_all(&mut scene.graph);
    assert_eq!(scene.node(scene.a).bounding_box(), &cube);
    let root_bounds = scene.graph.bounding_box(scene.root).unwrap();
    assert_relative_eq!(root_bounds.max, Vec3::new(1.0, 1.0, 1.0));

    scene.graph.set_geometry(scene.a, None).unwrap();

    assert!(scene.node(scene.a).bounds_dirty());
    assert_eq!(scene.tracker.dirty_bounds(), vec![scene.a, scene.root]);

    scene.tracker.update_all(&mut scene.graph);

    assert_eq!(scene.node(scene.a).bounding_box(), &AABB::point());
    assert_eq!(scene.node(scene.root).bounding_box(), &AABB::point());
}

#[test]
fn test_update_matrix_world_reaches_tracked_node_under_untracked_parent() {
    let mut graph = SceneGraph::new();
    let base = graph.create_node("base");
    let arm = graph.create_node_with("arm", Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
    graph.add_child(base, arm).unwrap();
    let tracker = DirtyTracker::new();
    attach_with(&mut graph, arm, tracker.clone()).unwrap();

    // Moving an untracked node marks nothing.
    graph.set_position_y(base, 4.0).unwrap();
    assert!(tracker.is_clean());

    graph.update_matrix_world(base).unwrap();

    assert!(!graph.node(arm).unwrap().world_transform_dirty());
    assert_relative_eq!(
        graph.world_matrix(arm).unwrap(),
        Mat4::new_translation(&Vec3::new(1.0, 4.0, 0.0))
    );
    assert_eq!(tracker.update_all(&mut graph).transforms_updated, 1);
    assert_relative_eq!(
        graph.world_matrix(arm).unwrap(),
        Mat4::new_translation(&Vec3::new(1.0, 4.0, 0.0))
    );
}

#[test]
fn test_configured_tracker_flushes_with_logging() {
    dirty_transform::foundation::logging::init_with_level("debug");
    let text = "log_level = \"debug\"\n\n[tracker]\nqueue_capacity = 2\nlog_flushes = true\n";
    let config = DirtyConfig::from_str_with_format(text, "scene.toml").unwrap();
    config.validate().unwrap();
    let mut scene = Scene::with_tracker(DirtyTracker::with_config(config.tracker.clone()));
    assert_eq!(scene.tracker.config(), config.tracker);

    scene.graph.set_position_x(scene.root, 1.0).unwrap();
    scene.graph.set_position_z(scene.b2, 2.0).unwrap();
    let stats = scene.tracker.update_all(&mut scene.graph);

    assert_eq!(stats.transforms_updated, 5);
    assert_eq!(stats.bounds_updated, 2);
    assert!(scene.tracker.is_clean());
    assert_relative_eq!(
        scene.graph.world_matrix(scene.b2).unwrap(),
        Mat4::new_translation(&Vec3::new(1.0, 0.0, 2.0))
    );
}
