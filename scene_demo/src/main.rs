//! Scene Demo
//!
//! Builds a small scene, attaches dirty tracking, moves a few nodes and
//! flushes, logging what each flush recomputed.
//!
//! Usage: `scene_demo [config.toml | config.ron]`

use dirty_transform::foundation::logging;
use dirty_transform::foundation::math::constants::HALF_PI;
use dirty_transform::prelude::*;

// Unit cube used as leaf geometry
const CUBE_HALF_EXTENT: f32 = 0.5;

struct DemoScene {
    graph: SceneGraph,
    root: NodeId,
    arm: NodeId,
    hand: NodeId,
    turret: NodeId,
    barrel: NodeId,
}

impl DemoScene {
    fn new() -> Result<Self, SceneError> {
        let mut graph = SceneGraph::new();
        let cube_box = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(CUBE_HALF_EXTENT));
        let cube = Geometry::new(cube_box);

        let root = graph.create_node("root");
        let arm = graph.create_node_with("arm", Transform::from_position(Vec3::new(2.0, 0.0, 0.0)));
        let hand =
            graph.create_node_with("hand", Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let turret =
            graph.create_node_with("turret", Transform::from_position(Vec3::new(-2.0, 0.0, 0.0)));
        let barrel_transform = Transform::from_position(Vec3::new(0.0, 1.0, 0.0))
            .with_scale(Vec3::new(0.25, 2.0, 0.25));
        let barrel = graph.create_node_with("barrel", barrel_transform);

        graph.add_child(root, arm)?;
        graph.add_child(arm, hand)?;
        graph.add_child(root, turret)?;
        graph.add_child(turret, barrel)?;
        graph.set_geometry(hand, Some(cube))?;
        graph.set_geometry(barrel, Some(cube))?;

        Ok(Self {
            graph,
            root,
            arm,
            hand,
            turret,
            barrel,
        })
    }

    fn log_bounds(&self) -> Result<(), SceneError> {
        for id in [self.root, self.arm, self.hand, self.turret, self.barrel] {
            let node = self.graph.node(id)?;
            let bounds = node.bounding_box();
            log::info!(
                "  {:<6} min=({:.2}, {:.2}, {:.2}) max=({:.2}, {:.2}, {:.2}) radius={:.2}",
                node.name(),
                bounds.min.x,
                bounds.min.y,
                bounds.min.z,
                bounds.max.x,
                bounds.max.y,
                bounds.max.z,
                node.bounding_sphere().radius
            );
        }
        Ok(())
    }
}

fn load_config() -> Result<DirtyConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => DirtyConfig::load_from_file(&path)?,
        None => DirtyConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn log_flush(label: &str, stats: FlushStats) {
    log::info!(
        "{}: {} transforms, {} bounds in {:?}",
        label,
        stats.transforms_updated,
        stats.bounds_updated,
        stats.elapsed
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    if !logging::init_with_level(&config.log_level) {
        log::warn!("Logger already installed, ignoring log_level = {}", config.log_level);
    }

    log::info!("Starting scene demo");

    let mut scene = DemoScene::new()?;
    let tracker = DirtyTracker::with_config(config.tracker.clone());
    let attached = attach_subtree(&mut scene.graph, scene.root, Some(tracker.clone()))?;
    log::info!("Attached {} nodes", attached);
    scene.log_bounds()?;

    // Moving the root dirties every world transform and no bounds
    scene.graph.set_position_x(scene.root, 5.0)?;
    log::info!(
        "Root moved: {} transforms and {} bounds queued",
        tracker.dirty_transform_count(),
        tracker.dirty_bounds_count()
    );
    log_flush("Root flush", tracker.update_all(&mut scene.graph));

    // Leaf changes bubble bounds up to the root
    scene.graph.set_rotation_euler(scene.turret, 0.0, 0.0, HALF_PI)?;
    scene.graph.set_scale_y(scene.barrel, 4.0)?;
    scene.graph.set_position_z(scene.hand, 1.5)?;
    log::info!(
        "Leaves moved: {} transforms and {} bounds queued",
        tracker.dirty_transform_count(),
        tracker.dirty_bounds_count()
    );
    log_flush("Leaf flush", tracker.update_all(&mut scene.graph));
    scene.log_bounds()?;

    let hand_world = scene.graph.world_matrix(scene.hand)?;
    log::info!(
        "Hand world position: ({:.2}, {:.2}, {:.2})",
        hand_world[(0, 3)],
        hand_world[(1, 3)],
        hand_world[(2, 3)]
    );

    if !tracker.is_clean() {
        log::warn!("Tracker still holds queued nodes after flush: {:?}", tracker);
    }

    log::info!("Scene demo finished");
    Ok(())
}
