//! Headless sandbox exercising the AI toolkit
//!
//! Usage: `elite_ai [config.ron|config.json]`. Set `RUST_LOG=info` (or
//! `debug`) to see the results.

use std::error::Error;
use std::path::Path;

use elite_ai::ai::{
    Action, BehaviorState, BehaviorTree, BlackboardError, Conditional, Selector, Sequence,
    TargetData,
};
use elite_ai::prelude::*;

/// Runs each subsystem once against the loaded configuration
struct Sandbox {
    config: SandboxConfig,
}

impl Sandbox {
    fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    fn run(&self) -> Result<(), Box<dyn Error>> {
        self.grid_paths();
        self.navmesh_path()?;
        self.eulerian_trail();
        self.flocking();
        Ok(())
    }

    fn grid_paths(&self) {
        let mut grid = GridGraph::from_config(&self.config.grid);

        // A wall across the middle of the grid with a gap at the top
        let cell = grid.cell_size();
        let wall_height = (grid.rows() as f32 - 2.0) * cell;
        let wall = Shape::rectangle(
            grid.origin() + Vec2::new(grid.columns() as f32 * cell * 0.5, wall_height * 0.5),
            Vec2::new(cell * 0.6, wall_height * 0.5),
        );
        let expanded = wall.expanded(self.config.agent_radius);
        let blocked = grid.paint_shape(&expanded, TerrainType::Water);
        log::info!("Wall blocks {blocked} cells");

        let (Some(start), Some(goal)) = (
            grid.index_of(0, 0),
            grid.index_of(0, grid.columns().saturating_sub(1)),
        ) else {
            log::warn!("Grid is empty, skipping grid pathfinding");
            return;
        };

        let astar = AStar::new(grid.graph(), heuristic::octile).find_path(start, goal);
        let jps = Jps::new(&grid, heuristic::octile);
        let jump_points = jps.find_path(start, goal);
        let bfs = Bfs::new(grid.graph()).find_path(start, goal);

        log::info!(
            "A*: {} nodes, cost {:?}",
            astar.len(),
            grid.graph().path_cost(&astar)
        );
        log::info!(
            "JPS: {} jump points, cost {:?}",
            jump_points.len(),
            grid.graph().path_cost(&jps.expand_path(&jump_points))
        );
        log::info!("BFS: {} nodes", bfs.len());
    }

    fn navmesh_path(&self) -> Result<(), Box<dyn Error>> {
        // An L-shaped corridor
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(10.0, 20.0),
            Vec2::new(20.0, 20.0),
        ];
        let triangles = [[0, 1, 4], [0, 4, 3], [1, 2, 5], [1, 5, 4], [4, 5, 7], [4, 7, 6]];
        let nav_graph = NavGraph::new(Polygon::from_triangles(points, &triangles)?);

        let path = NavMeshPathfinding::new(&nav_graph)
            .find_path(Vec2::new(2.0, 8.0), Vec2::new(12.0, 18.0));
        log::info!(
            "Navmesh: {} waypoints through {} portals, length {:.2}",
            path.waypoints.len(),
            path.portals.len(),
            path.length()
        );
        Ok(())
    }

    fn eulerian_trail(&self) {
        // The "house" drawn without lifting the pen
        let mut graph: Graph<GraphNode2D> = Graph::new(false);
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(1.0, 3.0),
        ];
        let nodes: Vec<NodeIndex> = corners
            .iter()
            .map(|&corner| graph.add_node(GraphNode2D::new(corner)))
            .collect();
        for (from, to) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3), (2, 4), (3, 4)] {
            graph.add_connection(nodes[from], nodes[to]);
        }

        let euler = EulerianPath::new(&graph);
        let eulerianity = euler.is_eulerian();
        log::info!("House graph is {eulerianity}, trail {:?}", euler.find_path(eulerianity));
    }

    fn flocking(&self) {
        let mut flock = Flock::new(self.config.flock.clone());
        flock.set_seek_target(Vec2::ZERO);

        // The behavior tree decides whether the flock runs from a predator
        let predator = Vec2::new(self.config.flock.world_size * 0.5, 0.0);
        let mut tree = match evade_tree(self.config.flock.evade_radius) {
            Ok(tree) => tree,
            Err(err) => {
                log::warn!("Blackboard setup failed: {err}");
                return;
            }
        };

        for step in 0..100 {
            let closest = flock
                .agents()
                .iter()
                .map(|agent| agent.position.distance(predator))
                .fold(f32::MAX, f32::min);
            if let Err(err) = tree.blackboard_mut().change_data("PredatorDistance", closest) {
                log::warn!("Could not update predator distance: {err}");
            }
            tree.update();

            let evading = tree.blackboard().get_data::<bool>("Evading").is_ok_and(|&e| e);
            flock.set_evade_target(evading.then_some(TargetData {
                position: predator,
                linear_velocity: Vec2::ZERO,
            }));
            flock.update(1.0 / 30.0);

            if step % 25 == 0 {
                log::info!(
                    "Flock step {step}: evading {evading}, agent 0 at {:?}",
                    flock.agent(0).map(|agent| agent.position)
                );
            }
        }
    }
}

/// Sets `Evading` while the closest agent is within twice the evade radius
/// of the predator; `PredatorDistance` is written by the caller each step
fn evade_tree(evade_radius: f32) -> Result<BehaviorTree, BlackboardError> {
    let mut blackboard = Blackboard::new();
    blackboard.add_data("PredatorDistance", f32::MAX)?;
    blackboard.add_data("Evading", false)?;

    let root = Selector::new(vec![
        Box::new(Sequence::new(vec![
            Box::new(Conditional::new(move |bb| {
                bb.get_data::<f32>("PredatorDistance")
                    .is_ok_and(|&distance| distance < evade_radius * 2.0)
            })),
            Box::new(Action::new(|bb| set_evading(bb, true))),
        ])),
        Box::new(Action::new(|bb| set_evading(bb, false))),
    ]);
    Ok(BehaviorTree::new(Box::new(root), blackboard))
}

fn set_evading(blackboard: &mut Blackboard, evading: bool) -> BehaviorState {
    match blackboard.change_data("Evading", evading) {
        Ok(()) => BehaviorState::Success,
        Err(err) => {
            log::warn!("Could not set evading to {evading}: {err}");
            BehaviorState::Failure
        }
    }
}

fn load_config(path: &Path) -> Result<SandboxConfig, Box<dyn Error>> {
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => SandboxConfig::load_json(path)?,
        _ => SandboxConfig::load_ron(path)?,
    };
    Ok(config)
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {path}: {e}");
                return;
            }
        },
        None => SandboxConfig::default(),
    };

    log::info!(
        "Starting sandbox: {}x{} grid, {} agents",
        config.grid.columns,
        config.grid.rows,
        config.flock.flock_size
    );

    if let Err(e) = Sandbox::new(config).run() {
        eprintln!("Sandbox error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evading(tree: &BehaviorTree) -> bool {
        *tree.blackboard().get_data::<bool>("Evading").unwrap()
    }

    #[test]
    fn test_evade_tree_toggles() {
        let mut tree = evade_tree(5.0).unwrap();

        tree.update();
        assert!(!evading(&tree));

        tree.blackboard_mut().change_data("PredatorDistance", 4.0f32).unwrap();
        assert_eq!(tree.update(), BehaviorState::Success);
        assert!(evading(&tree));

        tree.blackboard_mut().change_data("PredatorDistance", 50.0f32).unwrap();
        tree.update();
        assert!(!evading(&tree));
    }

    #[test]
    fn test_evade_tree_fails_without_flag() {
        let mut tree = evade_tree(5.0).unwrap();
        tree.blackboard_mut().remove_data("Evading");

        assert_eq!(tree.update(), BehaviorState::Failure);
        assert!(!tree.blackboard().contains("Evading"));
    }
}
