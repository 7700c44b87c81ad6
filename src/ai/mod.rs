//! AI and navigation module
//!
//! Provides pathfinding, navigation meshes, steering and flocking, and
//! decision making (blackboard, state machines, behavior trees).

pub mod behavior_tree;
pub mod blackboard;
pub mod flock;
pub mod fsm;
pub mod navigation;
pub mod pathfinding;
pub mod steering;

pub use behavior_tree::{
    Action, Behavior, BehaviorState, BehaviorTree, BoxedBehavior, Conditional, Inverter, Parallel,
    PartialSequence, Policy, Selector, Sequence,
};
pub use blackboard::{Blackboard, BlackboardError};
pub use flock::{Flock, FlockWeights};
pub use fsm::{Condition, FiniteStateMachine, FsmError, FsmState, State, StateMachine, Transition};
pub use navigation::{NavGraph, NavMeshPath, NavMeshPathfinding, Portal};
pub use pathfinding::{AStar, Bfs, EulerianPath, Eulerianity, Heuristic, Jps};
pub use steering::{
    Arrive, BlendedSteering, Cohesion, Evade, Face, Flee, Neighborhood, PrioritySteering, Pursuit,
    Seek, Separation, SteeringAgent, SteeringBehavior, SteeringOutput, TargetData, VelocityMatch,
    Wander, WeightedBehavior,
};
