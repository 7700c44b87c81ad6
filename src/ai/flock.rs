//! Flocking simulation
//!
//! A flock of steering agents in a square world. Every agent blends
//! separation, cohesion, velocity matching, seek and wander, unless a
//! pursuer comes close enough to make evading take priority. Neighbor
//! queries go through a [`CellSpace`] or, when partitioning is off, a plain
//! scan over the whole flock.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::steering::{
    BlendedSteering, Cohesion, Evade, Neighborhood, PrioritySteering, Seek, Separation,
    SteeringAgent, SteeringBehavior, SteeringOutput, TargetData, VelocityMatch, Wander,
    WeightedBehavior,
};
use crate::core::FlockConfig;
use crate::spatial::{AgentId, CellSpace};

/// Blend weights of the flocking behaviors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockWeights {
    pub separation: f32,
    pub cohesion: f32,
    pub velocity_match: f32,
    pub seek: f32,
    pub wander: f32,
}

impl Default for FlockWeights {
    fn default() -> Self {
        Self {
            separation: 0.2,
            cohesion: 0.2,
            velocity_match: 0.2,
            seek: 0.2,
            wander: 0.2,
        }
    }
}

/// A flock of agents sharing one set of behaviors
pub struct Flock {
    config: FlockConfig,
    agents: Vec<SteeringAgent>,
    /// Positions the agents were last registered at in the cell space
    old_positions: Vec<Vec2>,
    cell_space: CellSpace,
    /// Result of the last neighbor query
    neighbors: Vec<AgentId>,
    neighborhood: Neighborhood,

    separation: Separation,
    cohesion: Cohesion,
    velocity_match: VelocityMatch,
    seek: Seek,
    wander: Wander,
    evade: Option<Evade>,
    weights: FlockWeights,

    rng: StdRng,
}

impl Flock {
    /// Spawn `config.flock_size` agents at seeded random positions
    #[must_use]
    pub fn new(config: FlockConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let world = config.world_size;
        let mut cell_space =
            CellSpace::from_config(&config.cell_space, world, world, config.flock_size);

        let mut agents = Vec::with_capacity(config.flock_size);
        for id in 0..config.flock_size {
            let position = if world > 0.0 {
                Vec2::new(rng.random_range(-world..world), rng.random_range(-world..world))
            } else {
                Vec2::ZERO
            };
            let mut agent = SteeringAgent::new(position, config.max_speed);
            agent.orientation = rng.random_range(0.0..std::f32::consts::TAU);
            cell_space.add_agent(id, position);
            agents.push(agent);
        }
        let old_positions = agents.iter().map(|agent| agent.position).collect();

        log::info!(
            "Spawned flock of {} agents (world {}, partitioning {})",
            agents.len(),
            world,
            config.use_space_partitioning
        );

        Self {
            neighbors: Vec::with_capacity(config.flock_size),
            neighborhood: Neighborhood::with_capacity(config.flock_size),
            config,
            agents,
            old_positions,
            cell_space,
            separation: Separation,
            cohesion: Cohesion,
            velocity_match: VelocityMatch,
            seek: Seek::default(),
            wander: Wander::new(),
            evade: None,
            weights: FlockWeights::default(),
            rng,
        }
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Advance every agent by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        for id in 0..self.agents.len() {
            self.register_neighbors(id);
            self.neighborhood
                .fill(self.neighbors.iter().map(|&other| &self.agents[other]));
            self.wander.update(self.rng.random::<f32>());

            let steering = self.steering_for(id);
            let agent = &mut self.agents[id];
            agent.apply_steering(steering, dt);
            if self.config.trim_world {
                agent.trim_to_world(self.config.world_size);
            }

            // The cell space is kept current even when unused, so
            // partitioning can be switched on at any time
            let position = agent.position;
            self.cell_space
                .update_agent_cell(id, position, self.old_positions[id]);
            self.old_positions[id] = position;
        }
    }

    fn steering_for(&self, id: AgentId) -> SteeringOutput {
        let weights = &self.weights;
        let blended = BlendedSteering::new([
            WeightedBehavior::new(&self.separation, weights.separation),
            WeightedBehavior::new(&self.cohesion, weights.cohesion),
            WeightedBehavior::new(&self.velocity_match, weights.velocity_match),
            WeightedBehavior::new(&self.seek, weights.seek),
            WeightedBehavior::new(&self.wander, weights.wander),
        ]);

        let agent = &self.agents[id];
        match &self.evade {
            Some(evade) => PrioritySteering::new([evade as &dyn SteeringBehavior, &blended])
                .calculate(agent, &self.neighborhood),
            None => blended.calculate(agent, &self.neighborhood),
        }
    }

    /// Find the agents within the neighborhood radius of agent `id`.
    ///
    /// The result is read through [`Flock::neighbors`].
    pub fn register_neighbors(&mut self, id: AgentId) {
        let radius = self.config.neighborhood_radius;
        if self.config.use_space_partitioning {
            self.cell_space.register_neighbors(id, &self.agents, radius);
            self.neighbors.clear();
            self.neighbors.extend_from_slice(self.cell_space.neighbors());
            return;
        }

        self.neighbors.clear();
        let Some(position) = self.agents.get(id).map(|agent| agent.position) else {
            return;
        };
        self.neighbors.extend(
            self.agents
                .iter()
                .enumerate()
                .filter(|&(other, agent)| {
                    other != id && agent.position.distance(position) <= radius
                })
                .map(|(other, _)| other),
        );
    }

    // ========================================================================
    // Targets and tuning
    // ========================================================================

    /// Point every agent seeks towards
    pub fn set_seek_target(&mut self, target: Vec2) {
        self.seek.target = target;
    }

    /// Agent to evade, or `None` to stop evading
    pub fn set_evade_target(&mut self, target: Option<TargetData>) {
        self.evade =
            target.map(|target| Evade::new(target).with_radius(self.config.evade_radius));
    }

    /// Switch between cell space and brute force neighbor queries
    pub fn set_space_partitioning(&mut self, enabled: bool) {
        self.config.use_space_partitioning = enabled;
    }

    #[must_use]
    pub fn is_space_partitioning(&self) -> bool {
        self.config.use_space_partitioning
    }

    #[must_use]
    pub fn weights(&self) -> &FlockWeights {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut FlockWeights {
        &mut self.weights
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn agents(&self) -> &[SteeringAgent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&SteeringAgent> {
        self.agents.get(id)
    }

    /// Neighbors found by the last query
    #[must_use]
    pub fn neighbors(&self) -> &[AgentId] {
        &self.neighbors
    }

    #[must_use]
    pub fn cell_space(&self) -> &CellSpace {
        &self.cell_space
    }

    #[must_use]
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> FlockConfig {
        FlockConfig::default().with_flock_size(40).with_world_size(50.0)
    }

    fn sorted(ids: &[AgentId]) -> Vec<AgentId> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_spawn_inside_world() {
        let flock = Flock::new(small_config());

        assert_eq!(flock.len(), 40);
        assert_eq!(flock.cell_space().agent_count(), 40);
        for agent in flock.agents() {
            assert!(agent.position.x.abs() <= 50.0);
            assert!(agent.position.y.abs() <= 50.0);
        }
    }

    #[test]
    fn test_same_seed_same_flock() {
        let mut a = Flock::new(small_config());
        let mut b = Flock::new(small_config());
        a.update(0.1);
        b.update(0.1);

        assert_eq!(a.agents(), b.agents());

        let c = Flock::new(small_config().with_seed(7));
        assert_ne!(a.agents()[0].position, c.agents()[0].position);
    }

    #[test]
    fn test_partitioned_neighbors_match_brute_force() {
        let mut flock = Flock::new(small_config());
        for _ in 0..5 {
            flock.update(0.2);
        }

        for id in 0..flock.len() {
            flock.set_space_partitioning(true);
            flock.register_neighbors(id);
            let partitioned = sorted(flock.neighbors());

            flock.set_space_partitioning(false);
            flock.register_neighbors(id);
            let brute_force = sorted(flock.neighbors());

            assert_eq!(partitioned, brute_force, "agent {id}");
        }
    }

    #[test]
    fn test_trimmed_world_keeps_agents_inside() {
        let mut flock = Flock::new(small_config());
        flock.set_seek_target(Vec2::new(500.0, 500.0));
        for _ in 0..50 {
            flock.update(0.5);
        }

        for agent in flock.agents() {
            assert!(agent.position.x.abs() <= 50.0);
            assert!(agent.position.y.abs() <= 50.0);
        }
        assert_eq!(flock.cell_space().agent_count(), 40);
    }

    #[test]
    fn test_seek_only_moves_to_target() {
        let mut flock = Flock::new(small_config().with_flock_size(1));
        *flock.weights_mut() = FlockWeights {
            separation: 0.0,
            cohesion: 0.0,
            velocity_match: 0.0,
            seek: 1.0,
            wander: 0.0,
        };
        let target = Vec2::new(20.0, -10.0);
        flock.set_seek_target(target);

        let before = flock.agents()[0].position.distance(target);
        flock.update(0.1);
        let after = flock.agents()[0].position.distance(target);

        assert!(after < before);
    }

    #[test]
    fn test_evade_takes_priority() {
        let mut config = small_config().with_flock_size(1);
        config.trim_world = false;
        let mut flock = Flock::new(config);
        let position = flock.agents()[0].position;
        flock.set_evade_target(Some(TargetData {
            position: position + Vec2::new(2.0, 0.0),
            linear_velocity: Vec2::ZERO,
        }));

        flock.update(0.1);
        let moved = flock.agents()[0].position - position;
        assert!(moved.x < 0.0);
        assert!(moved.y.abs() < 0.001);

        flock.set_evade_target(None);
        flock.update(0.1);
    }

    #[test]
    fn test_empty_flock() {
        let mut flock = Flock::new(small_config().with_flock_size(0));
        flock.update(1.0);

        assert!(flock.is_empty());
        assert!(flock.agent(0).is_none());
    }
}
