//! Steering behaviors for AI movement
//!
//! Behaviors produce a desired linear velocity for an agent. They can be
//! blended by weight or stacked by priority, and the flocking behaviors read
//! the agent's current neighborhood.

use glam::Vec2;
use smallvec::SmallVec;

use crate::spatial::Positioned;

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Desired linear velocity
    pub linear: Vec2,
    /// Angular velocity (radians per second)
    pub angular: f32,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    /// Steering with only a linear part
    #[must_use]
    pub const fn linear(linear: Vec2) -> Self {
        Self {
            linear,
            angular: 0.0,
        }
    }

    /// Combine with another steering output
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }

    /// Scale the output
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self {
            linear: self.linear * factor,
            angular: self.angular * factor,
        }
    }

    /// Whether the output asks for no movement at all
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.linear == Vec2::ZERO && self.angular == 0.0
    }
}

/// A moving agent driven by steering behaviors
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringAgent {
    pub position: Vec2,
    pub linear_velocity: Vec2,
    /// Orientation in radians, 0 facing +x
    pub orientation: f32,
    pub max_linear_speed: f32,
    /// Face the direction of travel
    pub auto_orient: bool,
}

impl SteeringAgent {
    /// Create a resting agent
    #[must_use]
    pub fn new(position: Vec2, max_linear_speed: f32) -> Self {
        Self {
            position,
            linear_velocity: Vec2::ZERO,
            orientation: 0.0,
            max_linear_speed,
            auto_orient: true,
        }
    }

    /// Unit vector the agent is moving in, or facing when at rest
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        self.linear_velocity
            .try_normalize()
            .unwrap_or_else(|| Vec2::from_angle(self.orientation))
    }

    /// Apply a steering output and integrate over `dt` seconds
    pub fn apply_steering(&mut self, steering: SteeringOutput, dt: f32) {
        self.linear_velocity = steering.linear.clamp_length_max(self.max_linear_speed);
        if self.auto_orient && self.linear_velocity != Vec2::ZERO {
            self.orientation = self.linear_velocity.to_angle();
        } else {
            self.orientation += steering.angular * dt;
        }
        self.position += self.linear_velocity * dt;
    }

    /// Wrap the position around a square world `[-half_size, half_size]`
    pub fn trim_to_world(&mut self, half_size: f32) {
        let size = half_size * 2.0;
        if self.position.x > half_size {
            self.position.x -= size;
        } else if self.position.x < -half_size {
            self.position.x += size;
        }
        if self.position.y > half_size {
            self.position.y -= size;
        } else if self.position.y < -half_size {
            self.position.y += size;
        }
    }

    /// Snapshot used as a pursuit or evade target
    #[must_use]
    pub fn as_target(&self) -> TargetData {
        TargetData {
            position: self.position,
            linear_velocity: self.linear_velocity,
        }
    }
}

impl Positioned for SteeringAgent {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// A moving target
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetData {
    pub position: Vec2,
    pub linear_velocity: Vec2,
}

/// Positions and velocities of the agents around the one being steered
#[derive(Debug, Clone, Default)]
pub struct Neighborhood {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
}

impl Neighborhood {
    /// Empty neighborhood with room for `capacity` neighbors
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
        }
    }

    /// Replace the contents with the given agents
    pub fn fill<'a>(&mut self, agents: impl IntoIterator<Item = &'a SteeringAgent>) {
        self.positions.clear();
        self.velocities.clear();
        for agent in agents {
            self.positions.push(agent.position);
            self.velocities.push(agent.linear_velocity);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Mean neighbor position, `None` without neighbors
    #[must_use]
    pub fn average_position(&self) -> Option<Vec2> {
        average(&self.positions)
    }

    /// Mean neighbor velocity, `None` without neighbors
    #[must_use]
    pub fn average_velocity(&self) -> Option<Vec2> {
        average(&self.velocities)
    }
}

fn average(values: &[Vec2]) -> Option<Vec2> {
    (!values.is_empty()).then(|| values.iter().sum::<Vec2>() / values.len() as f32)
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Calculate steering for `agent` given the agents around it
    fn calculate(&self, agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput;
}

impl<T: SteeringBehavior + ?Sized> SteeringBehavior for &T {
    fn calculate(&self, agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput {
        (**self).calculate(agent, neighborhood)
    }
}

// ============================================================================
// Basic behaviors
// ============================================================================

/// Seek behavior - move towards target at full speed
#[derive(Debug, Clone, Default)]
pub struct Seek {
    pub target: Vec2,
}

impl Seek {
    #[must_use]
    pub fn new(target: Vec2) -> Self {
        Self { target }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, agent: &SteeringAgent, _neighborhood: &Neighborhood) -> SteeringOutput {
        let direction = (self.target - agent.position).normalize_or_zero();
        SteeringOutput::linear(direction * agent.max_linear_speed)
    }
}

/// Flee behavior - move away from a target that is too close
#[derive(Debug, Clone)]
pub struct Flee {
    pub target: Vec2,
    /// Targets further away than this are ignored
    pub flee_radius: f32,
}

impl Flee {
    #[must_use]
    pub fn new(target: Vec2) -> Self {
        Self {
            target,
            flee_radius: 20.0,
        }
    }

    #[must_use]
    pub fn with_radius(mut self, flee_radius: f32) -> Self {
        self.flee_radius = flee_radius;
        self
    }
}

impl SteeringBehavior for Flee {
    fn calculate(&self, agent: &SteeringAgent, _neighborhood: &Neighborhood) -> SteeringOutput {
        if agent.position.distance(self.target) > self.flee_radius {
            return SteeringOutput::ZERO;
        }
        let direction = (agent.position - self.target).normalize_or_zero();
        SteeringOutput::linear(direction * agent.max_linear_speed)
    }
}

/// Face behavior - turn on the spot towards a target.
///
/// Only the angular part is set: the requested turn rate is the signed angle
/// from the agent's facing to the target. With no linear part the agent
/// stands still and [`SteeringAgent::apply_steering`] integrates the turn.
/// Combined with moving behaviors the agent needs `auto_orient` off.
#[derive(Debug, Clone, Default)]
pub struct Face {
    pub target: Vec2,
}

impl Face {
    #[must_use]
    pub fn new(target: Vec2) -> Self {
        Self { target }
    }
}

impl SteeringBehavior for Face {
    fn calculate(&self, agent: &SteeringAgent, _neighborhood: &Neighborhood) -> SteeringOutput {
        let facing = Vec2::from_angle(agent.orientation);
        let to_target = self.target - agent.position;
        SteeringOutput {
            linear: Vec2::ZERO,
            angular: facing.perp_dot(to_target).atan2(facing.dot(to_target)),
        }
    }
}

/// Arrive behavior - move towards target and slow down
#[derive(Debug, Clone)]
pub struct Arrive {
    pub target: Vec2,
    /// Slowing distance
    pub slow_radius: f32,
    /// Stopping distance
    pub target_radius: f32,
}

impl Arrive {
    #[must_use]
    pub fn new(target: Vec2) -> Self {
        Self {
            target,
            slow_radius: 20.0,
            target_radius: 0.5,
        }
    }
}

impl SteeringBehavior for Arrive {
    fn calculate(&self, agent: &SteeringAgent, _neighborhood: &Neighborhood) -> SteeringOutput {
        let to_target = self.target - agent.position;
        let distance = to_target.length();

        if distance < self.target_radius {
            return SteeringOutput::ZERO;
        }

        let target_speed = if distance > self.slow_radius {
            agent.max_linear_speed
        } else {
            agent.max_linear_speed * distance / self.slow_radius
        };

        SteeringOutput::linear(to_target.normalize_or_zero() * target_speed)
    }
}

/// Wander behavior - random movement
#[derive(Debug, Clone)]
pub struct Wander {
    /// Wander circle distance
    pub offset: f32,
    /// Wander circle radius
    pub radius: f32,
    /// Maximum angle change per update
    pub max_angle_change: f32,
    /// Current wander angle
    angle: f32,
}

impl Default for Wander {
    fn default() -> Self {
        Self {
            offset: 6.0,
            radius: 4.0,
            max_angle_change: 45f32.to_radians(),
            angle: 0.0,
        }
    }
}

impl Wander {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update wander angle (call each frame with a random value in `[0, 1)`)
    pub fn update(&mut self, random: f32) {
        self.angle += (random - 0.5) * 2.0 * self.max_angle_change;
    }

    /// Current wander angle
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

impl SteeringBehavior for Wander {
    fn calculate(&self, agent: &SteeringAgent, _neighborhood: &Neighborhood) -> SteeringOutput {
        // Project wander circle in front of agent
        let center = agent.position + agent.direction() * self.offset;
        let target = center + Vec2::new(self.angle.sin(), self.angle.cos()) * self.radius;

        let direction = (target - agent.position).normalize_or_zero();
        SteeringOutput::linear(direction * agent.max_linear_speed)
    }
}

/// Pursuit behavior - seek where a moving target is heading
#[derive(Debug, Clone, Default)]
pub struct Pursuit {
    pub target: TargetData,
}

impl Pursuit {
    #[must_use]
    pub fn new(target: TargetData) -> Self {
        Self { target }
    }

    /// Where the target will be by the time the agent could get there
    fn predicted_position(&self, agent: &SteeringAgent) -> Vec2 {
        let distance = agent.position.distance(self.target.position);
        let look_ahead = if agent.max_linear_speed > 0.0 {
            distance / agent.max_linear_speed
        } else {
            0.0
        };
        self.target.position + self.target.linear_velocity * look_ahead
    }
}

impl SteeringBehavior for Pursuit {
    fn calculate(&self, agent: &SteeringAgent, _neighborhood: &Neighborhood) -> SteeringOutput {
        let direction = (self.predicted_position(agent) - agent.position).normalize_or_zero();
        SteeringOutput::linear(direction * agent.max_linear_speed)
    }
}

/// Evade behavior - flee from where a close pursuer is heading
#[derive(Debug, Clone)]
pub struct Evade {
    pub target: TargetData,
    /// Pursuers further away than this are ignored
    pub evade_radius: f32,
}

impl Evade {
    #[must_use]
    pub fn new(target: TargetData) -> Self {
        Self {
            target,
            evade_radius: 20.0,
        }
    }

    #[must_use]
    pub fn with_radius(mut self, evade_radius: f32) -> Self {
        self.evade_radius = evade_radius;
        self
    }
}

impl SteeringBehavior for Evade {
    fn calculate(&self, agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput {
        if agent.position.distance(self.target.position) > self.evade_radius {
            return SteeringOutput::ZERO;
        }
        Pursuit::new(self.target)
            .calculate(agent, neighborhood)
            .scale(-1.0)
    }
}

// ============================================================================
// Flocking behaviors
// ============================================================================

/// Cohesion - steer towards the center of the neighborhood
#[derive(Debug, Clone, Copy, Default)]
pub struct Cohesion;

impl SteeringBehavior for Cohesion {
    fn calculate(&self, agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput {
        neighborhood
            .average_position()
            .map_or(SteeringOutput::ZERO, |center| {
                SteeringOutput::linear(center - agent.position)
            })
    }
}

/// Separation - steer away from neighbors, harder from the closest ones
#[derive(Debug, Clone, Copy, Default)]
pub struct Separation;

impl SteeringBehavior for Separation {
    fn calculate(&self, agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput {
        let push: Vec2 = neighborhood
            .positions()
            .iter()
            .filter_map(|&neighbor| {
                let away = agent.position - neighbor;
                let distance = away.length();
                // Inverse proportional to the distance
                (distance > f32::EPSILON).then(|| away / (distance * distance))
            })
            .sum();

        SteeringOutput::linear(push.normalize_or_zero() * agent.max_linear_speed)
    }
}

/// Velocity match - align with the average velocity of the neighborhood
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityMatch;

impl SteeringBehavior for VelocityMatch {
    fn calculate(&self, _agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput {
        neighborhood
            .average_velocity()
            .map_or(SteeringOutput::ZERO, SteeringOutput::linear)
    }
}

// ============================================================================
// Combined behaviors
// ============================================================================

/// A behavior and its weight inside a [`BlendedSteering`]
#[derive(Clone, Copy)]
pub struct WeightedBehavior<'a> {
    pub behavior: &'a dyn SteeringBehavior,
    pub weight: f32,
}

impl<'a> WeightedBehavior<'a> {
    #[must_use]
    pub fn new(behavior: &'a dyn SteeringBehavior, weight: f32) -> Self {
        Self { behavior, weight }
    }
}

/// Weighted sum of several behaviors
#[derive(Clone, Default)]
pub struct BlendedSteering<'a> {
    behaviors: SmallVec<[WeightedBehavior<'a>; 5]>,
}

impl<'a> BlendedSteering<'a> {
    #[must_use]
    pub fn new(behaviors: impl IntoIterator<Item = WeightedBehavior<'a>>) -> Self {
        Self {
            behaviors: behaviors.into_iter().collect(),
        }
    }

    /// Weighted behaviors, in the order they were added
    #[must_use]
    pub fn behaviors(&self) -> &[WeightedBehavior<'a>] {
        &self.behaviors
    }

    /// Change the weight of the behavior at `index`
    pub fn set_weight(&mut self, index: usize, weight: f32) {
        if let Some(entry) = self.behaviors.get_mut(index) {
            entry.weight = weight;
        }
    }
}

impl SteeringBehavior for BlendedSteering<'_> {
    fn calculate(&self, agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput {
        self.behaviors
            .iter()
            .map(|entry| entry.behavior.calculate(agent, neighborhood).scale(entry.weight))
            .fold(SteeringOutput::ZERO, SteeringOutput::combine)
    }
}

/// Uses the first behavior that wants to steer
#[derive(Clone, Default)]
pub struct PrioritySteering<'a> {
    behaviors: SmallVec<[&'a dyn SteeringBehavior; 4]>,
}

impl<'a> PrioritySteering<'a> {
    /// Behaviors are tried in order, highest priority first
    #[must_use]
    pub fn new(behaviors: impl IntoIterator<Item = &'a dyn SteeringBehavior>) -> Self {
        Self {
            behaviors: behaviors.into_iter().collect(),
        }
    }
}

impl SteeringBehavior for PrioritySteering<'_> {
    fn calculate(&self, agent: &SteeringAgent, neighborhood: &Neighborhood) -> SteeringOutput {
        self.behaviors
            .iter()
            .map(|behavior| behavior.calculate(agent, neighborhood))
            .find(|output| !output.is_zero())
            .unwrap_or_default()
    }
}
