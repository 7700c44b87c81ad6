//! Finite state machines for agent decision making
//!
//! Two flavors are provided:
//!
//! - [`StateMachine`]: states are values that decide their own transitions
//!   and receive a caller-defined context.
//! - [`FiniteStateMachine`]: states are registered by name and transitions
//!   are conditions on a [`Blackboard`], so the graph of states is data.
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = FiniteStateMachine::new(blackboard);
//! fsm.add_state("Wander", WanderState);
//! fsm.add_state("SeekFood", SeekFoodState);
//! fsm.add_transition("Wander", "SeekFood", |bb| has_food_nearby(bb))?;
//! fsm.start("Wander")?;
//! fsm.update(dt);
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

use super::blackboard::Blackboard;

// ============================================================================
// State Trait
// ============================================================================

/// A state that owns its transition logic.
///
/// The lifecycle is:
///
/// 1. `enter()` - Called once when entering this state
/// 2. `update()` - Called each frame while in this state
/// 3. `exit()` - Called once when leaving this state
pub trait State<Ctx = ()>: fmt::Debug {
    /// State name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Called when entering this state.
    fn enter(&mut self, _ctx: &mut Ctx) {}

    /// Called each frame while in this state.
    fn update(&mut self, ctx: &mut Ctx) -> Transition<Ctx>;

    /// Called when exiting this state.
    fn exit(&mut self, _ctx: &mut Ctx) {}
}

/// Whether to stay in the current state or switch.
pub enum Transition<Ctx = ()> {
    /// Stay in the current state.
    None,
    /// Transition to a new state.
    To(Box<dyn State<Ctx>>),
}

impl<Ctx> Transition<Ctx> {
    /// Create a transition to a new state.
    pub fn to<S: State<Ctx> + 'static>(state: S) -> Self {
        Transition::To(Box::new(state))
    }
}

impl<Ctx> fmt::Debug for Transition<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "Transition::None"),
            Transition::To(state) => write!(f, "Transition::To({})", state.name()),
        }
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// A state machine whose states pick their successors.
///
/// # Type Parameters
///
/// - `Ctx`: Context passed to state methods (agent data, a blackboard, ...)
pub struct StateMachine<Ctx = ()> {
    /// Current active state
    current: Box<dyn State<Ctx>>,
    /// Whether enter() has been called on current state
    entered: bool,
}

impl<Ctx> StateMachine<Ctx> {
    /// Create a new state machine with an initial state.
    ///
    /// The initial state's `enter()` will be called on the first `update()`.
    pub fn new<S: State<Ctx> + 'static>(initial: S) -> Self {
        Self {
            current: Box::new(initial),
            entered: false,
        }
    }

    /// Update the state machine.
    ///
    /// Calls `enter()` on first update, then `update()` each frame.
    /// Handles transitions by calling `exit()` on old state and `enter()` on new.
    pub fn update(&mut self, ctx: &mut Ctx) {
        if !self.entered {
            self.current.enter(ctx);
            self.entered = true;
        }

        if let Transition::To(mut new_state) = self.current.update(ctx) {
            log::debug!(
                "State machine: {} -> {}",
                self.current.name(),
                new_state.name()
            );
            self.current.exit(ctx);
            new_state.enter(ctx);
            self.current = new_state;
        }
    }

    /// Force a transition to a new state.
    ///
    /// Immediately exits the current state and enters the new one.
    pub fn transition<S: State<Ctx> + 'static>(&mut self, ctx: &mut Ctx, new_state: S) {
        if self.entered {
            self.current.exit(ctx);
        }

        self.current = Box::new(new_state);
        self.current.enter(ctx);
        self.entered = true;
    }

    /// Get the name of the current state.
    #[must_use]
    pub fn current_state_name(&self) -> &'static str {
        self.current.name()
    }

    /// Check if the FSM is in a state with the given name.
    #[must_use]
    pub fn is_in_state(&self, name: &str) -> bool {
        self.current.name() == name
    }
}

impl<Ctx> fmt::Debug for StateMachine<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current.name())
            .field("entered", &self.entered)
            .finish()
    }
}

// ============================================================================
// Blackboard-driven FSM
// ============================================================================

/// A state of a [`FiniteStateMachine`]
pub trait FsmState {
    /// Called when the machine switches to this state
    fn on_enter(&mut self, _blackboard: &mut Blackboard) {}

    /// Called when the machine leaves this state
    fn on_exit(&mut self, _blackboard: &mut Blackboard) {}

    /// Called every update while this state is active
    fn update(&mut self, _blackboard: &mut Blackboard, _delta_time: f32) {}
}

/// Transition condition evaluated against the blackboard
pub type Condition = Box<dyn Fn(&Blackboard) -> bool>;

struct FsmTransition {
    condition: Condition,
    to: String,
}

/// A state machine with named states and condition-driven transitions.
///
/// Each update evaluates the transitions leaving the current state in the
/// order they were added; the first condition that holds switches state.
/// The (possibly new) current state is then updated.
pub struct FiniteStateMachine {
    states: FxHashMap<String, Box<dyn FsmState>>,
    transitions: FxHashMap<String, Vec<FsmTransition>>,
    current: Option<String>,
    blackboard: Blackboard,
}

impl FiniteStateMachine {
    /// Create a machine with no states that owns `blackboard`
    #[must_use]
    pub fn new(blackboard: Blackboard) -> Self {
        Self {
            states: FxHashMap::default(),
            transitions: FxHashMap::default(),
            current: None,
            blackboard,
        }
    }

    /// Register a state, replacing any state of the same name
    pub fn add_state(&mut self, name: impl Into<String>, state: impl FsmState + 'static) {
        self.states.insert(name.into(), Box::new(state));
    }

    /// Add a transition between two registered states.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::UnknownState`] if either state is not registered.
    pub fn add_transition(
        &mut self,
        from: &str,
        to: &str,
        condition: impl Fn(&Blackboard) -> bool + 'static,
    ) -> Result<(), FsmError> {
        for name in [from, to] {
            if !self.states.contains_key(name) {
                return Err(FsmError::UnknownState(name.to_string()));
            }
        }

        self.transitions
            .entry(from.to_string())
            .or_default()
            .push(FsmTransition {
                condition: Box::new(condition),
                to: to.to_string(),
            });
        Ok(())
    }

    /// Enter the initial state
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::UnknownState`] if the state is not registered.
    pub fn start(&mut self, name: &str) -> Result<(), FsmError> {
        self.change_state(name)
    }

    /// Exit the current state (if any) and enter `name`
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::UnknownState`] if the state is not registered.
    pub fn change_state(&mut self, name: &str) -> Result<(), FsmError> {
        if !self.states.contains_key(name) {
            return Err(FsmError::UnknownState(name.to_string()));
        }

        if let Some(state) = self
            .current
            .as_deref()
            .and_then(|current| self.states.get_mut(current))
        {
            state.on_exit(&mut self.blackboard);
        }

        log::debug!(
            "FSM: {} -> {name}",
            self.current.as_deref().unwrap_or("<none>")
        );
        self.current = Some(name.to_string());

        if let Some(state) = self.states.get_mut(name) {
            state.on_enter(&mut self.blackboard);
        }
        Ok(())
    }

    /// Evaluate transitions, then update the current state
    pub fn update(&mut self, delta_time: f32) {
        let Some(current) = self.current.as_deref() else {
            return;
        };

        let next = self.transitions.get(current).and_then(|transitions| {
            transitions
                .iter()
                .find(|transition| (transition.condition)(&self.blackboard))
                .map(|transition| transition.to.clone())
        });
        if let Some(next) = next {
            // Targets were validated when the transition was added
            if let Err(err) = self.change_state(&next) {
                log::warn!("FSM transition failed: {err}");
            }
        }

        if let Some(state) = self
            .current
            .as_deref()
            .and_then(|current| self.states.get_mut(current))
        {
            state.update(&mut self.blackboard, delta_time);
        }
    }

    /// Name of the active state
    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    #[must_use]
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }
}

impl fmt::Debug for FiniteStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiniteStateMachine")
            .field("current", &self.current)
            .field("states", &self.states.len())
            .finish()
    }
}

/// Errors raised while building or driving a [`FiniteStateMachine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsmError {
    /// No state registered under this name
    UnknownState(String),
}

impl fmt::Display for FsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownState(name) => write!(f, "Unknown state '{name}'"),
        }
    }
}

impl std::error::Error for FsmError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// Agent data shared with the self-transitioning states
    #[derive(Debug, Default)]
    struct AgentContext {
        delta_time: f32,
        distance_to_food: f32,
        eaten: usize,
        exits: usize,
    }

    #[derive(Debug)]
    struct Wandering {
        time: f32,
        give_up_after: f32,
    }

    #[derive(Debug)]
    struct Seeking;

    #[derive(Debug)]
    struct Eating;

    impl State<AgentContext> for Wandering {
        fn name(&self) -> &'static str {
            "Wandering"
        }

        fn enter(&mut self, _ctx: &mut AgentContext) {
            self.time = 0.0;
        }

        fn update(&mut self, ctx: &mut AgentContext) -> Transition<AgentContext> {
            self.time += ctx.delta_time;
            if ctx.distance_to_food < 10.0 || self.time >= self.give_up_after {
                return Transition::to(Seeking);
            }
            Transition::None
        }

        fn exit(&mut self, ctx: &mut AgentContext) {
            ctx.exits += 1;
        }
    }

    impl State<AgentContext> for Seeking {
        fn name(&self) -> &'static str {
            "Seeking"
        }

        fn update(&mut self, ctx: &mut AgentContext) -> Transition<AgentContext> {
            if ctx.distance_to_food < 1.0 {
                Transition::to(Eating)
            } else {
                Transition::None
            }
        }
    }

    impl State<AgentContext> for Eating {
        fn name(&self) -> &'static str {
            "Eating"
        }

        fn update(&mut self, ctx: &mut AgentContext) -> Transition<AgentContext> {
            ctx.eaten += 1;
            ctx.distance_to_food = f32::MAX;
            Transition::to(Wandering {
                time: 0.0,
                give_up_after: 5.0,
            })
        }
    }

    fn wandering() -> Wandering {
        Wandering {
            time: 0.0,
            give_up_after: 5.0,
        }
    }

    #[test]
    fn test_fsm_initial_state() {
        let fsm: StateMachine<AgentContext> = StateMachine::new(wandering());
        assert_eq!(fsm.current_state_name(), "Wandering");
        assert!(!fsm.entered);
    }

    #[test]
    fn test_fsm_transition_on_condition() {
        let mut fsm = StateMachine::new(wandering());
        let mut ctx = AgentContext {
            distance_to_food: 5.0,
            ..Default::default()
        };

        fsm.update(&mut ctx);

        assert!(fsm.entered);
        assert_eq!(fsm.current_state_name(), "Seeking");
        assert_eq!(ctx.exits, 1);
    }

    #[test]
    fn test_fsm_transition_on_timeout() {
        let mut fsm = StateMachine::new(wandering());
        let mut ctx = AgentContext {
            delta_time: 2.0,
            distance_to_food: 100.0,
            ..Default::default()
        };

        fsm.update(&mut ctx);
        fsm.update(&mut ctx);
        assert!(fsm.is_in_state("Wandering"));

        fsm.update(&mut ctx);
        assert!(fsm.is_in_state("Seeking"));
    }

    #[test]
    fn test_fsm_full_cycle() {
        let mut fsm = StateMachine::new(Seeking);
        let mut ctx = AgentContext {
            distance_to_food: 0.5,
            ..Default::default()
        };

        fsm.update(&mut ctx);
        assert!(fsm.is_in_state("Eating"));

        fsm.update(&mut ctx);
        assert!(fsm.is_in_state("Wandering"));
        assert_eq!(ctx.eaten, 1);
    }

    #[test]
    fn test_fsm_forced_transition() {
        let mut fsm = StateMachine::new(wandering());
        let mut ctx = AgentContext::default();

        fsm.transition(&mut ctx, Eating);

        assert_eq!(fsm.current_state_name(), "Eating");
        assert_eq!(ctx.exits, 0); // Never entered, so never exited
    }

    // ------------------------------------------------------------------------
    // FiniteStateMachine
    // ------------------------------------------------------------------------

    struct Wander;

    struct SeekFood;

    impl FsmState for Wander {
        fn on_enter(&mut self, blackboard: &mut Blackboard) {
            let _ = blackboard.change_data("Target", None::<Vec2>);
        }
    }

    impl FsmState for SeekFood {
        fn on_enter(&mut self, blackboard: &mut Blackboard) {
            let food = blackboard.get_data::<Vec2>("Food").copied().ok();
            let _ = blackboard.change_data("Target", food);
        }

        fn update(&mut self, blackboard: &mut Blackboard, delta_time: f32) {
            if let Ok(time) = blackboard.get_data_mut::<f32>("SeekTime") {
                *time += delta_time;
            }
        }
    }

    fn food_fsm() -> FiniteStateMachine {
        let mut blackboard = Blackboard::new();
        blackboard.add_data("Food", Vec2::new(3.0, 4.0)).unwrap();
        blackboard.add_data("FoodNearby", false).unwrap();
        blackboard.add_data("Target", None::<Vec2>).unwrap();
        blackboard.add_data("SeekTime", 0.0f32).unwrap();

        let mut fsm = FiniteStateMachine::new(blackboard);
        fsm.add_state("Wander", Wander);
        fsm.add_state("SeekFood", SeekFood);
        fsm.add_transition("Wander", "SeekFood", |bb| {
            bb.get_data::<bool>("FoodNearby").copied().unwrap_or(false)
        })
        .unwrap();
        fsm.add_transition("SeekFood", "Wander", |bb| {
            !bb.get_data::<bool>("FoodNearby").copied().unwrap_or(false)
        })
        .unwrap();
        fsm
    }

    #[test]
    fn test_named_fsm_transitions() {
        let mut fsm = food_fsm();
        assert_eq!(fsm.current_state(), None);
        fsm.start("Wander").unwrap();

        fsm.update(0.5);
        assert_eq!(fsm.current_state(), Some("Wander"));

        fsm.blackboard_mut().change_data("FoodNearby", true).unwrap();
        fsm.update(0.5);
        assert_eq!(fsm.current_state(), Some("SeekFood"));
        assert_eq!(
            *fsm.blackboard().get_data::<Option<Vec2>>("Target").unwrap(),
            Some(Vec2::new(3.0, 4.0))
        );
        // Updated in the same frame it was entered
        assert!((fsm.blackboard().get_data::<f32>("SeekTime").unwrap() - 0.5).abs() < 0.001);

        fsm.blackboard_mut().change_data("FoodNearby", false).unwrap();
        fsm.update(0.5);
        assert_eq!(fsm.current_state(), Some("Wander"));
        assert_eq!(*fsm.blackboard().get_data::<Option<Vec2>>("Target").unwrap(), None);
    }

    #[test]
    fn test_named_fsm_unknown_states() {
        let mut fsm = food_fsm();

        assert_eq!(
            fsm.add_transition("Wander", "Flee", |_| true),
            Err(FsmError::UnknownState("Flee".to_string()))
        );
        assert_eq!(
            fsm.start("Sleep"),
            Err(FsmError::UnknownState("Sleep".to_string()))
        );
        assert_eq!(fsm.current_state(), None);
    }

    #[test]
    fn test_named_fsm_without_start_does_nothing() {
        let mut fsm = food_fsm();
        fsm.blackboard_mut().change_data("FoodNearby", true).unwrap();

        fsm.update(1.0);

        assert_eq!(fsm.current_state(), None);
    }
}
