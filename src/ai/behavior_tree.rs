//! Behavior trees
//!
//! Composites ([`Selector`], [`Sequence`], [`PartialSequence`],
//! [`Parallel`]) route execution to their children; leaves
//! ([`Conditional`], [`Action`]) read and write the tree's [`Blackboard`].

use std::fmt;

use super::blackboard::Blackboard;

/// Result of executing a behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorState {
    #[default]
    Failure,
    Success,
    Running,
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure => write!(f, "Failure"),
            Self::Success => write!(f, "Success"),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// A node of a behavior tree
pub trait Behavior {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState;
}

/// Boxed child node
pub type BoxedBehavior = Box<dyn Behavior>;

// ============================================================================
// Composites
// ============================================================================

/// Runs children in order until one does not fail
#[derive(Default)]
pub struct Selector {
    children: Vec<BoxedBehavior>,
}

impl Selector {
    #[must_use]
    pub fn new(children: Vec<BoxedBehavior>) -> Self {
        Self { children }
    }
}

impl Behavior for Selector {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState {
        for child in &mut self.children {
            match child.execute(blackboard) {
                BehaviorState::Failure => continue,
                state => return state,
            }
        }
        BehaviorState::Failure
    }
}

/// Runs children in order until one does not succeed
#[derive(Default)]
pub struct Sequence {
    children: Vec<BoxedBehavior>,
}

impl Sequence {
    #[must_use]
    pub fn new(children: Vec<BoxedBehavior>) -> Self {
        Self { children }
    }
}

impl Behavior for Sequence {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState {
        for child in &mut self.children {
            match child.execute(blackboard) {
                BehaviorState::Success => continue,
                state => return state,
            }
        }
        BehaviorState::Success
    }
}

/// A sequence that advances at most one child per execution.
///
/// Each success moves on to the next child and reports `Running`; a failure
/// restarts from the first child. Succeeds once the last child has.
#[derive(Default)]
pub struct PartialSequence {
    children: Vec<BoxedBehavior>,
    current: usize,
}

impl PartialSequence {
    #[must_use]
    pub fn new(children: Vec<BoxedBehavior>) -> Self {
        Self {
            children,
            current: 0,
        }
    }

    /// Index of the child that runs next
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }
}

impl Behavior for PartialSequence {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState {
        let Some(child) = self.children.get_mut(self.current) else {
            self.current = 0;
            return BehaviorState::Success;
        };

        match child.execute(blackboard) {
            BehaviorState::Failure => {
                self.current = 0;
                BehaviorState::Failure
            }
            BehaviorState::Success => {
                self.current += 1;
                if self.current == self.children.len() {
                    self.current = 0;
                    BehaviorState::Success
                } else {
                    BehaviorState::Running
                }
            }
            BehaviorState::Running => BehaviorState::Running,
        }
    }
}

/// How many children a [`Parallel`] needs for a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    RequireOne,
    RequireAll,
}

/// Runs every child each execution and combines the results by policy
pub struct Parallel {
    children: Vec<BoxedBehavior>,
    success_policy: Policy,
    failure_policy: Policy,
}

impl Parallel {
    #[must_use]
    pub fn new(
        children: Vec<BoxedBehavior>,
        success_policy: Policy,
        failure_policy: Policy,
    ) -> Self {
        Self {
            children,
            success_policy,
            failure_policy,
        }
    }
}

impl Behavior for Parallel {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState {
        let mut successes = 0;
        let mut failures = 0;

        for child in &mut self.children {
            match child.execute(blackboard) {
                BehaviorState::Success => {
                    successes += 1;
                    if self.success_policy == Policy::RequireOne {
                        return BehaviorState::Success;
                    }
                }
                BehaviorState::Failure => {
                    failures += 1;
                    if self.failure_policy == Policy::RequireOne {
                        return BehaviorState::Failure;
                    }
                }
                BehaviorState::Running => {}
            }
        }

        let total = self.children.len();
        if self.success_policy == Policy::RequireAll && successes == total {
            BehaviorState::Success
        } else if self.failure_policy == Policy::RequireAll && failures == total {
            BehaviorState::Failure
        } else {
            BehaviorState::Running
        }
    }
}

// ============================================================================
// Leaves and decorators
// ============================================================================

/// Succeeds when the predicate holds, fails otherwise
pub struct Conditional {
    predicate: Box<dyn Fn(&Blackboard) -> bool>,
}

impl Conditional {
    pub fn new(predicate: impl Fn(&Blackboard) -> bool + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl Behavior for Conditional {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState {
        if (self.predicate)(blackboard) {
            BehaviorState::Success
        } else {
            BehaviorState::Failure
        }
    }
}

/// Runs a closure that reports its own state
pub struct Action {
    action: Box<dyn FnMut(&mut Blackboard) -> BehaviorState>,
}

impl Action {
    pub fn new(action: impl FnMut(&mut Blackboard) -> BehaviorState + 'static) -> Self {
        Self {
            action: Box::new(action),
        }
    }
}

impl Behavior for Action {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState {
        (self.action)(blackboard)
    }
}

/// Swaps success and failure of its child; `Running` passes through
pub struct Inverter {
    child: BoxedBehavior,
}

impl Inverter {
    #[must_use]
    pub fn new(child: BoxedBehavior) -> Self {
        Self { child }
    }
}

impl Behavior for Inverter {
    fn execute(&mut self, blackboard: &mut Blackboard) -> BehaviorState {
        match self.child.execute(blackboard) {
            BehaviorState::Success => BehaviorState::Failure,
            BehaviorState::Failure => BehaviorState::Success,
            BehaviorState::Running => BehaviorState::Running,
        }
    }
}

// ============================================================================
// Tree
// ============================================================================

/// A root behavior plus the blackboard it works on
pub struct BehaviorTree {
    root: BoxedBehavior,
    blackboard: Blackboard,
    state: BehaviorState,
}

impl BehaviorTree {
    #[must_use]
    pub fn new(root: BoxedBehavior, blackboard: Blackboard) -> Self {
        Self {
            root,
            blackboard,
            state: BehaviorState::Failure,
        }
    }

    /// Execute the tree once
    pub fn update(&mut self) -> BehaviorState {
        self.state = self.root.execute(&mut self.blackboard);
        self.state
    }

    /// State returned by the last update
    #[must_use]
    pub fn state(&self) -> BehaviorState {
        self.state
    }

    #[must_use]
    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }
}

impl fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("state", &self.state)
            .field("blackboard", &self.blackboard)
            .finish()
    }
}
