//! Search bookkeeping
//!
//! Node records live only for the duration of a search. Parents are shared
//! through `Rc` so many open entries can point at the same chain.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use crate::graph::NodeIndex;

/// A visited node together with the way it was reached
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Graph node this record describes
    pub node: NodeIndex,
    /// Record of the node this one was reached from
    pub parent: Option<Rc<NodeRecord>>,
    /// Accumulated cost from the start
    pub g_cost: f32,
    /// `g_cost` plus the heuristic estimate to the goal
    pub f_cost: f32,
}

impl NodeRecord {
    /// Record for the start node
    #[must_use]
    pub fn root(node: NodeIndex, f_cost: f32) -> Rc<Self> {
        Rc::new(Self {
            node,
            parent: None,
            g_cost: 0.0,
            f_cost,
        })
    }

    /// Record reached from `parent`
    #[must_use]
    pub fn child(parent: &Rc<Self>, node: NodeIndex, g_cost: f32, f_cost: f32) -> Rc<Self> {
        Rc::new(Self {
            node,
            parent: Some(Rc::clone(parent)),
            g_cost,
            f_cost,
        })
    }

    /// Walk the parent chain and return the nodes from the root to this one
    #[must_use]
    pub fn path(&self) -> Vec<NodeIndex> {
        let mut path = vec![self.node];
        let mut current = self.parent.as_deref();
        while let Some(record) = current {
            path.push(record.node);
            current = record.parent.as_deref();
        }
        path.reverse();
        path
    }
}

/// Heap entry ordered by lowest f-cost, then by insertion order
#[derive(Debug)]
struct OpenEntry {
    record: Rc<NodeRecord>,
    sequence: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap
        other
            .record
            .f_cost
            .total_cmp(&self.record.f_cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of open records.
///
/// Ties on f-cost pop in insertion order, which keeps results reproducible.
/// Outdated entries are not removed; callers skip them when popped.
#[derive(Debug, Default)]
pub(crate) struct OpenSet {
    heap: BinaryHeap<OpenEntry>,
    next_sequence: u64,
}

impl OpenSet {
    pub(crate) fn push(&mut self, record: Rc<NodeRecord>) {
        self.heap.push(OpenEntry {
            record,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<Rc<NodeRecord>> {
        self.heap.pop().map(|entry| entry.record)
    }
}
