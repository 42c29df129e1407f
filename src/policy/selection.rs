//! Selection policies for the search
//!
//! Every node keeps its edges in a min-heap keyed by `priority`, the negated
//! policy value. Selecting a child is therefore just reading the heap root;
//! the work happens when priorities are recomputed during backpropagation.

use crate::heap;
use crate::problem::Action;
use crate::score::Counter;
use crate::tree::{Edge, Node};
use crate::utils;

/// Formula used to turn edge statistics into a priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityPolicy {
    /// Upper Confidence Bound for Trees
    ///
    /// ```text
    /// UCT = score / n + C * sqrt(ln(N) / n)
    /// ```
    #[default]
    Uct,

    /// Predictor-weighted UCB, using each edge's prior weight
    ///
    /// ```text
    /// PUCB = (score + prior * C * sqrt(N)) / n
    /// ```
    Pucb,
}

impl PriorityPolicy {
    /// Calculates the priority of an edge: the negated policy value
    ///
    /// Unvisited edges get `-inf`, so every sibling is tried once before any
    /// is tried twice.
    pub fn priority(
        &self,
        score: f64,
        num_rollouts: f64,
        prior_weight: f64,
        parent_rollouts: f64,
        exploration_constant: f64,
    ) -> f64 {
        if num_rollouts <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let value = match self {
            PriorityPolicy::Uct => {
                utils::uct_value(score, num_rollouts, parent_rollouts, exploration_constant)
            }
            PriorityPolicy::Pucb => {
                let explore = exploration_constant * parent_rollouts.max(0.0).sqrt();
                utils::pucb_value(score, num_rollouts, prior_weight, explore)
            }
        };
        -value
    }

    /// Calculates the priority of `edge` under a parent with `parent_rollouts`
    pub fn edge_priority<A: Action, C: Counter>(
        &self,
        edge: &Edge<A, C>,
        parent_rollouts: f64,
        exploration_constant: f64,
    ) -> f64 {
        self.priority(
            edge.score(),
            edge.num_rollouts,
            edge.prior_weight,
            parent_rollouts,
            exploration_constant,
        )
    }
}

/// Recomputes every priority in an edge list against a new parent rollout
/// count and restores the heap
pub fn reprioritize<A: Action, C: Counter>(
    edges: &mut [Edge<A, C>],
    parent_rollouts: f64,
    policy: PriorityPolicy,
    exploration_constant: f64,
) {
    for edge in edges.iter_mut() {
        edge.priority = policy.edge_priority(edge, parent_rollouts, exploration_constant);
    }
    heap::init(edges);
}

/// Returns the index of the most preferred edge, if any
pub fn select_edge<A: Action, C: Counter>(node: &Node<A, C>) -> Option<usize> {
    if node.edges.is_empty() {
        None
    } else {
        Some(0)
    }
}
