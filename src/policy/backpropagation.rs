//! Backpropagation of rollout samples
//!
//! The forward path is walked from the frontier back to the root. Every edge
//! on it absorbs the sample, and the edge list it leads to is re-ranked
//! against the edge's new rollout count. Re-ranking a node's children with
//! the count of the edge actually traversed (rather than some node-wide
//! total) is what keeps priorities meaningful in the graph topology, where a
//! node can be reached through several parents with different histories.

use crate::policy::selection::{reprioritize, PriorityPolicy};
use crate::problem::{Action, Rollout};
use crate::score::Counter;
use crate::tree::{Arena, ForwardPath, Node, NodeId, PathStep};

/// Finds the position of a path step's edge in its node
///
/// Usually the recorded index, unless a repeated node on the same path was
/// re-ranked after the step was recorded.
fn locate<A: Action, C: Counter>(node: &Node<A, C>, step: &PathStep<A>) -> Option<usize> {
    match node.edges.get(step.index) {
        Some(edge) if edge.action == step.action => Some(step.index),
        _ => node.position(&step.action),
    }
}

/// Folds a rollout into every edge of the forward path and the root
pub fn backpropagate<A: Action, C: Counter>(
    arena: &mut Arena<A, C>,
    path: &ForwardPath<A>,
    rollout: &Rollout<C>,
    policy: PriorityPolicy,
    exploration_constant: f64,
) {
    let rollouts = rollout.rollouts as f64;

    for step in path.steps().iter().rev() {
        let node = arena.get_mut(step.node);
        let Some(index) = locate(node, step) else {
            log::warn!("edge {} vanished from node {}", step.action, step.node);
            continue;
        };

        let edge = &mut node.edges[index];
        edge.counter.merge(&rollout.counter);
        edge.num_rollouts += rollouts;
        let parent_rollouts = edge.num_rollouts;

        if let Some(dst) = edge.dst {
            let children = &mut arena.get_mut(dst).edges;
            if !children.is_empty() {
                reprioritize(children, parent_rollouts, policy, exploration_constant);
            }
        }
    }

    arena.root_rollouts += rollouts;
    let root_rollouts = arena.root_rollouts;
    reprioritize(
        &mut arena.get_mut(NodeId::ROOT).edges,
        root_rollouts,
        policy,
        exploration_constant,
    );
}
