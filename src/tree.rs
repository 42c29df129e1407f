//! Node and edge data structures for the search
//!
//! Search state lives on edges: an [`Edge`] records what happened after
//! taking one action from one node. A [`Node`] is the heap-ordered list of
//! its outgoing edges plus some bookkeeping. Nodes are stored in an
//! [`Arena`] and addressed by [`NodeId`]; edges only point forward, so a node
//! shared by several parents (a transposition) never needs a back pointer.

use std::fmt;

use crate::heap::Prioritized;
use crate::policy::expansion::ExpansionState;
use crate::problem::Action;
use crate::score::{Counter, Objective};

/// Index of a node in its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node. Always present.
    pub const ROOT: NodeId = NodeId(0);

    /// The arena index of this node
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The statistics of having taken one action from one node
pub struct Edge<A, C> {
    pub(crate) action: A,
    pub(crate) counter: C,
    pub(crate) objective: Option<Objective<C>>,
    pub(crate) num_rollouts: f64,
    pub(crate) prior_weight: f64,
    pub(crate) priority: f64,
    pub(crate) src: NodeId,
    pub(crate) dst: Option<NodeId>,
}

impl<A: Action, C: Counter> Edge<A, C> {
    /// Creates an unvisited edge
    ///
    /// New edges sort before every visited sibling.
    pub fn new(action: A, src: NodeId, prior_weight: f64) -> Self {
        Edge {
            action,
            counter: C::default(),
            objective: None,
            num_rollouts: 0.0,
            prior_weight,
            priority: f64::NEG_INFINITY,
            src,
            dst: None,
        }
    }

    /// The action this edge represents
    pub fn action(&self) -> &A {
        &self.action
    }

    /// The accumulated counter
    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// The objective captured on first visit, if any
    pub fn objective(&self) -> Option<Objective<C>> {
        self.objective
    }

    /// Number of rollouts backed up through this edge
    pub fn num_rollouts(&self) -> f64 {
        self.num_rollouts
    }

    /// Normalized prior weight
    pub fn prior_weight(&self) -> f64 {
        self.prior_weight
    }

    /// Heap key; more negative is preferred
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// The node this edge leaves from
    pub fn src(&self) -> NodeId {
        self.src
    }

    /// The node this edge leads to, once it has been selected
    pub fn dst(&self) -> Option<NodeId> {
        self.dst
    }

    /// The objective applied to the accumulated counter
    pub fn score(&self) -> f64 {
        match self.objective {
            Some(objective) => objective(&self.counter),
            None => 0.0,
        }
    }

    /// Mean score per rollout
    pub fn mean(&self) -> f64 {
        crate::utils::exploitation_term(self.score(), self.num_rollouts)
    }

    /// Snapshot of this edge's statistics
    pub fn stat(&self) -> EdgeStat<A> {
        EdgeStat {
            action: self.action.clone(),
            score: self.score(),
            num_rollouts: self.num_rollouts,
            prior_weight: self.prior_weight,
            priority: self.priority,
        }
    }
}

impl<A, C> Prioritized for Edge<A, C> {
    fn priority(&self) -> f64 {
        self.priority
    }
}

impl<A: fmt::Debug, C: fmt::Debug> fmt::Debug for Edge<A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("action", &self.action)
            .field("counter", &self.counter)
            .field("num_rollouts", &self.num_rollouts)
            .field("prior_weight", &self.prior_weight)
            .field("priority", &self.priority)
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish()
    }
}

/// A search node: the heap-ordered list of outgoing edges
#[derive(Debug)]
pub struct Node<A, C> {
    pub(crate) edges: Vec<Edge<A, C>>,
    pub(crate) fingerprint: u64,
    pub(crate) depth: usize,
    pub(crate) expanded: bool,
    pub(crate) terminal: bool,
    pub(crate) expansion: ExpansionState,
}

impl<A: Action, C: Counter> Node<A, C> {
    /// Creates an unexpanded node
    pub fn new(fingerprint: u64, depth: usize) -> Self {
        Node {
            edges: Vec::new(),
            fingerprint,
            depth,
            expanded: false,
            terminal: false,
            expansion: ExpansionState::default(),
        }
    }

    /// The outgoing edges, in heap order
    pub fn edges(&self) -> &[Edge<A, C>] {
        &self.edges
    }

    /// Finds the outgoing edge for `action`
    pub fn edge(&self, action: &A) -> Option<&Edge<A, C>> {
        self.edges.iter().find(|e| &e.action == action)
    }

    /// Position of the outgoing edge for `action`
    pub fn position(&self, action: &A) -> Option<usize> {
        self.edges.iter().position(|e| &e.action == action)
    }

    /// The fingerprint this node was registered under (graph topology only)
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Depth at which this node was first reached
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True once the problem has been asked for this node's actions
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// True if the problem returned no actions here
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Sum of rollouts over the outgoing edges
    pub fn child_rollouts(&self) -> f64 {
        self.edges.iter().map(|e| e.num_rollouts).sum()
    }

    /// Expansion heuristic bookkeeping
    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }
}

/// Storage for every node of one search
///
/// Nodes are never freed individually; the whole arena is dropped on reset.
#[derive(Debug)]
pub struct Arena<A, C> {
    pub(crate) nodes: Vec<Node<A, C>>,
    pub(crate) root_rollouts: f64,
}

impl<A: Action, C: Counter> Arena<A, C> {
    /// Creates an arena holding only a fresh root
    pub fn new(root_fingerprint: u64) -> Self {
        Arena {
            nodes: vec![Node::new(root_fingerprint, 0)],
            root_rollouts: 0.0,
        }
    }

    /// Returns a node
    ///
    /// # Panics
    /// Panics if `id` does not belong to this arena.
    pub fn get(&self, id: NodeId) -> &Node<A, C> {
        &self.nodes[id.0]
    }

    /// Returns a node mutably
    ///
    /// # Panics
    /// Panics if `id` does not belong to this arena.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<A, C> {
        &mut self.nodes[id.0]
    }

    /// Adds a node and returns its id
    pub fn allocate(&mut self, node: Node<A, C>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// The root node
    pub fn root(&self) -> &Node<A, C> {
        self.get(NodeId::ROOT)
    }

    /// Total rollouts backed up to the root
    pub fn root_rollouts(&self) -> f64 {
        self.root_rollouts
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is allocated on construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<A, C>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Number of edges across all nodes
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }
}

/// One step of a forward path
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep<A> {
    /// Node the edge leaves from
    pub node: NodeId,

    /// Position of the edge in the node's heap when it was selected
    pub index: usize,

    /// The action taken
    pub action: A,
}

/// The edges traversed from the root in the current episode
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPath<A> {
    steps: Vec<PathStep<A>>,
}

impl<A: Action> ForwardPath<A> {
    /// Creates an empty path (pointing at the root)
    pub fn new() -> Self {
        ForwardPath { steps: Vec::new() }
    }

    /// Extends the path
    pub fn push(&mut self, node: NodeId, index: usize, action: A) {
        self.steps.push(PathStep {
            node,
            index,
            action,
        });
    }

    /// Empties the path for the next episode
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// The steps, root first
    pub fn steps(&self) -> &[PathStep<A>] {
        &self.steps
    }

    /// The actions, root first
    pub fn actions(&self) -> impl Iterator<Item = &A> {
        self.steps.iter().map(|s| &s.action)
    }

    /// Returns the length of the path
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the path is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<A: Action> Default for ForwardPath<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> fmt::Display for ForwardPath<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path[")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", step.action)?;
        }
        write!(f, "]")
    }
}

/// Snapshot of one edge's statistics
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStat<A> {
    /// The action
    pub action: A,

    /// Objective applied to the accumulated counter
    pub score: f64,

    /// Rollouts through the edge
    pub num_rollouts: f64,

    /// Prior weight
    pub prior_weight: f64,

    /// Current heap key
    pub priority: f64,
}

impl<A> EdgeStat<A> {
    /// Mean score per rollout
    pub fn mean(&self) -> f64 {
        crate::utils::exploitation_term(self.score, self.num_rollouts)
    }
}

/// Statistics along a sequence of actions from the root
#[derive(Debug, Clone, PartialEq)]
pub struct Variation<A>(pub Vec<EdgeStat<A>>);

impl<A> Variation<A> {
    /// Number of edges found
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if not even the first action was found
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last edge of the variation
    pub fn last(&self) -> Option<&EdgeStat<A>> {
        self.0.last()
    }
}

impl<A: fmt::Display> fmt::Display for Variation<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stat) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(
                f,
                "{} ({:.3}, {})",
                stat.action,
                stat.mean(),
                stat.num_rollouts
            )?;
        }
        Ok(())
    }
}
