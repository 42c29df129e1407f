//! Where search state lives
//!
//! A [`Topology`] decides which node an edge leads to. The [`Tree`] gives
//! every edge a private destination, so a node's identity is the sequence of
//! actions that reached it. The [`Graph`] hash-conses destinations by a state
//! fingerprint, so different action sequences that reach the same state share
//! one node and pool their statistics.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::problem::Action;
use crate::score::Counter;
use crate::tree::{Arena, Node, NodeId};

/// Strategy for resolving edge destinations
pub trait Topology<A: Action, C: Counter> {
    /// The node storage
    fn arena(&self) -> &Arena<A, C>;

    /// The node storage, mutably
    fn arena_mut(&mut self) -> &mut Arena<A, C>;

    /// Returns the destination of edge `index` of `parent`, creating it on
    /// first selection
    ///
    /// `fingerprint` is the problem's fingerprint of the position reached by
    /// the edge, if the problem provides one.
    fn child(&mut self, parent: NodeId, index: usize, fingerprint: Option<u64>) -> NodeId;

    /// Drops every node and starts over from a fresh root
    fn reset(&mut self, root_fingerprint: Option<u64>);

    /// Number of times `child` resolved a new edge to an already known node
    fn transpositions(&self) -> usize {
        0
    }
}

/// Topology where every node has exactly one parent
#[derive(Debug)]
pub struct Tree<A, C> {
    arena: Arena<A, C>,
}

impl<A: Action, C: Counter> Tree<A, C> {
    /// Creates a tree holding only a root
    pub fn new() -> Self {
        Tree {
            arena: Arena::new(0),
        }
    }
}

impl<A: Action, C: Counter> Default for Tree<A, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action, C: Counter> Topology<A, C> for Tree<A, C> {
    fn arena(&self) -> &Arena<A, C> {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut Arena<A, C> {
        &mut self.arena
    }

    fn child(&mut self, parent: NodeId, index: usize, _fingerprint: Option<u64>) -> NodeId {
        if let Some(dst) = self.arena.get(parent).edges[index].dst {
            return dst;
        }
        let depth = self.arena.get(parent).depth + 1;
        let dst = self.arena.allocate(Node::new(0, depth));
        self.arena.get_mut(parent).edges[index].dst = Some(dst);
        dst
    }

    fn reset(&mut self, _root_fingerprint: Option<u64>) {
        self.arena = Arena::new(0);
    }
}

/// Derives a child fingerprint from its parent's fingerprint and the action
pub type Fingerprinter = fn(parent: u64, action: &str) -> u64;

/// Default fingerprint: SipHash of the parent fingerprint and the action text
///
/// Two different paths only collide here when they share the parent node and
/// the action's text, so this detects immediate transpositions and nothing
/// deeper. Problems with real transpositions should implement
/// [`Problem::hash`](crate::Problem::hash).
pub fn default_fingerprint(parent: u64, action: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    action.hash(&mut hasher);
    hasher.finish()
}

/// Topology where nodes are shared by state fingerprint
pub struct Graph<A, C> {
    arena: Arena<A, C>,
    table: HashMap<u64, NodeId>,
    fingerprinter: Fingerprinter,
    transpositions: usize,
}

impl<A: Action, C: Counter> Graph<A, C> {
    /// Creates a graph holding only a root, using [`default_fingerprint`]
    pub fn new() -> Self {
        Self::with_fingerprinter(default_fingerprint)
    }

    /// Creates a graph with a custom fallback fingerprint function
    pub fn with_fingerprinter(fingerprinter: Fingerprinter) -> Self {
        let mut graph = Graph {
            arena: Arena::new(0),
            table: HashMap::new(),
            fingerprinter,
            transpositions: 0,
        };
        graph.table.insert(0, NodeId::ROOT);
        graph
    }

    /// Looks up the node registered under a fingerprint
    pub fn lookup(&self, fingerprint: u64) -> Option<NodeId> {
        self.table.get(&fingerprint).copied()
    }

    /// Number of distinct fingerprints registered
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Number of edges pointing at each node
    pub fn in_degrees(&self) -> HashMap<NodeId, usize> {
        let mut degrees = HashMap::new();
        for (_, node) in self.arena.iter() {
            for dst in node.edges.iter().filter_map(|e| e.dst) {
                *degrees.entry(dst).or_insert(0) += 1;
            }
        }
        degrees
    }
}

impl<A: fmt::Debug, C: fmt::Debug> fmt::Debug for Graph<A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("arena", &self.arena)
            .field("table", &self.table)
            .field("transpositions", &self.transpositions)
            .finish()
    }
}

impl<A: Action, C: Counter> Default for Graph<A, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action, C: Counter> Topology<A, C> for Graph<A, C> {
    fn arena(&self) -> &Arena<A, C> {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut Arena<A, C> {
        &mut self.arena
    }

    fn child(&mut self, parent: NodeId, index: usize, fingerprint: Option<u64>) -> NodeId {
        let parent_node = self.arena.get(parent);
        let edge = &parent_node.edges[index];
        if let Some(dst) = edge.dst {
            return dst;
        }

        let fingerprint = fingerprint.unwrap_or_else(|| {
            (self.fingerprinter)(parent_node.fingerprint, &edge.action.to_string())
        });
        let depth = parent_node.depth + 1;

        let dst = match self.table.get(&fingerprint).copied() {
            Some(existing) => {
                self.transpositions += 1;
                log::trace!("transposition into node {} ({:#x})", existing, fingerprint);
                existing
            }
            None => {
                let id = self.arena.allocate(Node::new(fingerprint, depth));
                self.table.insert(fingerprint, id);
                id
            }
        };
        self.arena.get_mut(parent).edges[index].dst = Some(dst);
        dst
    }

    fn reset(&mut self, root_fingerprint: Option<u64>) {
        let fingerprint = root_fingerprint.unwrap_or(0);
        self.arena = Arena::new(fingerprint);
        self.table = HashMap::new();
        self.table.insert(fingerprint, NodeId::ROOT);
        self.transpositions = 0;
    }

    fn transpositions(&self) -> usize {
        self.transpositions
    }
}
