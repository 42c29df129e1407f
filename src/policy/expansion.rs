//! Expansion policies decide when a node asks the problem for actions and
//! how the returned actions become edges.
//!
//! A node is always expanded the first time selection reaches it, optionally
//! followed by a fixed number of burn-in expansions in the same visit. After
//! that it may be expanded again speculatively, for problems whose move
//! generator only returns a sample of the legal actions. The decision is
//! driven by how often past expansions of the node reproduced already known
//! actions.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::MCTSConfig;
use crate::heap;
use crate::problem::{Action, FrontierAction};
use crate::score::Counter;
use crate::tree::{Edge, Node, NodeId};
use crate::{MCTSError, Result};

/// Per-node expansion bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionState {
    hits: f64,
    samples: f64,
    speculative: usize,
}

impl ExpansionState {
    /// Number of returned actions that were already known
    pub fn hits(&self) -> f64 {
        self.hits
    }

    /// Number of actions returned by all expansions of the node
    pub fn samples(&self) -> f64 {
        self.samples
    }

    /// Number of speculative re-expansions performed
    pub fn speculative(&self) -> usize {
        self.speculative
    }

    /// Fraction of returned actions that were new
    pub fn miss_rate(&self) -> f64 {
        if self.samples <= 0.0 {
            return 1.0;
        }
        1.0 - self.hits / self.samples
    }

    /// Decides whether another expansion is worth it
    ///
    /// Always true before the first sample, then true with probability equal
    /// to the miss rate.
    pub fn test<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.samples <= 0.0 {
            return true;
        }
        rng.gen::<f64>() * self.samples > self.hits
    }

    fn record(&mut self, hits: usize, misses: usize) {
        self.hits += hits as f64;
        self.samples += (hits + misses) as f64;
    }
}

/// Limits on re-expanding nodes, taken from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    /// Extra expansions forced on a node's first visit
    pub burn_in: usize,

    /// Minimum depth for speculative expansion
    pub min_expand_depth: usize,

    /// Maximum speculative expansions per node
    pub max_speculative_expansions: usize,
}

impl From<&MCTSConfig> for ExpansionLimits {
    fn from(config: &MCTSConfig) -> Self {
        ExpansionLimits {
            burn_in: config.expand_burn_in,
            min_expand_depth: config.min_expand_depth,
            max_speculative_expansions: config.max_speculative_expansions,
        }
    }
}

/// What selection should do at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandDecision {
    /// The node has never been expanded
    Frontier,

    /// The heuristic chose to look for more actions
    Speculative,

    /// Use the existing edges
    Skip,
}

impl ExpandDecision {
    /// True for every decision that calls the problem's move generator
    pub fn expands(self) -> bool {
        self != ExpandDecision::Skip
    }
}

/// Decides whether the node at `depth` should be expanded in this episode
///
/// Speculative decisions are charged to the node immediately.
pub fn should_expand<A: Action, C: Counter, R: Rng + ?Sized>(
    node: &mut Node<A, C>,
    depth: usize,
    limits: &ExpansionLimits,
    rng: &mut R,
) -> ExpandDecision {
    if node.terminal {
        return ExpandDecision::Skip;
    }
    if !node.expanded {
        return ExpandDecision::Frontier;
    }
    let state = &mut node.expansion;
    if depth < limits.min_expand_depth || state.speculative >= limits.max_speculative_expansions {
        return ExpandDecision::Skip;
    }
    if state.test(rng) {
        state.speculative += 1;
        return ExpandDecision::Speculative;
    }
    ExpandDecision::Skip
}

/// Normalizes the prior weights of freshly generated actions
///
/// If every weight is equal (including the default of 1, or all zeros), each
/// becomes `1/sqrt(K)`. Otherwise weights are divided by their total so they
/// sum to 1.
pub fn normalize_weights<A: Action>(actions: &mut [FrontierAction<A>]) -> Result<()> {
    for candidate in actions.iter() {
        if !candidate.weight.is_finite() || candidate.weight < 0.0 {
            return Err(MCTSError::InvalidPriorWeight {
                action: candidate.action.to_string(),
                weight: candidate.weight,
            });
        }
    }
    let Some(first) = actions.first().map(|c| c.weight) else {
        return Ok(());
    };

    if actions.iter().all(|c| c.weight == first) {
        let uniform = 1.0 / (actions.len() as f64).sqrt();
        for candidate in actions.iter_mut() {
            candidate.weight = uniform;
        }
        return Ok(());
    }

    let total: f64 = actions.iter().map(|c| c.weight).sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(MCTSError::ZeroTotalWeight {
            actions: actions.len(),
        });
    }
    for candidate in actions.iter_mut() {
        candidate.weight /= total;
    }
    Ok(())
}

/// Counts of what one expansion produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Actions that already had an edge
    pub hits: usize,

    /// Actions that created a new edge
    pub misses: usize,
}

/// Turns generated actions into edges of `node`
///
/// The actions are shuffled first so that generation order cannot bias the
/// order in which new edges are tried. Known actions keep their statistics
/// and only receive the new prior weight. An empty first expansion marks the
/// node terminal. Nothing is modified if the weights are invalid.
pub fn expand_node<A: Action, C: Counter, R: Rng + ?Sized>(
    id: NodeId,
    node: &mut Node<A, C>,
    mut actions: Vec<FrontierAction<A>>,
    rng: &mut R,
) -> Result<Expansion> {
    normalize_weights(&mut actions)?;

    if !node.expanded {
        node.expanded = true;
        if actions.is_empty() {
            node.terminal = true;
            return Ok(Expansion::default());
        }
    }

    actions.shuffle(rng);

    let mut expansion = Expansion::default();
    for candidate in actions {
        match node.position(&candidate.action) {
            Some(index) => {
                node.edges[index].prior_weight = candidate.weight;
                expansion.hits += 1;
            }
            None => {
                node.edges.push(Edge::new(candidate.action, id, candidate.weight));
                expansion.misses += 1;
            }
        }
    }
    node.expansion.record(expansion.hits, expansion.misses);
    heap::init(&mut node.edges);

    log::trace!(
        "expanded node {}: {} new, {} known, {} edges",
        id,
        expansion.misses,
        expansion.hits,
        node.edges.len()
    );
    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidates(weights: &[f64]) -> Vec<FrontierAction<usize>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| FrontierAction::new(i).with_weight(*w))
            .collect()
    }

    fn limits(burn_in: usize, min_depth: usize, max_speculative: usize) -> ExpansionLimits {
        ExpansionLimits {
            burn_in,
            min_expand_depth: min_depth,
            max_speculative_expansions: max_speculative,
        }
    }

    #[test]
    fn test_uniform_weights_become_inverse_sqrt() {
        let mut actions = candidates(&[1.0; 4]);
        normalize_weights(&mut actions).unwrap();
        for a in &actions {
            assert!((a.weight - 0.5).abs() < 1e-12);
        }

        let mut zeros = candidates(&[0.0; 9]);
        normalize_weights(&mut zeros).unwrap();
        for a in &zeros {
            assert!((a.weight - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uneven_weights_sum_to_one() {
        let mut actions = candidates(&[1.0, 3.0, 0.0, 4.0]);
        normalize_weights(&mut actions).unwrap();
        let total: f64 = actions.iter().map(|a| a.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((actions[1].weight - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        let mut negative = candidates(&[1.0, -0.5]);
        assert!(matches!(
            normalize_weights(&mut negative),
            Err(MCTSError::InvalidPriorWeight { .. })
        ));

        let mut nan = candidates(&[f64::NAN, 1.0]);
        assert!(normalize_weights(&mut nan).is_err());

        let mut empty = candidates(&[]);
        assert!(normalize_weights(&mut empty).is_ok());
    }

    #[test]
    fn test_first_expansion_creates_unvisited_edges() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut node: Node<usize, f64> = Node::new(0, 0);
        let result = expand_node(NodeId::ROOT, &mut node, candidates(&[1.0; 5]), &mut rng).unwrap();

        assert_eq!(result, Expansion { hits: 0, misses: 5 });
        assert!(node.is_expanded());
        assert!(!node.is_terminal());
        assert_eq!(node.edges().len(), 5);
        assert!(node.edges().iter().all(|e| e.priority() == f64::NEG_INFINITY));
        assert!(node.edges().iter().all(|e| e.src() == NodeId::ROOT));
        assert_eq!(node.expansion().samples(), 5.0);
    }

    #[test]
    fn test_empty_first_expansion_marks_terminal() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut node: Node<usize, f64> = Node::new(0, 0);
        expand_node(NodeId::ROOT, &mut node, Vec::new(), &mut rng).unwrap();
        assert!(node.is_terminal());
        assert_eq!(
            should_expand(&mut node, 5, &limits(0, 0, 10), &mut rng),
            ExpandDecision::Skip
        );
    }

    #[test]
    fn test_reexpansion_counts_hits() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut node: Node<usize, f64> = Node::new(0, 0);
        expand_node(NodeId::ROOT, &mut node, candidates(&[1.0; 3]), &mut rng).unwrap();
        let again = expand_node(NodeId::ROOT, &mut node, candidates(&[1.0; 4]), &mut rng).unwrap();

        assert_eq!(again, Expansion { hits: 3, misses: 1 });
        assert_eq!(node.edges().len(), 4);
        assert_eq!(node.expansion().hits(), 3.0);
        assert_eq!(node.expansion().samples(), 7.0);
    }

    #[test]
    fn test_bad_weights_leave_node_untouched() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut node: Node<usize, f64> = Node::new(0, 0);
        assert!(expand_node(NodeId::ROOT, &mut node, candidates(&[1.0, -1.0]), &mut rng).is_err());
        assert!(!node.is_expanded());
        assert!(node.edges().is_empty());
    }

    #[test]
    fn test_burn_in_is_spent_on_the_first_visit() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut node: Node<usize, f64> = Node::new(0, 0);
        let l = limits(2, 0, 0);
        assert_eq!(should_expand(&mut node, 0, &l, &mut rng), ExpandDecision::Frontier);
        expand_node(NodeId::ROOT, &mut node, candidates(&[1.0; 3]), &mut rng).unwrap();

        // Later visits only see the speculative budget, which is empty
        assert_eq!(should_expand(&mut node, 0, &l, &mut rng), ExpandDecision::Skip);
        assert_eq!(node.expansion().speculative(), 0);
    }

    #[test]
    fn test_min_depth_gates_speculation() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut node: Node<usize, f64> = Node::new(0, 0);
        expand_node(NodeId::ROOT, &mut node, candidates(&[1.0; 3]), &mut rng).unwrap();

        // All misses so far: the heuristic always wants more, but depth 1 < 3
        assert_eq!(
            should_expand(&mut node, 1, &limits(0, 3, 10), &mut rng),
            ExpandDecision::Skip
        );
        assert_eq!(
            should_expand(&mut node, 3, &limits(0, 3, 10), &mut rng),
            ExpandDecision::Speculative
        );
        assert_eq!(node.expansion().speculative(), 1);
    }

    #[test]
    fn test_heuristic_stops_when_everything_is_known() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut state = ExpansionState::default();
        assert!(state.test(&mut rng));

        state.record(10, 0);
        assert_eq!(state.miss_rate(), 0.0);
        for _ in 0..100 {
            assert!(!state.test(&mut rng));
        }
    }
}
