//! Main implementation of the search engine
//!
//! This module orchestrates the four phases of an episode: selection,
//! expansion, rollout and backpropagation, over either topology.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    config::{BestChildCriteria, MCTSConfig},
    policy::{
        backpropagation::backpropagate,
        expansion::{expand_node, should_expand, ExpandDecision, ExpansionLimits},
        selection::select_edge,
        simulation::{RandomPolicy, SimulationPolicy},
    },
    problem::{ExpandHint, Problem, Rollout},
    stats::SearchStatistics,
    topology::{Graph, Topology, Tree},
    tree::{Arena, ForwardPath, Node, NodeId, Variation},
    MCTSError, Result,
};

/// How selection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leaf {
    /// Reached a frontier or the depth limit: simulate
    Rollout,

    /// Reached a position with no actions: score it
    Terminal,

    /// The problem rejected the selected action: score where we stand
    Rejected,
}

/// Search over a [`Tree`] topology
pub type TreeSearch<P> = MCTS<P, Tree<<P as Problem>::Action, <P as Problem>::Counter>>;

/// Search over a [`Graph`] topology
pub type GraphSearch<P> = MCTS<P, Graph<<P as Problem>::Action, <P as Problem>::Counter>>;

/// The search engine
///
/// One instance owns one problem, one topology and one random source, and
/// runs one episode at a time. For parallel search run several independent
/// instances.
pub struct MCTS<P: Problem, T> {
    /// The problem being searched
    problem: P,

    /// Where the search statistics live
    topology: T,

    /// Configuration for the search
    config: MCTSConfig,

    /// Statistics gathered during the last search call
    statistics: SearchStatistics,

    /// Policy for playing out positions the problem cannot simulate itself
    simulation_policy: Box<dyn SimulationPolicy<P>>,

    /// Source of every random choice made by the engine
    rng: StdRng,

    /// Edges traversed by the current (or last) episode
    path: ForwardPath<P::Action>,
}

impl<P: Problem + 'static> TreeSearch<P> {
    /// Creates a search over a tree
    pub fn tree(problem: P, config: MCTSConfig) -> Self {
        Self::new(problem, Tree::new(), config)
    }
}

impl<P: Problem + 'static> GraphSearch<P> {
    /// Creates a search over a graph, using the default fingerprint for
    /// problems that do not hash their positions
    pub fn graph(problem: P, config: MCTSConfig) -> Self {
        Self::new(problem, Graph::new(), config)
    }
}

impl<P, T> MCTS<P, T>
where
    P: Problem + 'static,
    T: Topology<P::Action, P::Counter>,
{
    /// Creates a new search with the given problem, topology and configuration
    ///
    /// The topology is reset to a fresh root matching the problem's start
    /// position.
    pub fn new(mut problem: P, mut topology: T, config: MCTSConfig) -> Self {
        problem.root();
        topology.reset(problem.hash());

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        MCTS {
            problem,
            topology,
            config,
            statistics: SearchStatistics::new(),
            simulation_policy: Box::new(RandomPolicy::new()),
            rng,
            path: ForwardPath::new(),
        }
    }

    /// Sets the simulation policy used when the problem has no rollout
    pub fn with_simulation_policy<S: SimulationPolicy<P> + 'static>(mut self, policy: S) -> Self {
        self.simulation_policy = Box::new(policy);
        self
    }

    /// Runs `max_episodes` episodes (or until `max_time`) and returns the
    /// best root action
    ///
    /// Statistics carry over from earlier calls; use [`reset`](Self::reset)
    /// to start from scratch.
    pub fn search(&mut self) -> Result<P::Action> {
        self.run(self.config.max_episodes, self.config.max_time, None)
    }

    /// Runs the given number of episodes
    pub fn search_for_episodes(&mut self, episodes: usize) -> Result<P::Action> {
        self.run(episodes, self.config.max_time, None)
    }

    /// Runs episodes until the duration has elapsed
    pub fn search_for_time(&mut self, duration: Duration) -> Result<P::Action> {
        self.run(usize::MAX, Some(duration), None)
    }

    /// Runs episodes until `done` is set
    ///
    /// The flag is checked between episodes; an episode in flight always
    /// completes. The configured time limit still applies.
    pub fn search_until(&mut self, done: &AtomicBool) -> Result<P::Action> {
        self.run(usize::MAX, self.config.max_time, Some(done))
    }

    fn run(
        &mut self,
        episodes: usize,
        max_time: Option<Duration>,
        done: Option<&AtomicBool>,
    ) -> Result<P::Action> {
        self.config.validate()?;

        // Reset statistics
        self.statistics = SearchStatistics::new();
        let transpositions = self.topology.transpositions();

        log::debug!(
            "starting search: {} episodes, time limit {:?}, {} nodes",
            episodes,
            max_time,
            self.topology.arena().len()
        );

        let start_time = Instant::now();
        for _ in 0..episodes {
            if let Some(max_duration) = max_time {
                if start_time.elapsed() >= max_duration {
                    self.statistics.stopped_early = true;
                    log::debug!("search stopped early due to time limit");
                    break;
                }
            }
            if let Some(done) = done {
                if done.load(Ordering::Relaxed) {
                    self.statistics.stopped_early = true;
                    log::debug!("search stopped by done signal");
                    break;
                }
            }

            self.episode()?;
        }

        self.statistics.total_time = start_time.elapsed();
        self.statistics.transpositions = self.topology.transpositions() - transpositions;
        log::debug!("{}", self.statistics.summary());

        if !self.root().is_expanded() {
            return Err(MCTSError::SearchStopped(
                "no episode reached the root's actions".to_string(),
            ));
        }
        self.best_action()
    }

    /// Runs one select, expand, rollout, backpropagate cycle
    ///
    /// Fails on an invalid configuration before touching the topology. On
    /// any later error nothing is backpropagated.
    pub fn episode(&mut self) -> Result<()> {
        self.config.validate()?;
        let limits = ExpansionLimits::from(&self.config);
        self.path.clear();
        self.problem.root();

        let mut node = NodeId::ROOT;
        let mut leaf = Leaf::Rollout;

        loop {
            if self
                .config
                .max_depth
                .is_some_and(|max| self.path.len() >= max)
            {
                break;
            }

            let depth = self.path.len();
            let decision = should_expand(
                self.topology.arena_mut().get_mut(node),
                depth,
                &limits,
                &mut self.rng,
            );
            if decision.expands() {
                self.expand(node, decision, limits.burn_in)?;
            }

            let current = self.topology.arena().get(node);
            let Some(index) = select_edge(current).filter(|_| !current.terminal) else {
                leaf = Leaf::Terminal;
                self.statistics.terminal_visits += 1;
                break;
            };
            let action = current.edges[index].action.clone();

            if current.edges[index].objective.is_none() {
                let objective = self.problem.score().objective;
                self.topology.arena_mut().get_mut(node).edges[index].objective = Some(objective);
            }

            if !self.problem.select(&action) {
                log::debug!("action {} rejected at node {}", action, node);
                self.statistics.illegal_selections += 1;
                leaf = Leaf::Rejected;
                break;
            }

            self.path.push(node, index, action);
            self.statistics.max_depth = self.statistics.max_depth.max(self.path.len());
            let fingerprint = self.problem.hash();
            node = self.topology.child(node, index, fingerprint);

            // Expanding ends selection: descend into exactly one child, then roll out
            if decision.expands() {
                break;
            }
        }

        let rollout = match leaf {
            Leaf::Rollout => self.simulate()?,
            Leaf::Terminal | Leaf::Rejected => Rollout::single(self.problem.score().counter),
        };

        log::trace!("episode {} rollouts along {}", rollout.rollouts, self.path);
        backpropagate(
            self.topology.arena_mut(),
            &self.path,
            &rollout,
            self.config.policy,
            self.config.exploration_constant,
        );

        self.statistics.episodes += 1;
        self.statistics.node_count = self.topology.arena().len();
        self.statistics.edge_count = self.topology.arena().edge_count();
        Ok(())
    }

    /// Expansion phase at `node`
    ///
    /// A first expansion is followed by the burn-in expansions before any
    /// child is selected, unless it found the node terminal.
    fn expand(&mut self, node: NodeId, decision: ExpandDecision, burn_in: usize) -> Result<()> {
        let actions = self.problem.expand(ExpandHint::Expand);
        let expansion = expand_node(
            node,
            self.topology.arena_mut().get_mut(node),
            actions,
            &mut self.rng,
        )?;

        match decision {
            ExpandDecision::Frontier => self.statistics.expansions += 1,
            ExpandDecision::Speculative => {
                self.statistics.speculative_expansions += 1;
                if expansion.misses > 0 {
                    log::trace!("re-expansion of node {} found {} actions", node, expansion.misses);
                }
                return Ok(());
            }
            ExpandDecision::Skip => return Ok(()),
        }

        for _ in 0..burn_in {
            if self.topology.arena().get(node).terminal {
                break;
            }
            let actions = self.problem.expand(ExpandHint::Expand);
            let expansion = expand_node(
                node,
                self.topology.arena_mut().get_mut(node),
                actions,
                &mut self.rng,
            )?;
            self.statistics.burn_in_expansions += 1;
            if expansion.misses > 0 {
                log::trace!("burn-in at node {} found {} actions", node, expansion.misses);
            }
        }
        Ok(())
    }

    /// Rollout phase: the problem's own simulation, or the simulation policy
    fn simulate(&mut self) -> Result<Rollout<P::Counter>> {
        let rollout = match self.problem.rollout() {
            Some(rollout) => rollout,
            None => self.simulation_policy.simulate(
                &mut self.problem,
                &mut self.rng,
                self.config.max_rollout_depth,
            ),
        };
        if rollout.rollouts == 0 {
            return Err(MCTSError::EmptyRollout);
        }
        Ok(rollout)
    }

    /// Selects the best root action based on the configured criteria
    pub fn best_action(&self) -> Result<P::Action> {
        let edges = self.root().edges();
        let best = match self.config.best_child_criteria {
            BestChildCriteria::MostVisits => edges
                .iter()
                .max_by(|a, b| a.num_rollouts().total_cmp(&b.num_rollouts())),
            BestChildCriteria::HighestValue => edges
                .iter()
                .filter(|e| e.num_rollouts() > 0.0)
                .max_by(|a, b| a.mean().total_cmp(&b.mean()))
                .or_else(|| edges.first()),
        };
        best.map(|edge| edge.action().clone())
            .ok_or(MCTSError::NoLegalActions)
    }

    /// Statistics along a sequence of actions from the root
    ///
    /// Stops at the first action that has no edge.
    pub fn stat(&self, actions: &[P::Action]) -> Variation<P::Action> {
        let arena = self.topology.arena();
        let mut stats = Vec::new();
        let mut node = Some(NodeId::ROOT);
        for action in actions {
            let Some(edge) = node.and_then(|id| arena.get(id).edge(action)) else {
                break;
            };
            stats.push(edge.stat());
            node = edge.dst();
        }
        Variation(stats)
    }

    /// Actions of the root's edges, in heap order
    pub fn root_actions(&self) -> Vec<P::Action> {
        self.root().edges().iter().map(|e| e.action().clone()).collect()
    }

    /// Drops all statistics and starts over from a fresh root
    ///
    /// A seeded search is also reseeded, so it replays exactly like a newly
    /// created one.
    pub fn reset(&mut self) {
        log::debug!("resetting search with {} nodes", self.topology.arena().len());
        self.problem.root();
        self.topology.reset(self.problem.hash());
        self.path.clear();
        self.statistics = SearchStatistics::new();
        if let Some(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    /// The root node
    pub fn root(&self) -> &Node<P::Action, P::Counter> {
        self.topology.arena().root()
    }

    /// The node storage
    pub fn arena(&self) -> &Arena<P::Action, P::Counter> {
        self.topology.arena()
    }

    /// The topology
    pub fn topology(&self) -> &T {
        &self.topology
    }

    /// The edges traversed by the last episode
    pub fn forward_path(&self) -> &ForwardPath<P::Action> {
        &self.path
    }

    /// The problem
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// The configuration
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    /// Returns the search statistics
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }
}
