//! Configuration options for the search engine
//!
//! This module defines the parameters that control selection, expansion,
//! rollout and the search budget.

use std::time::Duration;

use crate::{policy::selection::PriorityPolicy, MCTSError, Result};

/// Criteria for selecting the best root action after search is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestChildCriteria {
    /// Select the root edge with the most rollouts
    ///
    /// This is the robust, conventional choice.
    MostVisits,

    /// Select the root edge with the highest mean score
    ///
    /// More aggressive; rarely visited edges with lucky samples can win.
    HighestValue,
}

/// Configuration for the search engine
///
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use mcts_engine::{MCTSConfig, PriorityPolicy};
/// use std::time::Duration;
///
/// let config = MCTSConfig::default()
///     .with_exploration_constant(1.0)
///     .with_policy(PriorityPolicy::Pucb)
///     .with_max_episodes(50_000)
///     .with_max_time(Duration::from_millis(200))
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MCTSConfig {
    /// Exploration constant `C` of UCT and PUCB
    ///
    /// Higher values favor exploration of less-visited edges.
    pub exploration_constant: f64,

    /// Policy used to compute edge priorities
    pub policy: PriorityPolicy,

    /// Maximum number of episodes per call to `search`
    pub max_episodes: usize,

    /// Maximum wall-clock time per call to `search`
    ///
    /// Checked between episodes only.
    pub max_time: Option<Duration>,

    /// Maximum selection depth
    ///
    /// Selection stops and rolls out once the forward path reaches this
    /// length. With the graph topology this also guards against cycles.
    pub max_depth: Option<usize>,

    /// Maximum number of moves played by the default simulation policy
    pub max_rollout_depth: Option<usize>,

    /// Number of forced expansion calls after a node's first expansion
    pub expand_burn_in: usize,

    /// Minimum node depth at which speculative re-expansion is attempted
    pub min_expand_depth: usize,

    /// Maximum number of speculative re-expansions per node
    ///
    /// Zero disables speculative re-expansion entirely.
    pub max_speculative_expansions: usize,

    /// Criteria for selecting the best action after search
    pub best_child_criteria: BestChildCriteria,

    /// Seed of the engine's random source
    ///
    /// With a seed, searches over a deterministic problem are reproducible.
    pub seed: Option<u64>,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        MCTSConfig {
            exploration_constant: 1.414, // sqrt(2)
            policy: PriorityPolicy::Uct,
            max_episodes: 10_000,
            max_time: None,
            max_depth: None,
            max_rollout_depth: None,
            expand_burn_in: 0,
            min_expand_depth: 0,
            max_speculative_expansions: 8,
            best_child_criteria: BestChildCriteria::MostVisits,
            seed: None,
        }
    }
}

impl MCTSConfig {
    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets the priority policy
    pub fn with_policy(mut self, policy: PriorityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the maximum number of episodes
    pub fn with_max_episodes(mut self, episodes: usize) -> Self {
        self.max_episodes = episodes;
        self
    }

    /// Sets the maximum time to run the search
    pub fn with_max_time(mut self, duration: Duration) -> Self {
        self.max_time = Some(duration);
        self
    }

    /// Sets the maximum selection depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the maximum default-policy rollout length
    pub fn with_max_rollout_depth(mut self, depth: usize) -> Self {
        self.max_rollout_depth = Some(depth);
        self
    }

    /// Sets the number of burn-in expansions
    pub fn with_expand_burn_in(mut self, burn_in: usize) -> Self {
        self.expand_burn_in = burn_in;
        self
    }

    /// Sets the minimum depth for speculative re-expansion
    pub fn with_min_expand_depth(mut self, depth: usize) -> Self {
        self.min_expand_depth = depth;
        self
    }

    /// Sets the per-node cap on speculative re-expansions
    pub fn with_max_speculative_expansions(mut self, expansions: usize) -> Self {
        self.max_speculative_expansions = expansions;
        self
    }

    /// Sets the criteria for selecting the best child
    pub fn with_best_child_criteria(mut self, criteria: BestChildCriteria) -> Self {
        self.best_child_criteria = criteria;
        self
    }

    /// Seeds the random source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the configuration for values that would poison priorities or
    /// never terminate
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(MCTSError::InvalidConfiguration(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if self.max_episodes == 0 && self.max_time.is_none() {
            return Err(MCTSError::InvalidConfiguration(
                "max_episodes is zero and no time limit is set".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(MCTSError::InvalidConfiguration(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_rollout_depth == Some(0) {
            return Err(MCTSError::InvalidConfiguration(
                "max_rollout_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
