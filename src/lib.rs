//! # mcts-engine
//!
//! A generic Monte Carlo Tree Search engine.
//!
//! The engine searches any [`Problem`]: a stateful cursor that can be reset
//! to its start position, asked for candidate actions, moved by an action and
//! scored. Statistics are stored either in a [`Tree`], where every action
//! sequence owns its node, or in a [`Graph`], where positions that share a
//! fingerprint share one node.
//!
//! ## Features
//!
//! - Works with any problem and any additive statistic ([`Counter`])
//! - UCT and PUCB selection, over either topology
//! - Edge lists kept as binary min-heaps, so selection is O(1)
//! - Speculative re-expansion for problems with sampled move generators
//! - Reproducible searches from a configured seed
//!
//! ## Basic Usage
//!
//! ```
//! use mcts_engine::{ExpandHint, FrontierAction, MCTSConfig, Problem, Score, MCTS};
//! use mcts_engine::score::maximize;
//!
//! /// Choose a number from 0 to 4; bigger is better.
//! struct Pick {
//!     chosen: Option<u8>,
//! }
//!
//! impl Problem for Pick {
//!     type Action = u8;
//!     type Counter = f64;
//!
//!     fn root(&mut self) {
//!         self.chosen = None;
//!     }
//!
//!     fn expand(&mut self, _hint: ExpandHint) -> Vec<FrontierAction<u8>> {
//!         match self.chosen {
//!             Some(_) => Vec::new(),
//!             None => (0..5).map(FrontierAction::new).collect(),
//!         }
//!     }
//!
//!     fn select(&mut self, action: &u8) -> bool {
//!         self.chosen = Some(*action);
//!         true
//!     }
//!
//!     fn score(&self) -> Score<f64> {
//!         Score::new(self.chosen.unwrap_or(0) as f64 / 4.0, maximize)
//!     }
//! }
//!
//! fn main() -> Result<(), mcts_engine::MCTSError> {
//!     let config = MCTSConfig::default()
//!         .with_max_episodes(500)
//!         .with_exploration_constant(0.5)
//!         .with_seed(7);
//!
//!     let mut mcts = MCTS::tree(Pick { chosen: None }, config);
//!     let best = mcts.search()?;
//!
//!     println!("{}", mcts.get_statistics().summary());
//!     assert_eq!(best, 4);
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Every episode runs four phases:
//!
//! 1. **Selection**: from the root, follow the edge at the top of each
//!    node's priority heap. Unvisited edges always come first.
//!
//! 2. **Expansion**: a node reached for the first time asks the problem for
//!    its actions; one new edge is taken and the episode goes to rollout.
//!    Expanded nodes may be expanded again while they keep producing actions
//!    the search has not seen.
//!
//! 3. **Rollout**: the problem simulates from the reached position, or the
//!    engine plays it out with a [`SimulationPolicy`].
//!
//! 4. **Backpropagation**: the sample is merged into every edge on the path,
//!    and the edge lists below them are re-ranked.

pub mod config;
pub mod heap;
pub mod mcts;
pub mod policy;
pub mod problem;
pub mod score;
pub mod stats;
pub mod topology;
pub mod tree;
pub mod utils;

pub use config::{BestChildCriteria, MCTSConfig};
pub use mcts::{GraphSearch, TreeSearch, MCTS};
pub use policy::{PriorityPolicy, SimulationPolicy};
pub use problem::{Action, ExpandHint, FrontierAction, Problem, Rollout};
pub use score::{Counter, Objective, Score};
pub use stats::SearchStatistics;
pub use topology::{Graph, Topology, Tree};
pub use tree::{Edge, EdgeStat, ForwardPath, Node, NodeId, Variation};

/// Error types for the search engine
#[derive(thiserror::Error, Debug)]
pub enum MCTSError {
    /// No legal actions are available from the root
    #[error("No legal actions available from the root")]
    NoLegalActions,

    /// Search was stopped before completion
    #[error("Search stopped: {0}")]
    SearchStopped(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The problem returned an action with an unusable prior weight
    #[error("Invalid prior weight {weight} for action {action}")]
    InvalidPriorWeight {
        /// The offending action, formatted
        action: String,
        /// The weight it carried
        weight: f64,
    },

    /// The prior weights of an expansion sum to zero
    #[error("Prior weights of {actions} actions sum to zero")]
    ZeroTotalWeight {
        /// Number of actions in the expansion
        actions: usize,
    },

    /// A rollout reported zero samples
    #[error("Rollout produced no samples")]
    EmptyRollout,
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, MCTSError>;
