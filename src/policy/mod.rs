//! The four phases of a search episode
//!
//! - Selection: how edges are ranked and which one is followed
//! - Expansion: when a node asks the problem for actions, and how they become edges
//! - Simulation: how a position is played out when the problem has no rollout of its own
//! - Backpropagation: how a rollout is folded into the forward path

pub mod backpropagation;
pub mod expansion;
pub mod selection;
pub mod simulation;

pub use expansion::{ExpandDecision, ExpansionLimits, ExpansionState};
pub use selection::PriorityPolicy;
pub use simulation::{RandomPolicy, SimulationPolicy, WeightedPolicy};
