//! Traits defining the problem interface for the search engine.
//!
//! The [`Problem`] trait is the only thing a game, optimizer or black-box
//! search has to implement. The engine drives it as a state machine: it is
//! reset to the root at the start of every episode, asked for candidate
//! actions, told which action to apply and asked to score the position it
//! ended up in.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::score::{Counter, Score};

/// Trait for actions understood by a problem
///
/// The engine never looks inside an action. It only compares, hashes and
/// displays it, so any `Clone + Eq + Hash + Debug + Display` type qualifies.
pub trait Action: Clone + Eq + Hash + Debug + Display {}

impl<T: Clone + Eq + Hash + Debug + Display> Action for T {}

/// Why the engine is asking for candidate actions
///
/// Problems may use the hint to skip work (for instance computing precise
/// prior weights) during rollouts, but the set of legal actions must not
/// depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandHint {
    /// Growing the search topology
    Expand,

    /// Playing out a default-policy rollout
    Rollout,
}

/// A candidate action returned by [`Problem::expand`]
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierAction<A> {
    /// The action
    pub action: A,

    /// Non-negative prior weight. Only relative values matter.
    pub weight: f64,
}

impl<A> FrontierAction<A> {
    /// Creates a candidate with the default weight of 1
    pub fn new(action: A) -> Self {
        FrontierAction {
            action,
            weight: 1.0,
        }
    }

    /// Sets the prior weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl<A> From<A> for FrontierAction<A> {
    fn from(action: A) -> Self {
        FrontierAction::new(action)
    }
}

/// The outcome of a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout<C> {
    /// Counter accumulated over all simulated playouts
    pub counter: C,

    /// Number of playouts folded into `counter`
    pub rollouts: u64,
}

impl<C> Rollout<C> {
    /// A single-playout sample
    pub fn single(counter: C) -> Self {
        Rollout {
            counter,
            rollouts: 1,
        }
    }

    /// A batch of `rollouts` playouts summed into one counter
    pub fn batch(counter: C, rollouts: u64) -> Self {
        Rollout { counter, rollouts }
    }
}

/// Trait defining the problem interface required by the search
///
/// # Example
///
/// ```
/// use mcts_engine::{ExpandHint, FrontierAction, Problem, Score};
/// use mcts_engine::score::maximize;
///
/// /// Pick three bits, scored by the binary number they spell.
/// struct Bits {
///     picked: Vec<u8>,
/// }
///
/// impl Problem for Bits {
///     type Action = u8;
///     type Counter = f64;
///
///     fn root(&mut self) {
///         self.picked.clear();
///     }
///
///     fn expand(&mut self, _hint: ExpandHint) -> Vec<FrontierAction<u8>> {
///         if self.picked.len() == 3 {
///             return Vec::new();
///         }
///         vec![FrontierAction::new(0), FrontierAction::new(1)]
///     }
///
///     fn select(&mut self, action: &u8) -> bool {
///         self.picked.push(*action);
///         true
///     }
///
///     fn score(&self) -> Score<f64> {
///         let value = self.picked.iter().fold(0u32, |acc, b| acc * 2 + *b as u32);
///         Score::new(value as f64 / 7.0, maximize)
///     }
/// }
/// ```
pub trait Problem {
    /// The type of actions in this problem
    type Action: Action;

    /// The statistic accumulated by the search
    type Counter: Counter;

    /// Resets the problem to the start position
    ///
    /// Called at the beginning of every episode.
    fn root(&mut self);

    /// Returns the candidate actions from the current position
    ///
    /// An empty list marks the position as terminal.
    fn expand(&mut self, hint: ExpandHint) -> Vec<FrontierAction<Self::Action>>;

    /// Applies an action to the current position
    ///
    /// Returns false when the action is not applicable here (a chance outcome
    /// ruled it out, a cycle or depth guard fired, ...). The engine then
    /// treats the current position as the end of the line for this episode.
    fn select(&mut self, action: &Self::Action) -> bool;

    /// Evaluates the current, possibly terminal, position
    ///
    /// The objective must be the one of whoever chooses the next action at
    /// this position; it is what edges leaving this position are ranked by.
    fn score(&self) -> Score<Self::Counter>;

    /// Runs a custom simulation from the current position
    ///
    /// Returning `None` (the default) makes the engine use its own
    /// simulation policy instead.
    fn rollout(&mut self) -> Option<Rollout<Self::Counter>> {
        None
    }

    /// Returns a fingerprint of the current position
    ///
    /// Only the graph topology uses this. Without it, the graph falls back to
    /// its fingerprint function, which can only detect transpositions between
    /// a parent and its immediate children.
    fn hash(&self) -> Option<u64> {
        None
    }
}
