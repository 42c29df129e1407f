//! Simulation policies for the search
//!
//! A simulation policy plays a position out when the problem does not
//! provide its own [`Problem::rollout`]. It drives the problem through its
//! regular `expand`/`select` interface with [`ExpandHint::Rollout`], so a
//! problem only has to implement move generation once.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;

use crate::problem::{ExpandHint, FrontierAction, Problem, Rollout};

/// Trait for policies that simulate playouts
pub trait SimulationPolicy<P: Problem>: Send + Sync {
    /// Plays out from the problem's current position and returns the sample
    ///
    /// Stops after `max_depth` moves when a limit is given, scoring the
    /// position reached.
    fn simulate(
        &self,
        problem: &mut P,
        rng: &mut StdRng,
        max_depth: Option<usize>,
    ) -> Rollout<P::Counter>;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SimulationPolicy<P>>;
}

/// Plays moves until the problem returns no actions, rejects a move or the
/// depth limit is hit, choosing each move with `pick`
fn playout<P, F>(
    problem: &mut P,
    rng: &mut StdRng,
    max_depth: Option<usize>,
    mut pick: F,
) -> Rollout<P::Counter>
where
    P: Problem,
    F: FnMut(&[FrontierAction<P::Action>], &mut StdRng) -> usize,
{
    let mut depth = 0;
    loop {
        if max_depth.is_some_and(|max| depth >= max) {
            break;
        }
        let actions = problem.expand(ExpandHint::Rollout);
        let index = match actions.len() {
            0 => break,
            1 => 0,
            _ => pick(&actions, rng),
        };
        if !problem.select(&actions[index].action) {
            break;
        }
        depth += 1;
    }
    Rollout::single(problem.score().counter)
}

/// Random simulation policy
///
/// Plays uniformly random moves.
#[derive(Debug, Clone)]
pub struct RandomPolicy;

impl RandomPolicy {
    /// Creates a new random policy
    pub fn new() -> Self {
        RandomPolicy
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Problem + 'static> SimulationPolicy<P> for RandomPolicy {
    fn simulate(
        &self,
        problem: &mut P,
        rng: &mut StdRng,
        max_depth: Option<usize>,
    ) -> Rollout<P::Counter> {
        playout(problem, rng, max_depth, |actions, rng| {
            rng.gen_range(0..actions.len())
        })
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy<P>> {
        Box::new(self.clone())
    }
}

/// Weighted simulation policy
///
/// Plays moves with probability proportional to the weights the problem
/// attached to them. Falls back to a uniform choice when the weights cannot
/// form a distribution (all zero, negative or non-finite).
#[derive(Debug, Clone)]
pub struct WeightedPolicy;

impl WeightedPolicy {
    /// Creates a new weighted policy
    pub fn new() -> Self {
        WeightedPolicy
    }
}

impl Default for WeightedPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Problem + 'static> SimulationPolicy<P> for WeightedPolicy {
    fn simulate(
        &self,
        problem: &mut P,
        rng: &mut StdRng,
        max_depth: Option<usize>,
    ) -> Rollout<P::Counter> {
        playout(problem, rng, max_depth, |actions, rng| {
            match WeightedIndex::new(actions.iter().map(|a| a.weight)) {
                Ok(distribution) => distribution.sample(rng),
                Err(_) => rng.gen_range(0..actions.len()),
            }
        })
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy<P>> {
        Box::new(self.clone())
    }
}

// Implement SimulationPolicy for Box<dyn SimulationPolicy>
impl<P: Problem> SimulationPolicy<P> for Box<dyn SimulationPolicy<P>> {
    fn simulate(
        &self,
        problem: &mut P,
        rng: &mut StdRng,
        max_depth: Option<usize>,
    ) -> Rollout<P::Counter> {
        (**self).simulate(problem, rng, max_depth)
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy<P>> {
        (**self).clone_box()
    }
}
