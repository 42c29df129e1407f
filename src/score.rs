//! Scoring model for search statistics
//!
//! A [`Counter`] is whatever a problem wants to accumulate along a line of
//! play (wins per player, total reward, a cost vector, ...). An [`Objective`]
//! turns an accumulated counter into the scalar the selection policy
//! maximizes. Keeping the two apart lets one rollout sample serve every edge
//! on the forward path, each edge reading it from its own perspective.

use std::fmt;

/// Maps an accumulated counter to the scalar being maximized
///
/// Objectives are plain function pointers so that they can be stored on every
/// edge without allocation. An edge captures its objective on first visit and
/// never changes it afterwards.
pub type Objective<C> = fn(&C) -> f64;

/// A value type aggregated by pointwise addition
pub trait Counter: Clone + Default + fmt::Debug {
    /// Adds `other` into `self`
    fn merge(&mut self, other: &Self);
}

impl Counter for f64 {
    fn merge(&mut self, other: &Self) {
        *self += *other;
    }
}

impl Counter for i64 {
    fn merge(&mut self, other: &Self) {
        *self += *other;
    }
}

impl Counter for u64 {
    fn merge(&mut self, other: &Self) {
        *self += *other;
    }
}

impl<const N: usize> Counter for [f64; N]
where
    [f64; N]: Default,
{
    fn merge(&mut self, other: &Self) {
        for (dst, src) in self.iter_mut().zip(other.iter()) {
            *dst += *src;
        }
    }
}

impl Counter for Vec<f64> {
    fn merge(&mut self, other: &Self) {
        if self.len() < other.len() {
            self.resize(other.len(), 0.0);
        }
        for (dst, src) in self.iter_mut().zip(other.iter()) {
            *dst += *src;
        }
    }
}

/// A counter sample together with the perspective it should be read from
#[derive(Clone)]
pub struct Score<C> {
    /// The sampled counter
    pub counter: C,

    /// Objective of the player (or optimizer) to move at the scored position
    pub objective: Objective<C>,
}

impl<C> Score<C> {
    /// Creates a new score
    pub fn new(counter: C, objective: Objective<C>) -> Self {
        Score { counter, objective }
    }

    /// Evaluates the objective on the counter
    pub fn value(&self) -> f64 {
        (self.objective)(&self.counter)
    }
}

impl<C: fmt::Debug> fmt::Debug for Score<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Score")
            .field("counter", &self.counter)
            .field("value", &self.value())
            .finish()
    }
}

/// Objective reading a scalar counter as-is
pub fn maximize(counter: &f64) -> f64 {
    *counter
}

/// Objective for scalar costs
pub fn minimize(counter: &f64) -> f64 {
    -*counter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn second(c: &[f64; 2]) -> f64 {
        c[1]
    }

    #[test]
    fn test_array_merge_is_pointwise() {
        let mut a = [1.0, 0.0];
        a.merge(&[0.5, 2.0]);
        assert_eq!(a, [1.5, 2.0]);
    }

    #[test]
    fn test_vec_merge_grows() {
        let mut v = vec![1.0];
        v.merge(&vec![1.0, 3.0]);
        assert_eq!(v, vec![2.0, 3.0]);
    }

    #[test]
    fn test_score_value_uses_objective() {
        let score = Score::new([0.25, 0.75], second);
        assert_eq!(score.value(), 0.75);

        let cost = Score::new(4.0, minimize);
        assert_eq!(cost.value(), -4.0);
    }
}
