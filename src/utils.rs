//! Bandit formulas used to rank edges
//!
//! All functions here return the policy value (higher is better). Edge
//! priorities are their negation, see
//! [`PriorityPolicy`](crate::policy::selection::PriorityPolicy).

/// Calculates the exploitation term: the mean score of an edge
pub fn exploitation_term(score: f64, num_rollouts: f64) -> f64 {
    if num_rollouts <= 0.0 {
        return 0.0;
    }
    score / num_rollouts
}

/// Calculates the UCT exploration term
pub fn exploration_term(parent_rollouts: f64, num_rollouts: f64, exploration_constant: f64) -> f64 {
    if num_rollouts <= 0.0 {
        return f64::INFINITY;
    }
    if parent_rollouts <= 1.0 {
        return 0.0;
    }

    exploration_constant * (parent_rollouts.ln() / num_rollouts).sqrt()
}

/// Calculates the UCT value of an edge
///
/// ```text
/// UCT = score / n + C * sqrt(ln(N) / n)
/// ```
///
/// Unvisited edges are worth `+inf`.
pub fn uct_value(
    score: f64,
    num_rollouts: f64,
    parent_rollouts: f64,
    exploration_constant: f64,
) -> f64 {
    if num_rollouts <= 0.0 {
        return f64::INFINITY;
    }

    exploitation_term(score, num_rollouts)
        + exploration_term(parent_rollouts, num_rollouts, exploration_constant)
}

/// Calculates the PUCB value of an edge
///
/// ```text
/// PUCB = (score + prior * explore) / n,    explore = C * sqrt(N)
/// ```
///
/// Unvisited edges are worth `+inf`.
pub fn pucb_value(score: f64, num_rollouts: f64, prior_weight: f64, explore: f64) -> f64 {
    if num_rollouts <= 0.0 {
        return f64::INFINITY;
    }
    (score + prior_weight * explore) / num_rollouts
}
