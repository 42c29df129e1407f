//! Statistics collection for searches
//!
//! This module provides structures for collecting and reporting statistics
//! about a search run.

use std::time::Duration;

/// Statistics collected during one call to a search method
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Number of completed episodes
    pub episodes: usize,

    /// Total time spent searching
    pub total_time: Duration,

    /// Number of nodes in the topology when the search finished
    pub node_count: usize,

    /// Number of edges in the topology when the search finished
    pub edge_count: usize,

    /// Longest forward path seen
    pub max_depth: usize,

    /// Expansions of never-expanded nodes
    pub expansions: usize,

    /// Forced expansions during burn-in
    pub burn_in_expansions: usize,

    /// Heuristic re-expansions of already expanded nodes
    pub speculative_expansions: usize,

    /// Episodes cut short because the problem rejected a selected action
    pub illegal_selections: usize,

    /// Episodes that ended on a terminal position during selection
    pub terminal_visits: usize,

    /// Edges resolved to an already known node (graph topology)
    pub transpositions: usize,

    /// Whether the search was stopped by a time limit or a done signal
    pub stopped_early: bool,
}

impl SearchStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        SearchStatistics {
            node_count: 1, // Start with root node
            ..Default::default()
        }
    }

    /// Returns the average time per episode in microseconds
    pub fn avg_time_per_episode_us(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.episodes as f64
    }

    /// Returns the number of episodes per second
    pub fn episodes_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.episodes as f64 / self.total_time.as_secs_f64()
    }

    /// Returns a summary of the statistics as a string
    pub fn summary(&self) -> String {
        format!(
            "Search Statistics:\n\
             - Episodes: {}\n\
             - Total time: {:.3} seconds\n\
             - Nodes: {} ({} edges)\n\
             - Max depth: {}\n\
             - Expansions: {} (+{} burn-in, +{} speculative)\n\
             - Illegal selections: {}\n\
             - Terminal visits: {}\n\
             - Transpositions: {}\n\
             - Avg time per episode: {:.3} µs\n\
             - Episodes per second: {:.1}\n\
             - Stopped early: {}",
            self.episodes,
            self.total_time.as_secs_f64(),
            self.node_count,
            self.edge_count,
            self.max_depth,
            self.expansions,
            self.burn_in_expansions,
            self.speculative_expansions,
            self.illegal_selections,
            self.terminal_visits,
            self.transpositions,
            self.avg_time_per_episode_us(),
            self.episodes_per_second(),
            self.stopped_early
        )
    }
}
