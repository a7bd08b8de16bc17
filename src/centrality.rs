//! PageRank-style centrality scores for board locations.
//!
//! The score approximates each location's topological importance so the
//! evaluator can cheaply tell "the evader is cornered" from "the evader is
//! in a hub". It is a pure function of the graph: computed once after
//! construction and shared read-only for the whole search session.

use std::collections::HashMap;

use crate::graph::{Location, TransportGraph};

/// Damping factor of the fixed-point iteration.
pub const DAMPING: f64 = 0.85;

/// Iteration count sufficient for convergence on boards of a few hundred
/// locations.
pub const DEFAULT_ITERATIONS: u32 = 100;

/// Immutable table of per-location centrality scores.
#[derive(Debug, Clone)]
pub struct CentralityTable {
    scores: HashMap<Location, f64>,
}

impl CentralityTable {
    /// Computes the table with [`DEFAULT_ITERATIONS`] passes.
    pub fn compute(graph: &TransportGraph) -> Self {
        Self::compute_with(graph, DEFAULT_ITERATIONS)
    }

    /// Computes the table with a fixed number of iterations.
    ///
    /// Every score starts at zero; each pass rebuilds the whole table from
    /// the previous one, giving location `L` the score
    /// `(1 - d) + d * sum over neighbors M of score(M) / degree(M)`.
    /// A location with no connections keeps exactly `1 - d`.
    pub fn compute_with(graph: &TransportGraph, iterations: u32) -> Self {
        let mut scores: HashMap<Location, f64> =
            graph.locations().map(|location| (location, 0.0)).collect();

        for _ in 0..iterations {
            let mut updated = HashMap::with_capacity(scores.len());
            for location in graph.locations() {
                let mut sum = 0.0;
                for &(neighbor, _) in graph.neighbors(location) {
                    // An undirected neighbor always has at least the
                    // connection back to us, so its degree is never zero.
                    let degree = graph.neighbors(neighbor).len() as f64;
                    sum += scores.get(&neighbor).copied().unwrap_or(0.0) / degree;
                }
                updated.insert(location, (1.0 - DAMPING) + DAMPING * sum);
            }
            scores = updated;
        }

        Self { scores }
    }

    /// Score for a location; unknown locations rank at zero.
    pub fn score(&self, location: Location) -> f64 {
        self.scores.get(&location).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Location, f64)> + '_ {
        self.scores.iter().map(|(&location, &score)| (location, score))
    }
}
