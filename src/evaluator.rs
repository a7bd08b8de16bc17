//! Static evaluation of a game state from the evader's perspective.
//!
//! Higher is better for the evader: the pursuers are far away, in route
//! distance under their own ticket budgets, from a location that is itself
//! well connected. Decided positions saturate at the win constants so the
//! search always prefers a forced result over any heuristic score.

use crate::centrality::CentralityTable;
use crate::graph::TransportGraph;
use crate::moves::{winner, Winner};
use crate::route::route_between;
use crate::state::{GameState, TicketInventory, TicketKind};

/// Saturating value of a position the evader has already won.
pub const EVADER_WIN: f64 = 1.0e9;

/// Saturating value of a position the pursuers have already won.
pub const PURSUER_WIN: f64 = -1.0e9;

// Weight of the ticket-wealth ratio relative to the positional score.
const TICKET_INFLUENCE: f64 = 0.5;

/// Full evaluation: saturates on decided positions, positional otherwise.
pub fn evaluate(state: &GameState, graph: &TransportGraph, centrality: &CentralityTable) -> f64 {
    match winner(state, graph) {
        Some(Winner::Evader) => EVADER_WIN,
        Some(Winner::Pursuers) => PURSUER_WIN,
        None => positional_score(state, graph, centrality),
    }
}

/// Positional score of an undecided state:
/// `centrality(evader) * mean pursuer route distance / mean pursuer
/// centrality`, scaled by how the evader's ticket wealth compares to the
/// pursuers'.
///
/// A pursuer that cannot reach the evader at all contributes the board's
/// location count as its distance, an upper bound on any real path, so the
/// score stays finite.
pub fn positional_score(
    state: &GameState,
    graph: &TransportGraph,
    centrality: &CentralityTable,
) -> f64 {
    let evader = state.evader();
    let evader_rank = centrality.score(evader.location);

    let mut pursuer_count = 0u32;
    let mut distance_sum = 0.0;
    let mut rank_sum = 0.0;
    let mut pursuer_ticket_worth = 0.0;
    for pursuer in state.pursuers() {
        pursuer_count += 1;
        rank_sum += centrality.score(pursuer.location);
        let path = route_between(
            graph,
            centrality,
            pursuer.location,
            evader.location,
            &pursuer.tickets,
        );
        let distance = if path.len() > 1 {
            path.len()
        } else {
            graph.len()
        };
        distance_sum += distance as f64;
        pursuer_ticket_worth += inventory_worth(&pursuer.tickets);
    }
    if pursuer_count == 0 {
        return EVADER_WIN;
    }

    let mean_distance = distance_sum / f64::from(pursuer_count);
    let mean_rank = (rank_sum / f64::from(pursuer_count)).max(f64::MIN_POSITIVE);

    let mut score = evader_rank * mean_distance / mean_rank;
    if pursuer_ticket_worth > 0.0 {
        let ticket_ratio = inventory_worth(&evader.tickets) / pursuer_ticket_worth;
        score += (ticket_ratio - 1.0) * TICKET_INFLUENCE * score;
    }
    score
}

// Relative worth of one ticket; scarcer kinds are worth more.
fn ticket_worth(kind: TicketKind) -> f64 {
    match kind {
        TicketKind::RoadShort => 1.0,
        TicketKind::RoadLong => 2.0,
        TicketKind::Underground => 4.0,
        TicketKind::Hidden => 14.0,
        TicketKind::DoubleMove => 20.0,
    }
}

fn inventory_worth(tickets: &TicketInventory) -> f64 {
    TicketKind::ALL
        .iter()
        .map(|&kind| ticket_worth(kind) * f64::from(tickets.count(kind)))
        .sum()
}
