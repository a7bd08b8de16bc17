//! Ticket- and centrality-weighted shortest paths.
//!
//! Estimates how hard it is for a pursuer with a given ticket budget to
//! reach a target. Stepping toward a high-centrality location is cheap,
//! because the evader statistically passes through hubs; running low on a
//! ticket kind makes every connection of that kind expensive. The result is
//! only ever used for its length by the evaluator, never for display.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::centrality::CentralityTable;
use crate::graph::{Location, TransportGraph};
use crate::state::{TicketInventory, TicketKind};

// Frontier entry; the ordering is reversed so the binary heap pops the
// cheapest entry first.
#[derive(Debug)]
struct Frontier {
    cost: f64,
    location: Location,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

/// Cheapest path from `source` to `target` under the given ticket budget.
///
/// Moving onto a neighbor `M` over a connection of kind `k` costs
/// `1 / (tickets(k) * centrality(M))`; a connection whose ticket the budget
/// lacks is not traversable at all. Returns the location sequence from
/// source to target inclusive.
///
/// When the target cannot be reached the path is just `[source]`; callers
/// treat that length-1 sentinel as "unreachable" rather than an error.
pub fn route_between(
    graph: &TransportGraph,
    centrality: &CentralityTable,
    source: Location,
    target: Location,
    tickets: &TicketInventory,
) -> Vec<Location> {
    let mut distances: HashMap<Location, f64> = HashMap::new();
    let mut previous: HashMap<Location, Location> = HashMap::new();
    let mut settled: HashSet<Location> = HashSet::new();
    let mut frontier = BinaryHeap::new();

    distances.insert(source, 0.0);
    frontier.push(Frontier {
        cost: 0.0,
        location: source,
    });

    while let Some(Frontier { cost, location }) = frontier.pop() {
        if !settled.insert(location) {
            continue;
        }
        if location == target {
            break;
        }
        for &(neighbor, kind) in graph.neighbors(location) {
            if settled.contains(&neighbor) {
                continue;
            }
            let count = tickets.count(TicketKind::for_connection(kind));
            if count == 0 {
                continue;
            }
            let rank = centrality.score(neighbor);
            if rank <= 0.0 {
                continue;
            }
            let tentative = cost + 1.0 / (count as f64 * rank);
            if tentative < distances.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                distances.insert(neighbor, tentative);
                previous.insert(neighbor, location);
                frontier.push(Frontier {
                    cost: tentative,
                    location: neighbor,
                });
            }
        }
    }

    if source != target && !previous.contains_key(&target) {
        return vec![source];
    }

    // Walk the predecessor chain back from the target.
    let mut path = vec![target];
    let mut current = target;
    while let Some(&step) = previous.get(&current) {
        path.push(step);
        current = step;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ConnectionKind, ConnectionRecord, NodeRecord};

    fn graph_of(connections: &[(u32, u32, ConnectionKind)]) -> TransportGraph {
        let locations: std::collections::BTreeSet<u32> = connections
            .iter()
            .flat_map(|&(a, b, _)| [a, b])
            .collect();
        TransportGraph::from_records(
            locations.iter().map(|&n| NodeRecord {
                location: Location(n),
                x: 0.0,
                y: 0.0,
            }),
            connections.iter().map(|&(from, to, kind)| ConnectionRecord {
                from: Location(from),
                to: Location(to),
                kind,
            }),
        )
        .unwrap()
    }

    #[test]
    fn adjacent_target_with_a_ticket_is_two_steps() {
        let graph = graph_of(&[(1, 2, ConnectionKind::RoadShort)]);
        let centrality = CentralityTable::compute(&graph);
        let tickets = TicketInventory::new().with(TicketKind::RoadShort, 1);
        let path = route_between(&graph, &centrality, Location(1), Location(2), &tickets);
        assert_eq!(path, vec![Location(1), Location(2)]);
    }

    #[test]
    fn no_matching_ticket_is_unreachable() {
        let graph = graph_of(&[(1, 2, ConnectionKind::RoadShort)]);
        let centrality = CentralityTable::compute(&graph);
        let tickets = TicketInventory::new().with(TicketKind::Underground, 5);
        let path = route_between(&graph, &centrality, Location(1), Location(2), &tickets);
        assert_eq!(path, vec![Location(1)]);
    }

    #[test]
    fn path_follows_the_only_chain() {
        let graph = graph_of(&[
            (1, 2, ConnectionKind::RoadShort),
            (2, 3, ConnectionKind::RoadShort),
            (3, 4, ConnectionKind::RoadShort),
        ]);
        let centrality = CentralityTable::compute(&graph);
        let tickets = TicketInventory::new().with(TicketKind::RoadShort, 10);
        let path = route_between(&graph, &centrality, Location(1), Location(4), &tickets);
        assert_eq!(
            path,
            vec![Location(1), Location(2), Location(3), Location(4)]
        );
    }

    #[test]
    fn partial_budget_blocks_the_far_side() {
        // 1 -road- 2 -underground- 3 with no underground ticket.
        let graph = graph_of(&[
            (1, 2, ConnectionKind::RoadShort),
            (2, 3, ConnectionKind::Underground),
        ]);
        let centrality = CentralityTable::compute(&graph);
        let tickets = TicketInventory::new().with(TicketKind::RoadShort, 3);
        let path = route_between(&graph, &centrality, Location(1), Location(3), &tickets);
        assert_eq!(path, vec![Location(1)]);
    }

    #[test]
    fn richer_ticket_stock_steers_the_route() {
        // Two parallel two-hop routes from 1 to 4; plenty of road tickets,
        // exactly one underground ticket makes the road side cheaper.
        let graph = graph_of(&[
            (1, 2, ConnectionKind::RoadShort),
            (2, 4, ConnectionKind::RoadShort),
            (1, 3, ConnectionKind::Underground),
            (3, 4, ConnectionKind::Underground),
        ]);
        let centrality = CentralityTable::compute(&graph);
        let tickets = TicketInventory::new()
            .with(TicketKind::RoadShort, 8)
            .with(TicketKind::Underground, 1);
        let path = route_between(&graph, &centrality, Location(1), Location(4), &tickets);
        assert_eq!(
            path,
            vec![Location(1), Location(2), Location(4)]
        );
    }
}
