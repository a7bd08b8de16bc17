//! The transport graph: board locations joined by typed, undirected
//! connections.
//!
//! Built once from the raw records handed over by the loading collaborator
//! and immutable afterwards; every search shares it by reference.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A board location. It has no lifecycle of its own; it exists only as a
/// vertex of the [`TransportGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location(pub u32);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of transport link between two locations.
///
/// Each kind is backed 1:1 by the matching ticket, except that a
/// [`Hidden`](crate::TicketKind::Hidden) ticket may stand in for any of them
/// when the evader moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    RoadShort,
    RoadLong,
    Underground,
    Hidden,
}

/// A location record from the serialized board description. The coordinates
/// are carried for diagnostic collaborators; the engine itself never reads
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub location: Location,
    pub x: f64,
    pub y: f64,
}

/// A connection record from the serialized board description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub from: Location,
    pub to: Location,
    pub kind: ConnectionKind,
}

/// Undirected multigraph of locations and typed connections.
#[derive(Debug, Clone)]
pub struct TransportGraph {
    adjacency: HashMap<Location, Vec<(Location, ConnectionKind)>>,
    positions: HashMap<Location, (f64, f64)>,
}

impl TransportGraph {
    /// Builds the graph from raw location and connection records.
    ///
    /// Malformed input is fatal: a duplicate location, a connection touching
    /// an undeclared location, a self-connection, or an empty location set
    /// all fail construction, and nothing partial is ever returned.
    pub fn from_records(
        nodes: impl IntoIterator<Item = NodeRecord>,
        connections: impl IntoIterator<Item = ConnectionRecord>,
    ) -> Result<Self> {
        let mut adjacency: HashMap<Location, Vec<(Location, ConnectionKind)>> = HashMap::new();
        let mut positions = HashMap::new();

        for record in nodes {
            if positions.insert(record.location, (record.x, record.y)).is_some() {
                return Err(Error::DuplicateLocation {
                    location: record.location,
                });
            }
            adjacency.entry(record.location).or_default();
        }
        if positions.is_empty() {
            return Err(Error::EmptyGraph);
        }

        for record in connections {
            if record.from == record.to {
                return Err(Error::SelfConnection {
                    location: record.from,
                });
            }
            for endpoint in [record.from, record.to] {
                if !positions.contains_key(&endpoint) {
                    return Err(Error::UnknownLocation {
                        from: record.from,
                        to: record.to,
                        unknown: endpoint,
                    });
                }
            }
            adjacency
                .get_mut(&record.from)
                .ok_or(Error::UnknownLocation {
                    from: record.from,
                    to: record.to,
                    unknown: record.from,
                })?
                .push((record.to, record.kind));
            adjacency
                .get_mut(&record.to)
                .ok_or(Error::UnknownLocation {
                    from: record.from,
                    to: record.to,
                    unknown: record.to,
                })?
                .push((record.from, record.kind));
        }

        Ok(Self {
            adjacency,
            positions,
        })
    }

    /// Every connection leaving `location`, one entry per connection per
    /// traversal direction. Unknown locations have no neighbors.
    pub fn neighbors(&self, location: Location) -> &[(Location, ConnectionKind)] {
        self.adjacency
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The kinds of every connection joining `from` to `to` (parallel
    /// connections of different kinds each appear).
    pub fn kinds_between(
        &self,
        from: Location,
        to: Location,
    ) -> impl Iterator<Item = ConnectionKind> + '_ {
        self.neighbors(from)
            .iter()
            .filter(move |(other, _)| *other == to)
            .map(|&(_, kind)| kind)
    }

    pub fn contains(&self, location: Location) -> bool {
        self.positions.contains_key(&location)
    }

    /// Number of locations on the board.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.positions.keys().copied()
    }

    /// Board coordinates of a location, as given in its record.
    pub fn position(&self, location: Location) -> Option<(f64, f64)> {
        self.positions.get(&location).copied()
    }
}
