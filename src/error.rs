//! Error types for the pursuit engine.

use thiserror::Error;

use crate::graph::Location;
use crate::state::{Role, TicketKind};

/// Main error type for the engine.
///
/// Construction failures are fatal: a [`TransportGraph`](crate::TransportGraph)
/// or [`GameState`](crate::GameState) is never partially built. The absence of
/// a move or a path is never an error; those are ordinary values.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("duplicate location record for {location}")]
    DuplicateLocation { location: Location },

    #[error("connection {from}-{to} references undeclared location {unknown}")]
    UnknownLocation {
        from: Location,
        to: Location,
        unknown: Location,
    },

    #[error("connection joins location {location} to itself")]
    SelfConnection { location: Location },

    #[error("graph description contains no locations")]
    EmptyGraph,

    #[error("game state must list the evader first")]
    EvaderNotFirst,

    #[error("more than one player entry for {role}")]
    DuplicatePlayer { role: Role },

    #[error("reveal schedule is empty")]
    EmptySchedule,

    #[error("turn index {turn} is out of range for {players} players")]
    TurnOutOfRange { turn: usize, players: usize },

    #[error("no player with role {role} in this state")]
    UnknownPlayer { role: Role },

    #[error("it is not {role}'s turn to move")]
    OutOfTurn { role: Role },

    #[error("{role} cannot pay for a {ticket} ticket")]
    InsufficientTickets { role: Role, ticket: TicketKind },

    #[error("move does not match any child of the current search root")]
    UnknownRootMove,
}

/// Convenience alias for results using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
