//! Game-state values: players, tickets, moves, and move application.
//!
//! A [`GameState`] is a value. Applying a move never mutates the receiver;
//! it clones the player list and mutates the copy, so two sibling nodes of
//! the search tree can never alias each other's player data.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{ConnectionKind, Location};

/// The tickets a player can hold and spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketKind {
    RoadShort,
    RoadLong,
    Underground,
    Hidden,
    DoubleMove,
}

impl TicketKind {
    /// All ticket kinds, in inventory order.
    pub const ALL: [TicketKind; 5] = [
        TicketKind::RoadShort,
        TicketKind::RoadLong,
        TicketKind::Underground,
        TicketKind::Hidden,
        TicketKind::DoubleMove,
    ];

    /// The ticket consumed by travelling over a connection of the given kind.
    pub fn for_connection(kind: ConnectionKind) -> TicketKind {
        match kind {
            ConnectionKind::RoadShort => TicketKind::RoadShort,
            ConnectionKind::RoadLong => TicketKind::RoadLong,
            ConnectionKind::Underground => TicketKind::Underground,
            ConnectionKind::Hidden => TicketKind::Hidden,
        }
    }

    fn index(self) -> usize {
        match self {
            TicketKind::RoadShort => 0,
            TicketKind::RoadLong => 1,
            TicketKind::Underground => 2,
            TicketKind::Hidden => 3,
            TicketKind::DoubleMove => 4,
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TicketKind::RoadShort => "road-short",
            TicketKind::RoadLong => "road-long",
            TicketKind::Underground => "underground",
            TicketKind::Hidden => "hidden",
            TicketKind::DoubleMove => "double-move",
        };
        write!(f, "{name}")
    }
}

/// Per-player ticket counts.
///
/// Counts never go below zero: spending a ticket that is not held is an
/// error, and the move generator never proposes such a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketInventory {
    counts: [u32; 5],
}

impl TicketInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: the inventory with `count` tickets of `kind`.
    pub fn with(mut self, kind: TicketKind, count: u32) -> Self {
        self.counts[kind.index()] = count;
        self
    }

    pub fn count(&self, kind: TicketKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn set(&mut self, kind: TicketKind, count: u32) {
        self.counts[kind.index()] = count;
    }

    /// True when the inventory covers every ticket in `kinds`, counting
    /// duplicates: two legs reusing a kind demand two tickets of it.
    pub fn covers<I: IntoIterator<Item = TicketKind>>(&self, kinds: I) -> bool {
        let mut need = [0u32; 5];
        for kind in kinds {
            need[kind.index()] += 1;
        }
        need.iter().zip(&self.counts).all(|(need, have)| need <= have)
    }

    // Spends one ticket; false when none is held.
    fn take(&mut self, kind: TicketKind) -> bool {
        match self.counts[kind.index()].checked_sub(1) {
            Some(rest) => {
                self.counts[kind.index()] = rest;
                true
            }
            None => false,
        }
    }
}

/// Who a player is: the single concealed evader, or one of the identified
/// pursuers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Evader,
    Pursuer(u8),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Evader => write!(f, "evader"),
            Role::Pursuer(id) => write!(f, "pursuer {id}"),
        }
    }
}

/// One participant: identity, position, and ticket stock.
///
/// For the evader this always carries the true location; what the pursuers
/// get to see is tracked separately by
/// [`GameState::public_evader_location`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub role: Role,
    pub location: Location,
    pub tickets: TicketInventory,
}

/// A single ticketed step: spend `ticket`, land on `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketMove {
    pub ticket: TicketKind,
    pub target: Location,
}

/// A move chosen by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// The actor stays put. Generated only for a pursuer with nowhere to go.
    Pass(Role),
    Single(Role, TicketMove),
    /// Two consecutive steps in one turn; spends one double-move ticket on
    /// top of both legs' tickets.
    Double(Role, TicketMove, TicketMove),
}

impl Move {
    pub fn actor(&self) -> Role {
        match self {
            Move::Pass(actor) | Move::Single(actor, _) | Move::Double(actor, _, _) => *actor,
        }
    }

    /// Where the actor ends up, if it moves at all.
    pub fn destination(&self) -> Option<Location> {
        match self {
            Move::Pass(_) => None,
            Move::Single(_, step) => Some(step.target),
            Move::Double(_, _, second) => Some(second.target),
        }
    }

    /// Every ticket this move spends, duplicates included.
    pub fn tickets_spent(&self) -> Vec<TicketKind> {
        match self {
            Move::Pass(_) => Vec::new(),
            Move::Single(_, step) => vec![step.ticket],
            Move::Double(_, first, second) => {
                vec![TicketKind::DoubleMove, first.ticket, second.ticket]
            }
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pass(actor) => write!(f, "{actor} passes"),
            Move::Single(actor, step) => {
                write!(f, "{actor} takes {} to {}", step.ticket, step.target)
            }
            Move::Double(actor, first, second) => write!(
                f,
                "{actor} doubles: {} to {}, {} to {}",
                first.ticket, first.target, second.ticket, second.target
            ),
        }
    }
}

/// Complete snapshot of a game in progress: all players (evader first), the
/// turn and round counters, and the fixed reveal schedule.
///
/// Entry `r` of the schedule says whether the evader's move made during
/// round `r` makes its location public. The round counter advances each
/// time the evader's turn completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameStateParts")]
pub struct GameState {
    players: Vec<PlayerState>,
    turn: usize,
    round: usize,
    reveal_schedule: Arc<Vec<bool>>,
    last_reveal: Option<Location>,
}

// Mirror of GameState used to re-validate deserialized snapshots.
#[derive(Deserialize)]
struct GameStateParts {
    players: Vec<PlayerState>,
    turn: usize,
    round: usize,
    reveal_schedule: Vec<bool>,
    last_reveal: Option<Location>,
}

impl TryFrom<GameStateParts> for GameState {
    type Error = Error;

    fn try_from(parts: GameStateParts) -> Result<GameState> {
        if parts.turn >= parts.players.len().max(1) {
            return Err(Error::TurnOutOfRange {
                turn: parts.turn,
                players: parts.players.len(),
            });
        }
        let mut state = GameState::new(parts.players, parts.reveal_schedule)?;
        state.turn = parts.turn;
        state.round = parts.round;
        state.last_reveal = parts.last_reveal;
        Ok(state)
    }
}

impl GameState {
    /// Creates a starting state: round zero, evader to move.
    ///
    /// The evader must be listed first, no role may repeat, and the reveal
    /// schedule must cover at least one round.
    pub fn new(players: Vec<PlayerState>, reveal_schedule: Vec<bool>) -> Result<Self> {
        match players.first() {
            Some(player) if player.role == Role::Evader => {}
            _ => return Err(Error::EvaderNotFirst),
        }
        for (index, player) in players.iter().enumerate() {
            if players[..index].iter().any(|other| other.role == player.role) {
                return Err(Error::DuplicatePlayer { role: player.role });
            }
        }
        if reveal_schedule.is_empty() {
            return Err(Error::EmptySchedule);
        }
        Ok(Self {
            players,
            turn: 0,
            round: 0,
            reveal_schedule: Arc::new(reveal_schedule),
            last_reveal: None,
        })
    }

    /// Builder for mid-game snapshots: sets the round counter.
    pub fn with_round(mut self, round: usize) -> Self {
        self.round = round;
        self
    }

    /// Builder for mid-game snapshots: sets whose turn it is.
    pub fn with_turn(mut self, role: Role) -> Result<Self> {
        self.turn = self
            .players
            .iter()
            .position(|player| player.role == role)
            .ok_or(Error::UnknownPlayer { role })?;
        Ok(self)
    }

    /// Builder for mid-game snapshots: sets the last publicly revealed
    /// evader location.
    pub fn with_last_reveal(mut self, location: Location) -> Self {
        self.last_reveal = Some(location);
        self
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// The evader; always the first player.
    pub fn evader(&self) -> &PlayerState {
        &self.players[0]
    }

    pub fn pursuers(&self) -> impl Iterator<Item = &PlayerState> {
        self.players
            .iter()
            .filter(|player| player.role != Role::Evader)
    }

    pub fn player(&self, role: Role) -> Option<&PlayerState> {
        self.players.iter().find(|player| player.role == role)
    }

    /// Whose turn it is to move.
    pub fn current_role(&self) -> Role {
        self.players[self.turn].role
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn reveal_schedule(&self) -> &[bool] {
        &self.reveal_schedule
    }

    /// The evader's location as the pursuers know it: the last reveal, if
    /// any round has revealed it yet.
    pub fn public_evader_location(&self) -> Option<Location> {
        self.last_reveal
    }

    /// Applies a move, producing the successor state.
    ///
    /// Checks turn order and ticket affordability; adjacency and occupancy
    /// are the move generator's contract and are not re-checked here.
    pub fn apply(&self, mv: &Move) -> Result<GameState> {
        let actor = mv.actor();
        if self.current_role() != actor {
            return Err(Error::OutOfTurn { role: actor });
        }
        let mut next = self.clone();
        {
            let player = next
                .players
                .iter_mut()
                .find(|player| player.role == actor)
                .ok_or(Error::UnknownPlayer { role: actor })?;
            for ticket in mv.tickets_spent() {
                if !player.tickets.take(ticket) {
                    return Err(Error::InsufficientTickets {
                        role: actor,
                        ticket,
                    });
                }
            }
            if let Some(destination) = mv.destination() {
                player.location = destination;
            }
        }
        if actor == Role::Evader {
            let revealed = next
                .reveal_schedule
                .get(next.round)
                .copied()
                .unwrap_or(false);
            next.round += 1;
            if revealed {
                if let Some(destination) = mv.destination() {
                    next.last_reveal = Some(destination);
                }
            }
        }
        next.turn = (next.turn + 1) % next.players.len();
        Ok(next)
    }
}
