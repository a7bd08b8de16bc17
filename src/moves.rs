//! Legal-move enumeration and winner detection.
//!
//! The whole branching factor of the search comes out of this module, and
//! the set must be exact: a missed legal move weakens play, a spurious
//! illegal one would corrupt a cloned child state.

use std::collections::HashSet;

use crate::graph::{Location, TransportGraph};
use crate::state::{
    GameState, Move, PlayerState, Role, TicketInventory, TicketKind, TicketMove,
};

/// The decided outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Evader,
    Pursuers,
}

/// All legal moves for `actor` in `state`, deduplicated by structural
/// equality.
///
/// Both sides are blocked from squares a pursuer stands on; nothing blocks
/// a pursuer from stepping onto the evader. The evader additionally gets a
/// hidden-substituted twin of every single step while it holds a hidden
/// ticket, and double moves while it holds a double-move ticket and can
/// pay for both legs (a kind reused across the legs costs two tickets). A
/// pursuer with no legal step gets exactly one [`Move::Pass`]; an evader
/// with none gets an empty set.
pub fn legal_moves(state: &GameState, actor: Role, graph: &TransportGraph) -> Vec<Move> {
    let Some(player) = state.player(actor) else {
        return Vec::new();
    };
    let mut moves: HashSet<Move> = HashSet::new();
    let singles = single_steps(state, graph, player.location, &player.tickets);
    moves.extend(singles.iter().map(|&step| Move::Single(actor, step)));

    if actor == Role::Evader {
        if player.tickets.count(TicketKind::Hidden) >= 1 {
            for &step in &singles {
                moves.insert(Move::Single(actor, hidden_twin(step)));
            }
        }
        if player.tickets.count(TicketKind::DoubleMove) >= 1 {
            moves.extend(double_steps(state, graph, player, &singles));
        }
    } else if moves.is_empty() {
        moves.insert(Move::Pass(actor));
    }

    moves.into_iter().collect()
}

/// Decides whether the game in `state` is over.
///
/// Checked in order: a pursuer standing on the evader's true location
/// (capture), the evader having no legal move at all (trapped), every
/// pursuer reduced to passing (stalemate, scored as an evader win), and
/// the reveal schedule fully played out with the turn back at the evader
/// (survival).
pub fn winner(state: &GameState, graph: &TransportGraph) -> Option<Winner> {
    let evader_at = state.evader().location;
    if state.pursuers().any(|pursuer| pursuer.location == evader_at) {
        return Some(Winner::Pursuers);
    }
    if legal_moves(state, Role::Evader, graph).is_empty() {
        return Some(Winner::Pursuers);
    }
    if pursuers_can_only_pass(state, graph) {
        return Some(Winner::Evader);
    }
    if state.round() >= state.reveal_schedule().len() && state.current_role() == Role::Evader {
        return Some(Winner::Evader);
    }
    None
}

fn pursuers_can_only_pass(state: &GameState, graph: &TransportGraph) -> bool {
    state.pursuers().all(|pursuer| {
        let moves = legal_moves(state, pursuer.role, graph);
        moves.len() == 1 && matches!(moves[0], Move::Pass(_))
    })
}

// Every affordable single step from `from`: one entry per connection whose
// ticket the inventory holds and whose far end no pursuer occupies.
fn single_steps(
    state: &GameState,
    graph: &TransportGraph,
    from: Location,
    tickets: &TicketInventory,
) -> Vec<TicketMove> {
    let mut steps = Vec::new();
    for &(target, kind) in graph.neighbors(from) {
        if pursuer_occupies(state, target) {
            continue;
        }
        let ticket = TicketKind::for_connection(kind);
        if tickets.count(ticket) == 0 {
            continue;
        }
        steps.push(TicketMove { ticket, target });
    }
    steps
}

fn hidden_twin(step: TicketMove) -> TicketMove {
    TicketMove {
        ticket: TicketKind::Hidden,
        target: step.target,
    }
}

// A leg as taken, plus its concealed twin when a hidden ticket is held.
fn leg_variants(step: TicketMove, hidden: u32) -> Vec<TicketMove> {
    if hidden >= 1 && step.ticket != TicketKind::Hidden {
        vec![step, hidden_twin(step)]
    } else {
        vec![step]
    }
}

// Double moves: every first step combined with every step onward from its
// target, with hidden substitution on either leg. Each candidate is priced
// exactly before being admitted: one double-move ticket plus both legs'
// tickets, counting a reused kind twice.
fn double_steps(
    state: &GameState,
    graph: &TransportGraph,
    player: &PlayerState,
    firsts: &[TicketMove],
) -> Vec<Move> {
    let hidden = player.tickets.count(TicketKind::Hidden);
    let mut moves = Vec::new();
    for &first in firsts {
        let seconds = single_steps(state, graph, first.target, &player.tickets);
        for &second in &seconds {
            for first_leg in leg_variants(first, hidden) {
                for second_leg in leg_variants(second, hidden) {
                    let mv = Move::Double(player.role, first_leg, second_leg);
                    if player.tickets.covers(mv.tickets_spent()) {
                        moves.push(mv);
                    }
                }
            }
        }
    }
    moves
}

fn pursuer_occupies(state: &GameState, location: Location) -> bool {
    state.pursuers().any(|pursuer| pursuer.location == location)
}
