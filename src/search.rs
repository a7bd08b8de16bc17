//! The game tree: iterative-deepening minimax with alpha-beta pruning.
//!
//! The tree is a strict parent/child arena. Every node owns its own cloned
//! [`GameState`], so pruning one branch can never corrupt a sibling's
//! state. The recursive walk is single-threaded; after each fully completed
//! depth the best score and principal variation are published through a
//! shared [`SearchProgress`] handle that another thread may poll, and
//! cancellation is honored at node-expansion boundaries so an abandoned
//! pass leaves the previous depth's answer intact.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indextree::{Arena, NodeId};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::centrality::CentralityTable;
use crate::error::{Error, Result};
use crate::evaluator::{positional_score, EVADER_WIN, PURSUER_WIN};
use crate::graph::TransportGraph;
use crate::moves::{legal_moves, winner, Winner};
use crate::state::{GameState, Move, Role};

/// Limits for one search run.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Deepest ply the iterative-deepening loop will reach.
    pub max_depth: u32,
    /// Optional wall-clock budget, checked between node expansions.
    pub time_budget: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            time_budget: None,
        }
    }
}

/// The outcome of one fully completed deepening pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthResult {
    pub depth: u32,
    /// Score of the principal variation, from the evader's perspective.
    pub score: f64,
    /// The principal variation itself, root move first.
    pub line: Vec<Move>,
}

/// Shared observer handle over a running search: the latest completed-depth
/// result and the cancellation flag. Clones all point at the same search.
#[derive(Debug, Clone, Default)]
pub struct SearchProgress {
    inner: Arc<ProgressInner>,
}

#[derive(Debug, Default)]
struct ProgressInner {
    latest: RwLock<Option<DepthResult>>,
    cancelled: AtomicBool,
}

impl SearchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published completed-depth result.
    pub fn latest(&self) -> Option<DepthResult> {
        self.inner.latest.read().clone()
    }

    /// Asks the search to stop. It notices at the next node-expansion
    /// boundary; whatever depth last completed stays valid.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }

    fn publish(&self, result: DepthResult) {
        *self.inner.latest.write() = Some(result);
    }
}

// One node of the tree. The state is owned and never shared with siblings;
// outcome and static score are decided once and memoized.
struct SearchNode {
    state: GameState,
    produced_by: Option<Move>,
    outcome: Option<Option<Winner>>,
    static_score: Option<f64>,
    expanded: bool,
    best_child: Option<NodeId>,
}

impl SearchNode {
    fn new(state: GameState, produced_by: Option<Move>) -> Self {
        Self {
            state,
            produced_by,
            outcome: None,
            static_score: None,
            expanded: false,
            best_child: None,
        }
    }
}

/// Iterative-deepening alpha-beta search rooted at a game state.
///
/// Children are generated lazily the first time a node is visited at
/// nonzero depth and reused across deepening passes; [`advance_root`]
/// keeps the relevant subtree when a move is actually played.
///
/// [`advance_root`]: GameTree::advance_root
pub struct GameTree {
    graph: Arc<TransportGraph>,
    centrality: Arc<CentralityTable>,
    arena: Arena<SearchNode>,
    root: NodeId,
    progress: SearchProgress,
}

impl GameTree {
    /// Builds a tree rooted at `root_state`. The graph and centrality table
    /// are read-only and may back any number of trees at once.
    pub fn new(
        graph: Arc<TransportGraph>,
        centrality: Arc<CentralityTable>,
        root_state: GameState,
    ) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(SearchNode::new(root_state, None));
        Self {
            graph,
            centrality,
            arena,
            root,
            progress: SearchProgress::new(),
        }
    }

    /// A handle for observing this tree's progress from another thread.
    pub fn progress(&self) -> SearchProgress {
        self.progress.clone()
    }

    pub fn root_state(&self) -> &GameState {
        &self.arena[self.root].get().state
    }

    /// Runs deepening passes at depth 1, 2, … up to the configured maximum,
    /// publishing each completed pass through the progress handle. Returns
    /// the deepest completed result, or `None` when cancelled before the
    /// first pass finished.
    pub fn run(&mut self, config: &SearchConfig) -> Option<DepthResult> {
        let deadline = config.time_budget.map(|budget| Instant::now() + budget);
        let mut completed = None;
        for depth in 1..=config.max_depth {
            let Some(score) =
                self.alpha_beta(self.root, depth, f64::NEG_INFINITY, f64::INFINITY, deadline)
            else {
                debug!(depth, "search pass abandoned");
                break;
            };
            let result = DepthResult {
                depth,
                score,
                line: self.principal_variation(),
            };
            debug!(depth, score, "completed deepening pass");
            self.progress.publish(result.clone());
            completed = Some(result);
        }
        completed
    }

    /// The best move from the root and its score, searched to `max_depth`.
    /// `None` when the root position offers no move at all.
    pub fn best_move(&mut self, max_depth: u32) -> Option<(Move, f64)> {
        let result = self.run(&SearchConfig {
            max_depth,
            time_budget: None,
        })?;
        let chosen = *result.line.first()?;
        Some((chosen, result.score))
    }

    /// The principal variation searched to `max_depth`, root move first.
    pub fn best_line(&mut self, max_depth: u32) -> Vec<Move> {
        self.run(&SearchConfig {
            max_depth,
            time_budget: None,
        })
        .map(|result| result.line)
        .unwrap_or_default()
    }

    /// Re-roots the tree at the child reached by `played`, keeping that
    /// subtree's work and dropping the rest.
    ///
    /// Errors when `played` matches no child of the current root (it was
    /// never expanded, or the move came from elsewhere); the caller should
    /// then rebuild the tree from the authoritative state.
    pub fn advance_root(&mut self, played: &Move) -> Result<()> {
        let next_root = self
            .root
            .children(&self.arena)
            .find(|&child| self.arena[child].get().produced_by.as_ref() == Some(played))
            .ok_or(Error::UnknownRootMove)?;
        let siblings: Vec<NodeId> = self
            .root
            .children(&self.arena)
            .filter(|&child| child != next_root)
            .collect();
        for sibling in siblings {
            sibling.remove_subtree(&mut self.arena);
        }
        next_root.detach(&mut self.arena);
        self.root = next_root;
        Ok(())
    }

    // The alpha-beta walk. Returns None when cancelled or out of time,
    // abandoning the current pass without touching published results.
    fn alpha_beta(
        &mut self,
        node: NodeId,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        deadline: Option<Instant>,
    ) -> Option<f64> {
        if self.progress.is_cancelled()
            || deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            return None;
        }
        // Terminal and depth-exhausted nodes are evaluated without ever
        // generating children.
        if depth == 0 || self.outcome(node).is_some() {
            return Some(self.static_score(node));
        }
        if !self.arena[node].get().expanded {
            self.expand(node);
        }
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        if children.is_empty() {
            // The side to move cannot respond at all. Not an error: the
            // branch is scored as the position stands.
            return Some(self.static_score(node));
        }

        let maximizing = self.arena[node].get().state.current_role() == Role::Evader;
        if maximizing {
            let mut best = f64::NEG_INFINITY;
            for child in children {
                let value = self.alpha_beta(child, depth - 1, alpha, beta, deadline)?;
                if value > best {
                    best = value;
                    self.arena[node].get_mut().best_child = Some(child);
                }
                // The minimizer one ply up already has beta on offer; once
                // this node beats it, no sibling changes that choice.
                if best >= beta {
                    break;
                }
                alpha = alpha.max(best);
            }
            Some(best)
        } else {
            let mut best = f64::INFINITY;
            for child in children {
                let value = self.alpha_beta(child, depth - 1, alpha, beta, deadline)?;
                if value < best {
                    best = value;
                    self.arena[node].get_mut().best_child = Some(child);
                }
                if best <= alpha {
                    break;
                }
                beta = beta.min(best);
            }
            Some(best)
        }
    }

    // Generates this node's children from the legal moves of the side to
    // move, each child owning an independently cloned successor state.
    fn expand(&mut self, node: NodeId) {
        let (state, actor) = {
            let entry = self.arena[node].get();
            (entry.state.clone(), entry.state.current_role())
        };
        for mv in legal_moves(&state, actor, &self.graph) {
            match state.apply(&mv) {
                Ok(next) => {
                    let child = self.arena.new_node(SearchNode::new(next, Some(mv)));
                    node.append(child, &mut self.arena);
                }
                Err(error) => {
                    // legal_moves guarantees affordability; reaching this
                    // arm is a generator bug.
                    warn!(%error, %mv, "generated move failed to apply");
                }
            }
        }
        self.arena[node].get_mut().expanded = true;
    }

    fn outcome(&mut self, node: NodeId) -> Option<Winner> {
        if let Some(decided) = self.arena[node].get().outcome {
            return decided;
        }
        let decided = winner(&self.arena[node].get().state, &self.graph);
        self.arena[node].get_mut().outcome = Some(decided);
        decided
    }

    fn static_score(&mut self, node: NodeId) -> f64 {
        if let Some(score) = self.arena[node].get().static_score {
            return score;
        }
        let score = match self.outcome(node) {
            Some(Winner::Evader) => EVADER_WIN,
            Some(Winner::Pursuers) => PURSUER_WIN,
            None => positional_score(&self.arena[node].get().state, &self.graph, &self.centrality),
        };
        self.arena[node].get_mut().static_score = Some(score);
        score
    }

    // Follows best-child links down from the root.
    fn principal_variation(&self) -> Vec<Move> {
        let mut line = Vec::new();
        let mut current = self.root;
        while let Some(next) = self.arena[current].get().best_child {
            if let Some(mv) = self.arena[next].get().produced_by {
                line.push(mv);
            }
            current = next;
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;
    use crate::graph::{ConnectionKind, ConnectionRecord, Location, NodeRecord};
    use crate::state::{PlayerState, TicketInventory, TicketKind, TicketMove};

    fn graph_of(connections: &[(u32, u32)]) -> Arc<TransportGraph> {
        let locations: std::collections::BTreeSet<u32> = connections
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .collect();
        Arc::new(
            TransportGraph::from_records(
                locations.iter().map(|&n| NodeRecord {
                    location: Location(n),
                    x: 0.0,
                    y: 0.0,
                }),
                connections.iter().map(|&(from, to)| ConnectionRecord {
                    from: Location(from),
                    to: Location(to),
                    kind: ConnectionKind::RoadShort,
                }),
            )
            .unwrap(),
        )
    }

    fn road_player(role: Role, location: u32, tickets: u32) -> PlayerState {
        PlayerState {
            role,
            location: Location(location),
            tickets: TicketInventory::new().with(TicketKind::RoadShort, tickets),
        }
    }

    // Reference minimax without pruning, against which the alpha-beta
    // result must not diverge.
    fn plain_minimax(
        state: &GameState,
        graph: &TransportGraph,
        centrality: &CentralityTable,
        depth: u32,
    ) -> f64 {
        if depth == 0 || winner(state, graph).is_some() {
            return evaluate(state, graph, centrality);
        }
        let moves = legal_moves(state, state.current_role(), graph);
        if moves.is_empty() {
            return evaluate(state, graph, centrality);
        }
        let values = moves
            .iter()
            .map(|mv| plain_minimax(&state.apply(mv).unwrap(), graph, centrality, depth - 1));
        if state.current_role() == Role::Evader {
            values.fold(f64::NEG_INFINITY, f64::max)
        } else {
            values.fold(f64::INFINITY, f64::min)
        }
    }

    #[test]
    fn forced_move_is_found_at_depth_one() {
        // Path 1-2-3: the evader at 1 has exactly one step, to 2.
        let graph = graph_of(&[(1, 2), (2, 3)]);
        let centrality = Arc::new(CentralityTable::compute(&graph));
        let state = GameState::new(
            vec![
                road_player(Role::Evader, 1, 1),
                road_player(Role::Pursuer(0), 3, 5),
            ],
            vec![true; 10],
        )
        .unwrap();

        let mut tree = GameTree::new(graph, centrality, state);
        let (chosen, _) = tree.best_move(1).unwrap();
        assert_eq!(
            chosen,
            Move::Single(
                Role::Evader,
                TicketMove {
                    ticket: TicketKind::RoadShort,
                    target: Location(2),
                }
            )
        );
    }

    #[test]
    fn pruning_never_changes_the_root_value() {
        // A cycle with enough tickets for real branching at depth 3.
        let graph = graph_of(&[(1, 2), (2, 3), (3, 4), (4, 1), (2, 5), (5, 3)]);
        let centrality = Arc::new(CentralityTable::compute(&graph));
        let state = GameState::new(
            vec![
                road_player(Role::Evader, 3, 4),
                road_player(Role::Pursuer(0), 1, 4),
            ],
            vec![true; 10],
        )
        .unwrap();

        let reference = plain_minimax(&state, &graph, &centrality, 3);
        let mut tree = GameTree::new(Arc::clone(&graph), centrality, state);
        let (_, score) = tree.best_move(3).unwrap();
        assert!(
            (score - reference).abs() < 1e-9,
            "alpha-beta {score} diverged from plain minimax {reference}"
        );
    }

    #[test]
    fn each_completed_depth_is_published() {
        let graph = graph_of(&[(1, 2), (2, 3), (3, 4), (4, 1)]);
        let centrality = Arc::new(CentralityTable::compute(&graph));
        let state = GameState::new(
            vec![
                road_player(Role::Evader, 3, 5),
                road_player(Role::Pursuer(0), 1, 5),
            ],
            vec![true; 10],
        )
        .unwrap();

        let mut tree = GameTree::new(graph, centrality, state);
        let progress = tree.progress();
        assert!(progress.latest().is_none());

        let result = tree
            .run(&SearchConfig {
                max_depth: 2,
                time_budget: None,
            })
            .unwrap();
        assert_eq!(result.depth, 2);
        assert_eq!(progress.latest(), Some(result));
    }

    #[test]
    fn cancelled_search_returns_nothing_new() {
        let graph = graph_of(&[(1, 2), (2, 3), (3, 4), (4, 1)]);
        let centrality = Arc::new(CentralityTable::compute(&graph));
        let state = GameState::new(
            vec![
                road_player(Role::Evader, 3, 5),
                road_player(Role::Pursuer(0), 1, 5),
            ],
            vec![true; 10],
        )
        .unwrap();

        let mut tree = GameTree::new(graph, centrality, state);
        tree.progress().cancel();
        assert!(tree.run(&SearchConfig::default()).is_none());
        assert!(tree.progress().latest().is_none());
    }

    #[test]
    fn zero_time_budget_completes_no_depth() {
        let graph = graph_of(&[(1, 2), (2, 3), (3, 4), (4, 1)]);
        let centrality = Arc::new(CentralityTable::compute(&graph));
        let state = GameState::new(
            vec![
                road_player(Role::Evader, 3, 5),
                road_player(Role::Pursuer(0), 1, 5),
            ],
            vec![true; 10],
        )
        .unwrap();

        let mut tree = GameTree::new(graph, centrality, state);
        let result = tree.run(&SearchConfig {
            max_depth: 64,
            time_budget: Some(Duration::ZERO),
        });
        // The deadline fires at the very first expansion boundary.
        assert!(result.is_none());
    }

    #[test]
    fn advance_root_follows_the_played_move() {
        let graph = graph_of(&[(1, 2), (2, 3), (3, 4), (4, 1)]);
        let centrality = Arc::new(CentralityTable::compute(&graph));
        let state = GameState::new(
            vec![
                road_player(Role::Evader, 3, 5),
                road_player(Role::Pursuer(0), 1, 5),
            ],
            vec![true; 10],
        )
        .unwrap();

        let mut tree = GameTree::new(graph, centrality, state.clone());
        let (chosen, _) = tree.best_move(2).unwrap();
        tree.advance_root(&chosen).unwrap();
        assert_eq!(tree.root_state(), &state.apply(&chosen).unwrap());

        // A move that was never expanded from the new root is rejected.
        let stray = Move::Pass(Role::Pursuer(7));
        assert!(matches!(
            tree.advance_root(&stray),
            Err(Error::UnknownRootMove)
        ));
    }

    #[test]
    fn passing_pursuer_branch_still_gets_a_value() {
        // Pursuer 0 is ticketless and boxed in; its only reply anywhere in
        // the tree is a pass, and the search must value that branch rather
        // than failing. Pursuer 1 stays mobile so the game is not a
        // stalemate.
        let graph = graph_of(&[(1, 2), (2, 3), (3, 4)]);
        let centrality = Arc::new(CentralityTable::compute(&graph));
        let state = GameState::new(
            vec![
                road_player(Role::Evader, 1, 5),
                road_player(Role::Pursuer(0), 4, 0),
                road_player(Role::Pursuer(1), 3, 5),
            ],
            vec![true; 10],
        )
        .unwrap();

        let mut tree = GameTree::new(graph, centrality, state);
        let (_, score) = tree.best_move(3).unwrap();
        assert!(score.is_finite());
    }
}
