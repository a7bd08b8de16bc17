//! Adversarial decision engine for a concealed-location pursuit game: one
//! evader with a hidden position against several pursuers cooperating on a
//! transport network.
//!
//! The engine consumes a transport graph and a game-state snapshot and
//! produces a move (or a whole principal variation). It renders nothing,
//! persists nothing, and speaks no protocol; those concerns belong to the
//! surrounding application.
//!
//! # Key Integration Points
//!
//! 1. **Build a [`TransportGraph`]** once from the raw board records.
//! 2. **Compute a [`CentralityTable`]** from it, also once; the PageRank-style
//!    scores feed both the evaluator and the router.
//! 3. **Assemble a [`GameState`]** snapshot (players evader-first, ticket
//!    inventories, round counter, reveal schedule) before each decision.
//! 4. **Search with a [`GameTree`]**: [`best_move`](GameTree::best_move) for a
//!    single decision, [`run`](GameTree::run) with a [`SearchConfig`] for
//!    iterative deepening under a time budget, observable mid-search through
//!    [`SearchProgress`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pursuit_engine::{
//!     CentralityTable, ConnectionKind, ConnectionRecord, GameState, GameTree, Location,
//!     NodeRecord, PlayerState, Role, TicketInventory, TicketKind, TransportGraph,
//! };
//!
//! // A tiny board: four locations in a cycle.
//! let nodes = (1..=4).map(|n| NodeRecord { location: Location(n), x: 0.0, y: 0.0 });
//! let connections = [(1, 2), (2, 3), (3, 4), (4, 1)].into_iter().map(|(from, to)| {
//!     ConnectionRecord {
//!         from: Location(from),
//!         to: Location(to),
//!         kind: ConnectionKind::RoadShort,
//!     }
//! });
//! let graph = Arc::new(TransportGraph::from_records(nodes, connections)?);
//! let centrality = Arc::new(CentralityTable::compute(&graph));
//!
//! let players = vec![
//!     PlayerState {
//!         role: Role::Evader,
//!         location: Location(3),
//!         tickets: TicketInventory::new().with(TicketKind::RoadShort, 4),
//!     },
//!     PlayerState {
//!         role: Role::Pursuer(0),
//!         location: Location(1),
//!         tickets: TicketInventory::new().with(TicketKind::RoadShort, 4),
//!     },
//! ];
//! let state = GameState::new(players, vec![true; 6])?;
//!
//! let mut tree = GameTree::new(graph, centrality, state);
//! let (chosen, score) = tree.best_move(4).expect("the evader has moves");
//! println!("{chosen} (score {score})");
//! # Ok::<(), pursuit_engine::Error>(())
//! ```

pub mod centrality;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod moves;
pub mod route;
pub mod search;
pub mod state;

pub use centrality::CentralityTable;
pub use error::{Error, Result};
pub use graph::{ConnectionKind, ConnectionRecord, Location, NodeRecord, TransportGraph};
pub use moves::{legal_moves, winner, Winner};
pub use route::route_between;
pub use search::{DepthResult, GameTree, SearchConfig, SearchProgress};
pub use state::{GameState, Move, PlayerState, Role, TicketInventory, TicketKind, TicketMove};
