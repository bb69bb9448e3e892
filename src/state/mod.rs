//! Game state aggregates: the `Game` itself and per-player state.
//!
//! `Game` methods are split by concern across sibling files: core
//! accessors and resources in `game.rs`, event emission and stack
//! pumping in `emit.rs`, gameplay flow in `flow.rs`. Decision-gate
//! orchestration lives with the gate in [`crate::decision`], and the
//! message dispatcher with the wire types in [`crate::protocol`].

mod emit;
mod flow;
mod game;
mod player;

pub use game::Game;
pub use player::Player;
