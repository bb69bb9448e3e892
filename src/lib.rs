//! # duelcore
//!
//! Authoritative rules engine for a two-player card duel server. The
//! engine owns all game state, resolves actions, derives the values
//! clients see, and serializes results for remote presentation.
//!
//! ## Architecture
//!
//! The core is the effect-resolution engine:
//!
//! - **Event bus** (`events`): three bus tiers (card, player, game) and
//!   three emission modes — Notify (deferred broadcast), Collect
//!   (ordered data request), Transform (sequential value fold).
//! - **Action stack** (`stack`): a FIFO deferred-execution queue that
//!   keeps cascading triggers in tabletop order, with a close gate that
//!   protects a running card script from its own triggers.
//! - **Stat pipeline** (`stats`): layered stat derivation — immutable
//!   base, directly mutated current, recomputed-on-read outgoing — with
//!   snapshot diffing in front of the presentation channel.
//! - **Decision gate** (`decision`): per-player suspend/resume so a
//!   synchronous resolution can pause for a human target or choice
//!   without corrupting ordering, and restore cleanly on cancel.
//!
//! Around the core: typed card definitions with explicit lifecycle hook
//! slots (`cards`), target computation (`targeting`), the game and
//! player aggregates (`state`), and the wire protocol (`protocol`).
//!
//! ## What stays outside
//!
//! Per-card scripts and catalog content, socket/session lifecycle, deck
//! construction and shuffling, and turn scheduling beyond the
//! turn-start/turn-end hook points are all external collaborators; the
//! engine exposes interfaces for each.

pub mod cards;
pub mod core;
pub mod decision;
pub mod events;
pub mod protocol;
pub mod stack;
pub mod state;
pub mod stats;
pub mod targeting;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{EngineError, EngineResult, EntityId, EntityRef, GameRng, PlayerId};

pub use crate::cards::{
    Archetype, Card, CardDefinition, CardKind, CardRegistry, Keyword, KeywordSet, LifecycleHooks,
    TextFragment,
};

pub use crate::events::{
    BusScope, EventBus, EventEnvelope, EventFilter, EventKind, EventName, EventValue, Listener,
    ListenerId, TransformFn,
};

pub use crate::stack::{ActionStack, StackEntry};

pub use crate::stats::{StatDelta, StatPipeline, StatSnapshot};

pub use crate::targeting::{TargetRef, TargetRule, TargetSet, Targeting};

pub use crate::decision::{DecisionGate, GateState};

pub use crate::state::{Game, Player};

pub use crate::protocol::{Animation, AnimationTag, CardView, ClientCommand, OutboundFrame};

pub use crate::zones::{Zone, BOARD_SLOTS, HAND_LIMIT};
