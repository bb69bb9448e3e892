//! Event identifiers.
//!
//! Every event the engine can emit is listed here, with its emission
//! semantics. The enum is closed on purpose: a new event means a new
//! variant, and the exhaustive `kind` match guarantees at compile time
//! that every event has exactly one set of semantics. Card scripts pick
//! from this vocabulary rather than inventing ad hoc names.

use serde::{Deserialize, Serialize};

/// How an event is delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Fire-and-forget broadcast. Handler invocations are deferred through
    /// the action stack unless the listener opts out with `skip_stack`.
    Notify,
    /// Synchronous data request; non-empty handler returns are gathered
    /// into an ordered sequence.
    Collect,
    /// Synchronous value pipeline; the envelope's value threads through
    /// handlers in order and the last non-empty return wins each step.
    Transform,
}

/// Identifier for every event the engine emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    // === Notify ===
    /// A card moved between zones.
    ZoneChanged,
    /// An allied character declared an attack.
    AllyToAttack,
    /// An allied character finished attacking.
    AllyAttacked,
    /// An allied character died.
    AllyDied,
    /// An allied card was played from hand.
    AllyCardPlayed,
    /// An allied card used its act ability.
    AllyCardActed,
    /// An allied spell resolved.
    SpellCast,
    /// A character should run its play effects now.
    PlayTriggered,
    /// A card should run its act effects now.
    ActTriggered,
    /// A character should run its death effects now.
    DieTriggered,
    /// A card should run its game-start effects now.
    GameStartTriggered,
    /// A card should run its turn-end effects now.
    TurnEndTriggered,

    // === Transform ===
    /// Override whether a card is playable.
    ModifyPlayable,
    /// Override whether a card can use its act ability.
    ModifyCanAct,
    /// Adjust a card's geo cost.
    ModifyGeoCost,
    /// Adjust a card's soul cost.
    ModifySoulCost,
    /// Adjust a character's maximum health.
    ModifyMaxHealth,
    /// Adjust a character's attack.
    ModifyAttack,
    /// Adjust a card's keyword set.
    ModifyKeywords,

    // === Collect ===
    /// Gather flat per-hit damage reductions before damage lands.
    DamageReduction,
}

impl EventName {
    /// The emission semantics for this event.
    ///
    /// Exhaustive by construction; adding a variant without classifying
    /// it is a compile error.
    #[must_use]
    pub const fn kind(self) -> EventKind {
        match self {
            EventName::ZoneChanged
            | EventName::AllyToAttack
            | EventName::AllyAttacked
            | EventName::AllyDied
            | EventName::AllyCardPlayed
            | EventName::AllyCardActed
            | EventName::SpellCast
            | EventName::PlayTriggered
            | EventName::ActTriggered
            | EventName::DieTriggered
            | EventName::GameStartTriggered
            | EventName::TurnEndTriggered => EventKind::Notify,

            EventName::ModifyPlayable
            | EventName::ModifyCanAct
            | EventName::ModifyGeoCost
            | EventName::ModifySoulCost
            | EventName::ModifyMaxHealth
            | EventName::ModifyAttack
            | EventName::ModifyKeywords => EventKind::Transform,

            EventName::DamageReduction => EventKind::Collect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(EventName::AllyDied.kind(), EventKind::Notify);
        assert_eq!(EventName::ModifyAttack.kind(), EventKind::Transform);
        assert_eq!(EventName::DamageReduction.kind(), EventKind::Collect);
    }
}
