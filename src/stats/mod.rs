//! The stat pipeline: layered derivation and change diffing.
//!
//! Each entity carries a base layer (loaded once from the catalog), a
//! current layer (mutated directly by buffs and debuffs), and an
//! outgoing layer that is recomputed on every read by folding the
//! current values through the Transform chain — card scope before global
//! scope. Only outgoing values are externally visible.

mod mutate;
mod queries;
mod snapshot;

pub use snapshot::StatSnapshot;

/// Direct change to a card's current stat layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatDelta {
    /// Change to current attack.
    pub attack: i64,
    /// Change to current maximum health.
    pub max_health: i64,
    /// Change to current geo cost.
    pub geo_cost: i64,
}

impl StatDelta {
    /// A pure attack change.
    #[must_use]
    pub fn attack(amount: i64) -> Self {
        Self {
            attack: amount,
            ..Self::default()
        }
    }

    /// A pure maximum-health change.
    #[must_use]
    pub fn max_health(amount: i64) -> Self {
        Self {
            max_health: amount,
            ..Self::default()
        }
    }

    /// A pure cost change.
    #[must_use]
    pub fn geo_cost(amount: i64) -> Self {
        Self {
            geo_cost: amount,
            ..Self::default()
        }
    }
}

/// Stat derivation and mutation entry points.
///
/// All functions are associated; the pipeline has no state of its own —
/// the layers live on the cards, the transforms live on the buses.
pub struct StatPipeline;
