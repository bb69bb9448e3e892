//! Pure stat queries.
//!
//! Outgoing values are never stored: every query folds the current layer
//! through the matching Transform chain, card scope first, then global
//! scope. Legality gates are likewise recomputed fresh on every call —
//! caching them would let a stale answer leak through a bus change.

use crate::cards::KeywordSet;
use crate::core::EntityId;
use crate::events::{EventName, EventValue};
use crate::state::Game;
use crate::targeting::Targeting;
use crate::zones::Zone;

use super::snapshot::StatSnapshot;
use super::StatPipeline;

impl StatPipeline {
    /// Outgoing geo cost.
    #[must_use]
    pub fn outgoing_geo_cost(game: &Game, id: EntityId) -> i64 {
        let Some(card) = game.card(id) else { return 0 };
        let base = card.cur_geo_cost;
        game.transform_query(id, EventName::ModifyGeoCost, EventValue::Stat(base))
            .as_stat()
            .unwrap_or(base)
    }

    /// Outgoing soul cost, for cards that have one.
    #[must_use]
    pub fn outgoing_soul_cost(game: &Game, id: EntityId) -> Option<i64> {
        let card = game.card(id)?;
        let base = card.cur_soul_cost?;
        Some(
            game.transform_query(id, EventName::ModifySoulCost, EventValue::Stat(base))
                .as_stat()
                .unwrap_or(base),
        )
    }

    /// Outgoing attack. `None` for spells.
    #[must_use]
    pub fn outgoing_attack(game: &Game, id: EntityId) -> Option<i64> {
        let card = game.card(id)?;
        let base = card.combat.as_ref()?.cur_attack;
        Some(
            game.transform_query(id, EventName::ModifyAttack, EventValue::Stat(base))
                .as_stat()
                .unwrap_or(base),
        )
    }

    /// Outgoing maximum health. `None` for spells.
    #[must_use]
    pub fn outgoing_max_health(game: &Game, id: EntityId) -> Option<i64> {
        let card = game.card(id)?;
        let base = card.combat.as_ref()?.cur_max_health;
        Some(
            game.transform_query(id, EventName::ModifyMaxHealth, EventValue::Stat(base))
                .as_stat()
                .unwrap_or(base),
        )
    }

    /// Outgoing health: maximum health minus accumulated damage.
    #[must_use]
    pub fn outgoing_health(game: &Game, id: EntityId) -> Option<i64> {
        let max = Self::outgoing_max_health(game, id)?;
        let damage = game.card(id)?.combat.as_ref()?.damage;
        Some(max - damage)
    }

    /// Outgoing keyword set. The bitset representation deduplicates.
    #[must_use]
    pub fn outgoing_keywords(game: &Game, id: EntityId) -> KeywordSet {
        let Some(card) = game.card(id) else {
            return KeywordSet::new();
        };
        let base = card.cur_keywords;
        game.transform_query(
            id,
            EventName::ModifyKeywords,
            EventValue::from_keywords(base),
        )
        .as_keywords()
        .unwrap_or(base)
    }

    /// Recompute the full tracked snapshot for a card.
    #[must_use]
    pub fn snapshot(game: &Game, id: EntityId) -> Option<StatSnapshot> {
        game.card(id)?;
        Some(StatSnapshot {
            geo_cost: Self::outgoing_geo_cost(game, id),
            soul_cost: Self::outgoing_soul_cost(game, id),
            attack: Self::outgoing_attack(game, id),
            health: Self::outgoing_health(game, id),
            keywords: Self::outgoing_keywords(game, id),
        })
    }

    /// Whether a card can be played right now.
    ///
    /// Gate order matters: location, then affordability, then the
    /// Transform override (which may flip either way), then target
    /// availability last — which can only force the gate to false, never
    /// re-enable it. An action must not become available with zero legal
    /// targets, or the suspend protocol would stall.
    #[must_use]
    pub fn is_playable(game: &Game, id: EntityId) -> bool {
        let Some(card) = game.card(id) else { return false };
        if card.zone != Zone::Hand {
            return false;
        }

        let player = game.player(card.owner);
        let mut playable = player.geo >= Self::outgoing_geo_cost(game, id);
        if let Some(soul_cost) = Self::outgoing_soul_cost(game, id) {
            if player.soul < soul_cost {
                playable = false;
            }
        }

        playable = game
            .transform_query(id, EventName::ModifyPlayable, EventValue::Gate(playable))
            .as_gate()
            .unwrap_or(playable);

        if card.is_spell() {
            if let Some(rule) = card.def.target_rule {
                if Targeting::legal_targets(game, card.owner, rule).is_empty() {
                    playable = false;
                }
            }
        } else if !player.has_empty_slot() {
            playable = false;
        }

        playable
    }

    /// Whether a card can use its act ability right now.
    ///
    /// Same gate order as [`Self::is_playable`]; the target-availability
    /// fallback (a character to act on must exist somewhere) runs last.
    #[must_use]
    pub fn can_act(game: &Game, id: EntityId) -> bool {
        let Some(card) = game.card(id) else { return false };
        if card.zone != Zone::Hand {
            return false;
        }
        let Some(act) = card.def.act else { return false };
        if card.acted {
            return false;
        }

        let player = game.player(card.owner);
        let mut actable = player.geo >= act.cost;

        actable = game
            .transform_query(id, EventName::ModifyCanAct, EventValue::Gate(actable))
            .as_gate()
            .unwrap_or(actable);

        if game.player(card.owner).no_characters()
            && game.player(card.owner.opponent()).no_characters()
        {
            return false;
        }

        actable
    }
}
