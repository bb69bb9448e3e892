//! Stat mutations: modifiers, damage, healing, and death.
//!
//! Every mutation ends in [`StatPipeline::check_updates`], which diffs
//! the recomputed snapshot against the cache, schedules presentation
//! updates for real changes, and runs the death check.

use serde_json::json;
use tracing::debug;

use crate::cards::Keyword;
use crate::core::{EntityId, EntityRef};
use crate::events::{BusScope, EventEnvelope, EventName};
use crate::protocol::{AnimationTag, CardView};
use crate::state::Game;
use crate::zones::Zone;

use super::{StatDelta, StatPipeline};

impl StatPipeline {
    /// Apply a direct modifier to the current layer. Negative deltas are
    /// debuffs. Spells only track cost.
    pub fn apply_modifier(game: &mut Game, id: EntityId, delta: StatDelta) {
        let Some(card) = game.card_mut(id) else { return };

        card.cur_geo_cost += delta.geo_cost;
        if let Some(combat) = &mut card.combat {
            combat.cur_attack += delta.attack;
            combat.cur_max_health += delta.max_health;
        }

        Self::check_updates(game, id);
    }

    /// Deal damage to a character. Flat per-hit reductions (the Armor
    /// keyword, plus anything contributed through the damage-reduction
    /// query) apply first and floor at zero; the remainder accumulates.
    pub fn take_damage(game: &mut Game, id: EntityId, source: Option<EntityId>, amount: i64) {
        let Some(card) = game.card(id) else { return };
        if !card.is_character() {
            return;
        }

        let mut amount = amount;
        if Self::outgoing_keywords(game, id).contains(Keyword::Armor) {
            amount -= 1;
        }

        let mut query = EventEnvelope::new(EventName::DamageReduction)
            .with_target(EntityRef::Card(id))
            .with_amount(amount);
        if let Some(source) = source {
            query = query.with_source(source);
        }
        for scope in [BusScope::Card(id), BusScope::Global] {
            for value in game.emit_collect(scope, &query) {
                amount -= value.as_stat().unwrap_or(0);
            }
        }
        if amount < 0 {
            amount = 0;
        }

        if let Some(combat) = game.card_mut(id).and_then(|c| c.combat.as_mut()) {
            combat.damage += amount;
        }

        // Credit the killing blow before the death check runs.
        if matches!(Self::outgoing_health(game, id), Some(h) if h <= 0) {
            if let Some(card) = game.card_mut(id) {
                if card.killer.is_none() {
                    card.killer = source;
                }
            }
        }

        Self::check_updates(game, id);
    }

    /// Heal a character. Clamped so accumulated damage never goes below
    /// zero — there is no overheal banking.
    pub fn heal(game: &mut Game, id: EntityId, amount: i64) {
        if amount <= 0 {
            return;
        }
        let Some(combat) = game.card_mut(id).and_then(|c| c.combat.as_mut()) else {
            return;
        };
        combat.damage -= amount.min(combat.damage);

        Self::check_updates(game, id);
    }

    /// Recompute outgoing values, diff against the snapshot cache, emit
    /// a presentation update if anything tracked changed, then run the
    /// death check and overwrite the cache.
    pub fn check_updates(game: &mut Game, id: EntityId) {
        let Some(snapshot) = Self::snapshot(game, id) else { return };

        let (changed, zone, owner, slot) = {
            let Some(card) = game.card(id) else { return };
            (
                card.snapshot_cache.as_ref() != Some(&snapshot),
                card.zone,
                card.owner,
                card.slot,
            )
        };

        if changed {
            debug!(entity = id.raw(), ?snapshot, "stat change");
            let view = CardView::of(game, id).map(|v| v.to_value());
            match (zone, view) {
                (Zone::Board, Some(value)) => {
                    if let Some(slot) = slot {
                        game.push_animation(
                            owner,
                            AnimationTag::UpdateBoardCardData,
                            json!({ "ally": true, "slot": slot, "value": value }),
                            0,
                        );
                        game.push_animation(
                            owner.opponent(),
                            AnimationTag::UpdateBoardCardData,
                            json!({ "ally": false, "slot": slot, "value": value }),
                            0,
                        );
                    }
                }
                (Zone::Hand, Some(value)) => {
                    let pos = game.player(owner).hand.iter().position(|c| *c == id);
                    if let Some(pos) = pos {
                        game.push_animation(
                            owner,
                            AnimationTag::UpdateHandCardData,
                            json!({ "pos": pos, "value": value }),
                            0,
                        );
                    }
                }
                _ => {}
            }
        }

        if matches!(snapshot.health, Some(h) if h <= 0) {
            Self::die(game, id);
        }

        if let Some(card) = game.card_mut(id) {
            card.snapshot_cache = Some(snapshot);
        }
    }

    /// Move a character to its terminal zone. Idempotent: a card already
    /// in the death zone is untouched no matter how many damage events
    /// resolve against it.
    pub fn die(game: &mut Game, id: EntityId) {
        let (owner, slot) = {
            let Some(card) = game.card(id) else { return };
            if card.zone == Zone::Death {
                return;
            }
            (card.owner, card.slot)
        };

        if let Some(slot) = slot {
            game.player_mut(owner).slots[slot] = None;
        }
        if let Some(card) = game.card_mut(id) {
            card.slot = None;
        }

        game.set_zone(id, Zone::Death);

        if let Some(slot) = slot {
            game.push_dual_animation(
                owner,
                AnimationTag::AwaitDeath,
                json!({ "ally": true, "slot": slot }),
                300,
            );
        }

        game.emit_notify(
            BusScope::Card(id),
            EventEnvelope::new(EventName::DieTriggered).with_source(id),
        );
        game.emit_notify(
            BusScope::Player(owner),
            EventEnvelope::new(EventName::AllyDied)
                .with_source(id)
                .with_player(owner),
        );
    }
}
