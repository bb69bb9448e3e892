//! Client-visible card snapshots.
//!
//! `CardView` is the serialization boundary for a card: only
//! representable, outgoing values are copied in; dynamic text fragments
//! are evaluated to plain strings; nothing here can reach back to the
//! game, a bus, or a listener.

use serde::Serialize;
use tracing::warn;

use crate::cards::{Archetype, CardDefinition, CardKind, KeywordSet, TextFragment};
use crate::core::EntityId;
use crate::state::Game;
use crate::stats::StatPipeline;
use crate::zones::Zone;

/// The public copy of a card, as sent to clients.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    /// Instance id, stable across updates.
    pub card_id: u32,
    /// Card name.
    pub name: String,
    /// Character or spell.
    pub archetype: Archetype,
    /// Outgoing geo cost.
    pub geo_cost: i64,
    /// Outgoing soul cost, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soul_cost: Option<i64>,
    /// Outgoing attack (characters only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<i64>,
    /// Outgoing health (characters only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<i64>,
    /// Outgoing keywords.
    pub keywords: KeywordSet,
    /// Rules text with dynamic fragments evaluated.
    pub text: Vec<String>,
    /// Whether the owner could play this card right now.
    pub playable: bool,
    /// Whether the owner could use its act ability right now.
    pub actable: bool,
    /// Board slot, while on the board.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    /// Current zone.
    pub zone: Zone,
}

impl CardView {
    /// Snapshot a live card instance.
    #[must_use]
    pub fn of(game: &Game, id: EntityId) -> Option<Self> {
        let card = game.card(id)?;

        let text = card
            .def
            .text
            .iter()
            .map(|fragment| match fragment {
                TextFragment::Literal(s) => s.clone(),
                TextFragment::Dynamic(eval) => eval(game, id),
            })
            .collect();

        Some(Self {
            card_id: id.raw(),
            name: card.def.name.clone(),
            archetype: card.def.archetype(),
            geo_cost: StatPipeline::outgoing_geo_cost(game, id),
            soul_cost: StatPipeline::outgoing_soul_cost(game, id),
            attack: StatPipeline::outgoing_attack(game, id),
            health: StatPipeline::outgoing_health(game, id),
            keywords: StatPipeline::outgoing_keywords(game, id),
            text,
            playable: StatPipeline::is_playable(game, id),
            actable: StatPipeline::can_act(game, id),
            slot: card.slot,
            zone: card.zone,
        })
    }

    /// Snapshot a bare definition (for choice offers that have no live
    /// instance yet). Base values; dynamic text is skipped.
    #[must_use]
    pub fn from_definition(def: &CardDefinition) -> Self {
        let (attack, health) = match def.kind {
            CardKind::Character { attack, health } => (Some(attack), Some(health)),
            CardKind::Spell { .. } => (None, None),
        };

        Self {
            card_id: 0,
            name: def.name.clone(),
            archetype: def.archetype(),
            geo_cost: def.geo_cost,
            soul_cost: def.soul_cost,
            attack,
            health,
            keywords: def.keywords,
            text: def
                .text
                .iter()
                .filter_map(|fragment| match fragment {
                    TextFragment::Literal(s) => Some(s.clone()),
                    TextFragment::Dynamic(_) => None,
                })
                .collect(),
            playable: false,
            actable: false,
            slot: None,
            zone: Zone::Void,
        }
    }

    /// Serialize to a JSON value for an animation payload. Failures are
    /// logged and yield `null` — a degraded payload, never an abort.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        match serde_json::to_value(self) {
            Ok(value) => value,
            Err(e) => {
                warn!(card = %self.name, error = %e, "card snapshot serialization failed");
                serde_json::Value::Null
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_definition() {
        let def = CardDefinition::character("Gloom Wyrm", 5, 4, 6).with_text("Looms.");
        let view = CardView::from_definition(&def);

        assert_eq!(view.name, "Gloom Wyrm");
        assert_eq!(view.attack, Some(4));
        assert_eq!(view.health, Some(6));
        assert_eq!(view.text, ["Looms."]);
        assert!(!view.playable);
    }

    #[test]
    fn test_spell_view_omits_combat_fields() {
        let def = CardDefinition::spell("Rending Hex", 2);
        let view = CardView::from_definition(&def);
        let value = view.to_value();

        assert!(value.get("attack").is_none());
        assert!(value.get("health").is_none());
        assert_eq!(value["geoCost"], 2);
    }
}
