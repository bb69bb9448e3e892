//! Card instances — runtime card state.
//!
//! A `Card` is one copy of a definition living in a game. It carries the
//! mutable "current" stat layer, accumulated damage, its own event bus,
//! and the handles of every listener it registered elsewhere (so it can
//! be silenced in one call).
//!
//! The "outgoing" layer is never stored here; it is recomputed by
//! [`crate::stats::StatPipeline`] on every query.

use std::rc::Rc;

use crate::core::{EntityId, PlayerId};
use crate::events::{BusScope, EventBus, ListenerId};
use crate::stats::StatSnapshot;
use crate::zones::Zone;

use super::definition::{CardDefinition, CardKind};
use super::keywords::KeywordSet;

/// What a character is currently attacking, while mid-swing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackKind {
    /// Attacking another character.
    Character,
    /// Attacking a player avatar.
    Avatar,
}

/// Combat-facing state; present only on characters.
#[derive(Clone, Debug)]
pub struct CombatState {
    /// Current attack, after direct buffs and debuffs.
    pub cur_attack: i64,

    /// Current maximum health, after direct buffs and debuffs.
    pub cur_max_health: i64,

    /// Accumulated damage. Monotone non-negative; healing subtracts but
    /// never below zero.
    pub damage: i64,

    /// Cannot attack the turn it arrived, unless it has Charge.
    pub summoning_sick: bool,

    /// Already attacked this turn.
    pub has_attacked: bool,

    /// Frozen characters cannot attack; thaws at the owner's turn end.
    pub frozen: bool,

    /// Set while an attack is resolving.
    pub attacking: Option<AttackKind>,
}

impl CombatState {
    fn new(attack: i64, health: i64) -> Self {
        Self {
            cur_attack: attack,
            cur_max_health: health,
            damage: 0,
            summoning_sick: true,
            has_attacked: false,
            frozen: false,
            attacking: None,
        }
    }
}

/// A card instance in a game.
#[derive(Debug)]
pub struct Card {
    /// Unique id for this instance.
    pub entity_id: EntityId,

    /// The static definition this instance was loaded from.
    pub def: Rc<CardDefinition>,

    /// The player who owns this card.
    pub owner: PlayerId,

    /// Current zone. Change only via `Game::set_zone`, which emits the
    /// zone-change event.
    pub zone: Zone,

    /// Board slot, while on the board.
    pub slot: Option<usize>,

    /// This card's own event bus (card scope).
    pub bus: EventBus,

    /// Current geo cost, after direct modifiers.
    pub cur_geo_cost: i64,

    /// Current soul cost, for cards that have one.
    pub cur_soul_cost: Option<i64>,

    /// Current keyword set, after direct grants and removals.
    pub cur_keywords: KeywordSet,

    /// Combat state; `None` for spells.
    pub combat: Option<CombatState>,

    /// Act ability already used.
    pub acted: bool,

    /// Who landed the killing blow, once lethal damage is recorded.
    pub killer: Option<EntityId>,

    /// Last serialized outgoing values, for change diffing.
    pub snapshot_cache: Option<StatSnapshot>,

    /// Listeners this card registered, anywhere, so silencing can remove
    /// them by exact handle.
    pub registrations: Vec<(BusScope, ListenerId)>,
}

impl Card {
    /// Build an instance from a definition. Starts in the void zone; the
    /// caller moves it where it belongs.
    #[must_use]
    pub fn from_definition(entity_id: EntityId, def: Rc<CardDefinition>, owner: PlayerId) -> Self {
        let combat = match def.kind {
            CardKind::Character { attack, health } => Some(CombatState::new(attack, health)),
            CardKind::Spell { .. } => None,
        };

        Self {
            entity_id,
            owner,
            zone: Zone::Void,
            slot: None,
            bus: EventBus::new(),
            cur_geo_cost: def.geo_cost,
            cur_soul_cost: def.soul_cost,
            cur_keywords: def.keywords,
            combat,
            acted: false,
            killer: None,
            snapshot_cache: None,
            registrations: Vec::new(),
            def,
        }
    }

    /// Whether this is a character.
    #[must_use]
    pub fn is_character(&self) -> bool {
        self.combat.is_some()
    }

    /// Whether this is a spell.
    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.combat.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::definition::CardDefinition;

    #[test]
    fn test_character_instance() {
        let def = Rc::new(CardDefinition::character("Gloom Wyrm", 5, 4, 6));
        let card = Card::from_definition(EntityId::new(1), def, PlayerId::FIRST);

        assert!(card.is_character());
        assert_eq!(card.zone, Zone::Void);
        let combat = card.combat.as_ref().unwrap();
        assert_eq!(combat.cur_attack, 4);
        assert_eq!(combat.cur_max_health, 6);
        assert_eq!(combat.damage, 0);
        assert!(combat.summoning_sick);
    }

    #[test]
    fn test_spell_instance_has_no_combat() {
        let def = Rc::new(CardDefinition::spell("Rending Hex", 2).with_soul_cost(1));
        let card = Card::from_definition(EntityId::new(2), def, PlayerId::SECOND);

        assert!(card.is_spell());
        assert_eq!(card.cur_geo_cost, 2);
        assert_eq!(card.cur_soul_cost, Some(1));
    }
}
