//! Targeting: legal-target sets and their computation.
//!
//! Target sets are structured by the fixed shapes of the domain: ally
//! slots, enemy slots, ally avatar, enemy avatar. Sides are always
//! relative to the player doing the choosing; the same set is flipped
//! before it is shown to the opponent.
//!
//! Target requirements on cards are data ([`TargetRule`]), evaluated
//! here — not per-card predicate code.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::Keyword;
use crate::core::{EntityId, EntityRef, PlayerId};
use crate::state::Game;
use crate::stats::StatPipeline;
use crate::zones::{Zone, BOARD_SLOTS};

/// A structured set of legal targets, relative to a viewing player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSet {
    /// Board slots on the viewer's side.
    pub ally_slots: SmallVec<[usize; BOARD_SLOTS]>,
    /// Board slots on the opponent's side.
    pub enemy_slots: SmallVec<[usize; BOARD_SLOTS]>,
    /// The viewer's own avatar.
    pub ally_player: bool,
    /// The opponent's avatar.
    pub enemy_player: bool,
}

impl TargetSet {
    /// The empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A set holding a single ally slot.
    #[must_use]
    pub fn single_ally_slot(slot: usize) -> Self {
        let mut set = Self::default();
        set.ally_slots.push(slot);
        set
    }

    /// A set holding a single enemy slot.
    #[must_use]
    pub fn single_enemy_slot(slot: usize) -> Self {
        let mut set = Self::default();
        set.enemy_slots.push(slot);
        set
    }

    /// Whether no target at all is legal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ally_slots.is_empty()
            && self.enemy_slots.is_empty()
            && !self.ally_player
            && !self.enemy_player
    }

    /// Whether a chosen target is in the set. `viewer` is the player the
    /// set is relative to.
    #[must_use]
    pub fn contains(&self, viewer: PlayerId, target: TargetRef) -> bool {
        match target {
            TargetRef::AllySlot { pos } => self.ally_slots.contains(&pos),
            TargetRef::EnemySlot { pos } => self.enemy_slots.contains(&pos),
            TargetRef::Player { player } => {
                if player == viewer {
                    self.ally_player
                } else {
                    self.enemy_player
                }
            }
        }
    }

    /// The same set from the opponent's point of view.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            ally_slots: self.enemy_slots.clone(),
            enemy_slots: self.ally_slots.clone(),
            ally_player: self.enemy_player,
            enemy_player: self.ally_player,
        }
    }
}

/// A target chosen by a player, in wire form. Sides are relative to the
/// choosing player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "location")]
pub enum TargetRef {
    /// A slot on the chooser's own board.
    #[serde(rename = "allySlots")]
    AllySlot { pos: usize },
    /// A slot on the opponent's board.
    #[serde(rename = "enemySlots")]
    EnemySlot { pos: usize },
    /// A player avatar.
    #[serde(rename = "player")]
    Player { player: PlayerId },
}

/// Declarative target requirement carried by a card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetRule {
    /// Any character on the opponent's board.
    EnemyCharacters,
    /// Any character on the owner's board.
    AllyCharacters,
    /// Any character on either board.
    AnyCharacter,
    /// The opponent's avatar.
    EnemyAvatar,
    /// Either avatar.
    AnyAvatar,
    /// Any character or avatar.
    Anything,
}

/// Target computation.
pub struct Targeting;

impl Targeting {
    /// Occupied slots on a player's board.
    fn occupied_slots(game: &Game, player: PlayerId) -> SmallVec<[usize; BOARD_SLOTS]> {
        game.player(player)
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_some().then_some(i))
            .collect()
    }

    /// Evaluate a target rule for the given viewer.
    #[must_use]
    pub fn legal_targets(game: &Game, viewer: PlayerId, rule: TargetRule) -> TargetSet {
        let mut set = TargetSet::empty();
        match rule {
            TargetRule::EnemyCharacters => {
                set.enemy_slots = Self::occupied_slots(game, viewer.opponent());
            }
            TargetRule::AllyCharacters => {
                set.ally_slots = Self::occupied_slots(game, viewer);
            }
            TargetRule::AnyCharacter => {
                set.ally_slots = Self::occupied_slots(game, viewer);
                set.enemy_slots = Self::occupied_slots(game, viewer.opponent());
            }
            TargetRule::EnemyAvatar => {
                set.enemy_player = true;
            }
            TargetRule::AnyAvatar => {
                set.ally_player = true;
                set.enemy_player = true;
            }
            TargetRule::Anything => {
                set.ally_slots = Self::occupied_slots(game, viewer);
                set.enemy_slots = Self::occupied_slots(game, viewer.opponent());
                set.ally_player = true;
                set.enemy_player = true;
            }
        }
        set
    }

    /// What an attacker may swing at, honoring Taunt: if any enemy
    /// character has Taunt, only those slots are legal and the enemy
    /// avatar is protected.
    #[must_use]
    pub fn attack_options(game: &Game, attacker: EntityId) -> TargetSet {
        let Some(card) = game.card(attacker) else {
            return TargetSet::empty();
        };
        let enemy = card.owner.opponent();

        let mut all: SmallVec<[usize; BOARD_SLOTS]> = SmallVec::new();
        let mut taunts: SmallVec<[usize; BOARD_SLOTS]> = SmallVec::new();
        for (slot, occupant) in game.player(enemy).slots.iter().enumerate() {
            let Some(id) = occupant else { continue };
            if *id == attacker {
                continue;
            }
            all.push(slot);
            if StatPipeline::outgoing_keywords(game, *id).contains(Keyword::Taunt) {
                taunts.push(slot);
            }
        }

        let mut set = TargetSet::empty();
        if taunts.is_empty() {
            set.enemy_slots = all;
            set.enemy_player = true;
        } else {
            set.enemy_slots = taunts;
        }
        set
    }

    /// Whether a character is currently able to declare an attack.
    /// Recomputed fresh on every call.
    #[must_use]
    pub fn can_attack(game: &Game, attacker: EntityId) -> bool {
        let Some(card) = game.card(attacker) else {
            return false;
        };
        if card.zone != Zone::Board {
            return false;
        }
        let Some(combat) = &card.combat else {
            return false;
        };
        if combat.frozen || combat.has_attacked {
            return false;
        }
        if combat.summoning_sick
            && !StatPipeline::outgoing_keywords(game, attacker).contains(Keyword::Charge)
        {
            return false;
        }
        true
    }

    /// Resolve a wire target to the entity it denotes.
    #[must_use]
    pub fn resolve(game: &Game, viewer: PlayerId, target: TargetRef) -> Option<EntityRef> {
        match target {
            TargetRef::AllySlot { pos } => game
                .player(viewer)
                .slots
                .get(pos)
                .copied()
                .flatten()
                .map(EntityRef::Card),
            TargetRef::EnemySlot { pos } => game
                .player(viewer.opponent())
                .slots
                .get(pos)
                .copied()
                .flatten()
                .map(EntityRef::Card),
            TargetRef::Player { player } => Some(EntityRef::Player(player)),
        }
    }
}
