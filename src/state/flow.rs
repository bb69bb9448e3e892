//! Gameplay flow: decks, draws, plays, acts, combat, and turns.
//!
//! Every public operation here validates first and silently no-ops on
//! anything invalid — from the outside, an illegal request is
//! indistinguishable from the player doing nothing.

use serde_json::json;
use tracing::debug;

use crate::cards::CardKind;
use crate::core::{EngineResult, EntityId, EntityRef, PlayerId};
use crate::events::{BusScope, EventEnvelope, EventName};
use crate::protocol::{AnimationTag, CardView};
use crate::stats::StatPipeline;
use crate::targeting::{TargetSet, Targeting};
use crate::zones::{Zone, BOARD_SLOTS, HAND_LIMIT};

use super::game::Game;

impl Game {
    // === Setup ===

    /// Create a player's deck from catalog names, top card first.
    pub fn load_deck(&mut self, player: PlayerId, names: &[&str]) -> EngineResult<()> {
        for name in names {
            let id = self.create_card(name, player)?;
            self.set_zone(id, Zone::Deck);
            self.player_mut(player).deck.push(id);
        }
        Ok(())
    }

    /// Start the duel: fire game-start triggers, draw opening hands,
    /// refresh both views, and open the first player's turn. Decks must
    /// already be loaded.
    pub fn begin(&mut self) {
        for player in PlayerId::both() {
            let deck = self.player(player).deck.clone();
            for id in deck {
                self.emit_notify(
                    BusScope::Card(id),
                    EventEnvelope::new(EventName::GameStartTriggered).with_source(id),
                );
            }
        }
        for player in PlayerId::both() {
            self.draw(player, 3, true);
        }
        for player in PlayerId::both() {
            self.push_data_animations(player);
        }
        self.started = true;
        self.start_turn(self.whose_turn);
        self.pump_stack();
    }

    // === Drawing ===

    /// Draw cards. A draw past the hand limit burns the card; a draw
    /// from an empty deck deals escalating fatigue damage instead.
    pub fn draw(&mut self, player: PlayerId, amount: usize, opening: bool) {
        for _ in 0..amount {
            if self.player(player).deck.is_empty() {
                let fatigue = self.player(player).fatigue_next;
                self.player_mut(player).fatigue_next += 1;
                self.damage_player(player, None, fatigue);
                continue;
            }

            let id = self.player_mut(player).deck.remove(0);
            if self.player(player).hand.len() < HAND_LIMIT {
                self.player_mut(player).hand.push(id);
                let view = CardView::of(self, id).map(|v| v.to_value());
                self.push_animation(
                    player,
                    AnimationTag::AddCardHand,
                    json!({ "card": view }),
                    if opening { 0 } else { 100 },
                );
                let count = self.player(player).hand.len();
                self.push_animation(
                    player,
                    AnimationTag::UpdateAllyCards,
                    json!({ "value": count }),
                    0,
                );
                self.push_animation(
                    player.opponent(),
                    AnimationTag::UpdateEnemyCards,
                    json!({ "value": count }),
                    0,
                );
                self.set_zone(id, Zone::Hand);
            } else {
                let view = CardView::of(self, id).map(|v| v.to_value());
                self.push_dual_animation(
                    player,
                    AnimationTag::BurnCard,
                    json!({ "card": view }),
                    400,
                );
                self.push_dual_animation(player, AnimationTag::ClearBurntCard, json!({}), 0);
                self.set_zone(id, Zone::Void);
            }
        }
    }

    /// Conjure a new card straight into hand. Returns `None` when the
    /// hand is full.
    pub fn conjure(&mut self, player: PlayerId, name: &str) -> EngineResult<Option<EntityId>> {
        if self.player(player).hand.len() >= HAND_LIMIT {
            return Ok(None);
        }
        let id = self.create_card(name, player)?;
        self.player_mut(player).hand.push(id);

        let view = CardView::of(self, id).map(|v| v.to_value());
        self.push_animation(player, AnimationTag::AddCardHand, json!({ "card": view }), 100);
        let count = self.player(player).hand.len();
        self.push_animation(
            player,
            AnimationTag::UpdateAllyCards,
            json!({ "value": count }),
            0,
        );
        self.push_animation(
            player.opponent(),
            AnimationTag::UpdateEnemyCards,
            json!({ "value": count }),
            0,
        );
        self.set_zone(id, Zone::Hand);
        Ok(Some(id))
    }

    /// Conjure a character and summon it directly onto the board.
    /// Returns `None` when no slot is free or the name is not a
    /// character.
    pub fn invoke_character(
        &mut self,
        player: PlayerId,
        name: &str,
    ) -> EngineResult<Option<EntityId>> {
        if !self.player(player).has_empty_slot() {
            return Ok(None);
        }
        let def = self.catalog().require(name)?;
        if !matches!(def.kind, CardKind::Character { .. }) {
            return Ok(None);
        }
        let id = self.create_card(name, player)?;
        self.summon_character(player, id, None, false, None);
        Ok(Some(id))
    }

    // === Playing cards ===

    /// Play a character card from hand into a board slot. Targeted
    /// characters suspend for the choice; cancelling restores the card
    /// to its original hand index.
    pub fn play_character(&mut self, player: PlayerId, hand_pos: usize, slot: usize) {
        if slot >= BOARD_SLOTS
            || self.player(player).slots[slot].is_some()
            || hand_pos >= self.player(player).hand.len()
        {
            return;
        }
        let card = self.player(player).hand[hand_pos];
        if !self.card(card).is_some_and(|c| c.is_character()) {
            return;
        }
        if !StatPipeline::is_playable(self, card) {
            return;
        }

        let wants_target = self
            .card(card)
            .and_then(|c| c.def.target_rule)
            .is_some_and(|rule| !Targeting::legal_targets(self, player, rule).is_empty());

        if wants_target {
            self.remove_from_hand(player, hand_pos);
            let entered = self.wait_for_target_cancellable(
                player,
                card,
                Box::new(move |game, target| {
                    let cost = StatPipeline::outgoing_geo_cost(game, card);
                    game.add_player_geo(player, -cost);
                    let count = game.player(player).hand.len();
                    game.push_animation(
                        player.opponent(),
                        AnimationTag::UpdateEnemyCards,
                        json!({ "value": count }),
                        0,
                    );
                    game.summon_character(player, card, Some(slot), true, Some(target));
                    game.emit_notify(
                        BusScope::Player(player),
                        EventEnvelope::new(EventName::AllyCardPlayed)
                            .with_source(card)
                            .with_player(player),
                    );
                }),
                Box::new(move |game| {
                    game.restore_to_hand(player, card, hand_pos);
                }),
            );
            if !entered {
                // Gate was busy; undo the removal silently.
                self.restore_to_hand(player, card, hand_pos);
            }
            return;
        }

        let cost = StatPipeline::outgoing_geo_cost(self, card);
        self.add_player_geo(player, -cost);
        self.remove_from_hand(player, hand_pos);
        let count = self.player(player).hand.len();
        self.push_animation(
            player.opponent(),
            AnimationTag::UpdateEnemyCards,
            json!({ "value": count }),
            0,
        );
        self.summon_character(player, card, Some(slot), true, None);
        self.emit_notify(
            BusScope::Player(player),
            EventEnvelope::new(EventName::AllyCardPlayed)
                .with_source(card)
                .with_player(player),
        );
    }

    /// Play a spell card from hand. Targeted spells suspend for the
    /// choice; cancelling restores the card to its original hand index.
    pub fn play_spell(&mut self, player: PlayerId, hand_pos: usize) {
        if hand_pos >= self.player(player).hand.len() {
            return;
        }
        let card = self.player(player).hand[hand_pos];
        if !self.card(card).is_some_and(|c| c.is_spell()) {
            return;
        }
        if !StatPipeline::is_playable(self, card) {
            return;
        }

        if self.card(card).is_some_and(|c| c.def.requires_target()) {
            self.remove_from_hand(player, hand_pos);
            let entered = self.wait_for_target_cancellable(
                player,
                card,
                Box::new(move |game, target| {
                    game.pay_spell_costs(player, card);
                    game.cast_spell(card, true, Some(target));
                    game.emit_notify(
                        BusScope::Player(player),
                        EventEnvelope::new(EventName::AllyCardPlayed)
                            .with_source(card)
                            .with_player(player),
                    );
                }),
                Box::new(move |game| {
                    game.restore_to_hand(player, card, hand_pos);
                }),
            );
            if !entered {
                self.restore_to_hand(player, card, hand_pos);
            }
            return;
        }

        self.remove_from_hand(player, hand_pos);
        self.pay_spell_costs(player, card);
        self.cast_spell(card, true, None);
        self.emit_notify(
            BusScope::Player(player),
            EventEnvelope::new(EventName::AllyCardPlayed)
                .with_source(card)
                .with_player(player),
        );
    }

    fn pay_spell_costs(&mut self, player: PlayerId, card: EntityId) {
        let geo = StatPipeline::outgoing_geo_cost(self, card);
        self.add_player_geo(player, -geo);
        if let Some(soul) = StatPipeline::outgoing_soul_cost(self, card) {
            self.add_player_soul(player, -soul);
        }
        let count = self.player(player).hand.len();
        self.push_animation(
            player,
            AnimationTag::UpdateAllyCards,
            json!({ "value": count }),
            0,
        );
        self.push_animation(
            player.opponent(),
            AnimationTag::UpdateEnemyCards,
            json!({ "value": count }),
            0,
        );
    }

    /// Resolve a spell. The primary effect runs with the stack closed,
    /// so triggers it causes queue up and resolve only after the script
    /// finishes.
    pub fn cast_spell(&mut self, spell: EntityId, played: bool, target: Option<EntityRef>) {
        let Some(card) = self.card(spell) else { return };
        let owner = card.owner;
        let effect = match &card.def.kind {
            CardKind::Spell { effect } => effect.clone(),
            CardKind::Character { .. } => return,
        };

        self.set_zone(spell, Zone::Void);

        if let Some(target) = target {
            let highlight = self.highlight_for(owner, target);
            let targets = serde_json::to_value(&highlight).unwrap_or(serde_json::Value::Null);
            let flipped =
                serde_json::to_value(highlight.flipped()).unwrap_or(serde_json::Value::Null);
            self.push_animation(
                owner,
                AnimationTag::ShowTargeted,
                json!({ "targets": targets }),
                0,
            );
            self.push_animation(
                owner.opponent(),
                AnimationTag::ShowTargeted,
                json!({ "targets": flipped }),
                0,
            );
        }

        let view = CardView::of(self, spell).map(|v| v.to_value());
        self.push_dual_animation(
            owner,
            AnimationTag::TriggerEffect,
            json!({ "card": view }),
            700,
        );

        self.close_stack();
        if let Some(effect) = effect {
            effect(self, spell, target);
        }
        self.open_stack();

        self.emit_notify(
            BusScope::Player(owner),
            EventEnvelope::new(EventName::SpellCast)
                .with_source(spell)
                .with_player(owner)
                // Booleans ride the amount field as 0/1.
                .with_amount(i64::from(played)),
        );
    }

    /// Place a character into a slot (first free slot when `None`) and
    /// fire its play triggers if it was played from hand.
    pub fn summon_character(
        &mut self,
        player: PlayerId,
        card: EntityId,
        slot: Option<usize>,
        played: bool,
        target: Option<EntityRef>,
    ) -> bool {
        let Some(slot) = slot.or_else(|| self.player(player).first_empty_slot()) else {
            return false;
        };
        if slot >= BOARD_SLOTS || self.player(player).slots[slot].is_some() {
            return false;
        }
        if !self.card(card).is_some_and(|c| c.is_character()) {
            return false;
        }

        self.player_mut(player).slots[slot] = Some(card);
        if let Some(card) = self.card_mut(card) {
            card.slot = Some(slot);
        }
        self.set_zone(card, Zone::Board);

        let view = CardView::of(self, card).map(|v| v.to_value());
        self.push_dual_animation(
            player,
            AnimationTag::SummonCharacter,
            json!({ "card": view, "slot": slot }),
            0,
        );

        if played {
            let mut envelope = EventEnvelope::new(EventName::PlayTriggered).with_source(card);
            if let Some(target) = target {
                envelope = envelope.with_target(target);
            }
            self.emit_notify(BusScope::Card(card), envelope);

            let hook = self.card(card).and_then(|c| c.def.hooks.on_play.clone());
            if let Some(hook) = hook {
                let label = format!("OnPlay:{}", card.raw());
                self.schedule(label, move |game| hook(game, card, target));
            }
        }

        true
    }

    /// Use a hand card's act ability on a board character.
    pub fn character_acts(&mut self, player: PlayerId, hand_pos: usize, slot: usize, ally: bool) {
        if slot >= BOARD_SLOTS || hand_pos >= self.player(player).hand.len() {
            return;
        }
        let target_owner = if ally { player } else { player.opponent() };
        let Some(target) = self.player(target_owner).slots[slot] else {
            return;
        };

        let card = self.player(player).hand[hand_pos];
        if !StatPipeline::can_act(self, card) {
            return;
        }
        let Some(act) = self.card(card).and_then(|c| c.def.act) else {
            return;
        };

        self.add_player_geo(player, -act.cost);

        let highlight = if ally {
            TargetSet::single_ally_slot(slot)
        } else {
            TargetSet::single_enemy_slot(slot)
        };
        let targets = serde_json::to_value(&highlight).unwrap_or(serde_json::Value::Null);
        let flipped = serde_json::to_value(highlight.flipped()).unwrap_or(serde_json::Value::Null);
        self.push_animation(
            player,
            AnimationTag::ShowTargeted,
            json!({ "targets": targets }),
            0,
        );
        self.push_animation(
            player.opponent(),
            AnimationTag::ShowTargeted,
            json!({ "targets": flipped }),
            0,
        );
        let view = CardView::of(self, card).map(|v| v.to_value());
        self.push_dual_animation(
            player,
            AnimationTag::TriggerEffect,
            json!({ "card": view }),
            700,
        );

        self.emit_notify(
            BusScope::Card(card),
            EventEnvelope::new(EventName::ActTriggered)
                .with_source(card)
                .with_target(EntityRef::Card(target)),
        );
        let hook = self.card(card).and_then(|c| c.def.hooks.on_act.clone());
        if let Some(hook) = hook {
            let label = format!("OnAct:{}", card.raw());
            self.schedule(label, move |game| {
                hook(game, card, Some(EntityRef::Card(target)));
            });
        }

        if let Some(card) = self.card_mut(card) {
            card.acted = true;
        }
        self.emit_notify(
            BusScope::Player(player),
            EventEnvelope::new(EventName::AllyCardActed)
                .with_source(card)
                .with_player(player),
        );
    }

    // === Combat ===

    /// One character attacks another. Both deal their attack
    /// simultaneously: the defender's attack value is snapshotted before
    /// any damage lands.
    pub fn attack_character(&mut self, attacker: EntityId, defender: EntityId, force: bool) {
        let Some(owner) = self.card(attacker).map(|c| c.owner) else {
            return;
        };
        if !force && !Targeting::can_attack(self, attacker) {
            return;
        }

        let options = Targeting::attack_options(self, attacker);
        let (defender_owner, defender_slot) = match self.card(defender) {
            Some(card) => (card.owner, card.slot),
            None => return,
        };
        let Some(defender_slot) = defender_slot else { return };
        let legal = if defender_owner == owner {
            options.ally_slots.contains(&defender_slot)
        } else {
            options.enemy_slots.contains(&defender_slot)
        };
        if !legal {
            debug!(attacker = attacker.raw(), defender = defender.raw(), "attack refused");
            return;
        }

        let attacker_slot = self.card(attacker).and_then(|c| c.slot);
        if let Some(combat) = self.card_mut(attacker).and_then(|c| c.combat.as_mut()) {
            combat.attacking = Some(crate::cards::AttackKind::Character);
        }

        self.emit_notify(
            BusScope::Player(owner),
            EventEnvelope::new(EventName::AllyToAttack)
                .with_source(attacker)
                .with_target(EntityRef::Card(defender))
                .with_player(owner),
        );

        if let Some(slot) = attacker_slot {
            self.push_dual_animation(
                owner,
                AnimationTag::DisplayAttackOverlay,
                json!({ "ally": true, "slot": slot }),
                0,
            );
        }
        self.push_dual_animation(
            defender_owner,
            AnimationTag::DisplayDefendOverlay,
            json!({ "ally": true, "slot": defender_slot }),
            0,
        );
        self.push_dual_animation(owner, AnimationTag::Wait, json!({}), 400);
        self.push_dual_animation(owner, AnimationTag::HideAttackOverlay, json!({}), 0);
        self.push_dual_animation(owner, AnimationTag::HideDefendOverlay, json!({}), 0);

        let counter_damage = StatPipeline::outgoing_attack(self, defender).unwrap_or(0);
        let attack_damage = StatPipeline::outgoing_attack(self, attacker).unwrap_or(0);
        StatPipeline::take_damage(self, defender, Some(attacker), attack_damage);
        StatPipeline::take_damage(self, attacker, Some(defender), counter_damage);

        if let Some(combat) = self.card_mut(attacker).and_then(|c| c.combat.as_mut()) {
            combat.attacking = None;
            combat.has_attacked = true;
        }

        let hook = self.card(attacker).and_then(|c| c.def.hooks.on_attack.clone());
        if let Some(hook) = hook {
            hook(self, attacker, Some(EntityRef::Card(defender)));
        }

        self.emit_notify(
            BusScope::Player(owner),
            EventEnvelope::new(EventName::AllyAttacked)
                .with_source(attacker)
                .with_target(EntityRef::Card(defender))
                .with_player(owner),
        );
    }

    /// A character attacks a player's avatar.
    pub fn attack_player(&mut self, attacker: EntityId, target: PlayerId, force: bool) {
        let Some(owner) = self.card(attacker).map(|c| c.owner) else {
            return;
        };
        if !force && !Targeting::can_attack(self, attacker) {
            return;
        }

        let options = Targeting::attack_options(self, attacker);
        let legal = if target == owner {
            options.ally_player
        } else {
            options.enemy_player
        };
        if !legal {
            debug!(attacker = attacker.raw(), %target, "avatar attack refused");
            return;
        }

        let attacker_slot = self.card(attacker).and_then(|c| c.slot);
        if let Some(combat) = self.card_mut(attacker).and_then(|c| c.combat.as_mut()) {
            combat.attacking = Some(crate::cards::AttackKind::Avatar);
        }

        self.emit_notify(
            BusScope::Player(owner),
            EventEnvelope::new(EventName::AllyToAttack)
                .with_source(attacker)
                .with_target(EntityRef::Player(target))
                .with_player(owner),
        );

        if let Some(slot) = attacker_slot {
            self.push_dual_animation(
                owner,
                AnimationTag::DisplayAttackOverlay,
                json!({ "ally": true, "slot": slot }),
                0,
            );
        }
        self.push_dual_animation(
            owner,
            AnimationTag::DisplayAvatarAttacked,
            json!({ "ally": false }),
            0,
        );
        self.push_dual_animation(owner, AnimationTag::Wait, json!({}), 400);
        self.push_dual_animation(owner, AnimationTag::HideAttackOverlay, json!({}), 0);
        self.push_dual_animation(
            owner,
            AnimationTag::HideAvatarAttacked,
            json!({ "ally": false }),
            0,
        );

        let damage = StatPipeline::outgoing_attack(self, attacker).unwrap_or(0);
        self.damage_player(target, Some(attacker), damage);

        if let Some(combat) = self.card_mut(attacker).and_then(|c| c.combat.as_mut()) {
            combat.attacking = None;
            combat.has_attacked = true;
        }

        let hook = self.card(attacker).and_then(|c| c.def.hooks.on_attack.clone());
        if let Some(hook) = hook {
            hook(self, attacker, Some(EntityRef::Player(target)));
        }

        self.emit_notify(
            BusScope::Player(owner),
            EventEnvelope::new(EventName::AllyAttacked)
                .with_source(attacker)
                .with_target(EntityRef::Player(target))
                .with_player(owner),
        );
    }

    // === Turns ===

    /// Start a player's turn: geo ramp, draw, per-card turn-start.
    pub fn start_turn(&mut self, player: PlayerId) {
        self.push_animation(player, AnimationTag::BeginTurn, json!({}), 0);

        let ramp = self.player(player).geo_next;
        self.add_player_geo(player, ramp);
        if self.player(player).geo_next < 10 {
            self.player_mut(player).geo_next += 1;
        }

        self.draw(player, 1, false);

        let board = self.player(player).slots;
        for id in board.into_iter().flatten() {
            if let Some(combat) = self.card_mut(id).and_then(|c| c.combat.as_mut()) {
                combat.summoning_sick = false;
                combat.has_attacked = false;
            }
            let hook = self.card(id).and_then(|c| c.def.hooks.on_turn_start.clone());
            if let Some(hook) = hook {
                hook(self, id);
            }
        }
    }

    /// End a player's turn: turn-end triggers, thaw, per-card turn-end.
    pub fn end_turn(&mut self, player: PlayerId) {
        self.push_animation(player, AnimationTag::EndTurn, json!({}), 0);

        self.emit_notify(
            BusScope::Player(player),
            EventEnvelope::new(EventName::TurnEndTriggered).with_player(player),
        );

        let board = self.player(player).slots;
        for id in board.into_iter().flatten() {
            if let Some(combat) = self.card_mut(id).and_then(|c| c.combat.as_mut()) {
                combat.frozen = false;
            }
            let hook = self.card(id).and_then(|c| c.def.hooks.on_turn_end.clone());
            if let Some(hook) = hook {
                hook(self, id);
            }
        }
    }

    /// Pass the turn to the other player.
    pub fn next_turn(&mut self) {
        let current = self.whose_turn;
        self.end_turn(current);
        self.whose_turn = current.opponent();
        self.start_turn(self.whose_turn);
        self.pump_stack();
    }

    // === Hand bookkeeping ===

    fn remove_from_hand(&mut self, player: PlayerId, hand_pos: usize) {
        self.player_mut(player).hand.remove(hand_pos);
        self.push_animation(
            player,
            AnimationTag::RemoveCardHand,
            json!({ "cardPos": hand_pos }),
            0,
        );
        let count = self.player(player).hand.len();
        self.push_animation(
            player,
            AnimationTag::UpdateAllyCards,
            json!({ "value": count }),
            0,
        );
    }

    /// Reinsert a card at its original hand index; the restore half of a
    /// cancelled targeted play.
    fn restore_to_hand(&mut self, player: PlayerId, card: EntityId, hand_pos: usize) {
        let pos = hand_pos.min(self.player(player).hand.len());
        self.player_mut(player).hand.insert(pos, card);
        let count = self.player(player).hand.len();
        self.push_animation(
            player,
            AnimationTag::UpdateAllyCards,
            json!({ "value": count }),
            0,
        );
        let view = CardView::of(self, card).map(|v| v.to_value());
        self.push_animation(
            player,
            AnimationTag::AddCardHandPos,
            json!({ "pos": pos, "card": view }),
            0,
        );
    }

    /// The highlight set for a single already-chosen target, relative to
    /// a viewer.
    fn highlight_for(&self, viewer: PlayerId, target: EntityRef) -> TargetSet {
        match target {
            EntityRef::Player(p) => {
                let mut set = TargetSet::empty();
                if p == viewer {
                    set.ally_player = true;
                } else {
                    set.enemy_player = true;
                }
                set
            }
            EntityRef::Card(id) => match self.card(id).and_then(|c| c.slot.map(|s| (c.owner, s))) {
                Some((owner, slot)) if owner == viewer => TargetSet::single_ally_slot(slot),
                Some((_, slot)) => TargetSet::single_enemy_slot(slot),
                None => TargetSet::empty(),
            },
        }
    }
}
