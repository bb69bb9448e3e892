//! The inbound message dispatcher and outbound frame flush.
//!
//! One command per message. Every command is validated against the
//! decision-gate states before dispatch: while any request is
//! outstanding, only the owner's answer is accepted and every other
//! gameplay message — from either player — is dropped. Malformed input
//! is logged and dropped with no state mutation.

use serde_json::json;
use tracing::{debug, warn};

use crate::core::PlayerId;
use crate::decision::GateState;
use crate::state::Game;
use crate::zones::BOARD_SLOTS;

use super::animation::{Animation, AnimationTag, CardData, OutboundFrame};
use super::commands::ClientCommand;
use super::view::CardView;

impl Game {
    /// Handle one raw inbound message from a player. Returns the frames
    /// to deliver, one per player with pending output, after the action
    /// fully resolves.
    pub fn handle_message(&mut self, player: PlayerId, raw: &str) -> Vec<(PlayerId, String)> {
        // Session pings short-circuit before JSON parsing.
        if raw == "ping" {
            self.player_mut(player).pinged = true;
            return Vec::new();
        }
        if !self.started || self.winner.is_some() {
            return Vec::new();
        }

        let command: ClientCommand = match serde_json::from_str(raw) {
            Ok(command) => command,
            Err(e) => {
                warn!(%player, error = %e, "malformed message dropped");
                return Vec::new();
            }
        };

        self.dispatch(player, command);
        self.pump_stack();
        self.take_frames()
    }

    fn dispatch(&mut self, player: PlayerId, command: ClientCommand) {
        match self.player(player).gate.state() {
            GateState::AwaitingChoice => {
                if let ClientCommand::ChosenCard { chosen } = command {
                    self.resolve_choice(player, chosen);
                } else {
                    debug!(%player, ?command, "dropped: choice outstanding");
                }
            }
            GateState::AwaitingTarget { cancellable } => match command {
                ClientCommand::TargetChosen { target } => {
                    self.resolve_target(player, target);
                }
                ClientCommand::CancelChoose if cancellable => {
                    self.cancel_target(player);
                }
                _ => debug!(%player, ?command, "dropped: target request outstanding"),
            },
            GateState::Idle => self.dispatch_gameplay(player, command),
        }
    }

    fn dispatch_gameplay(&mut self, player: PlayerId, command: ClientCommand) {
        // A request outstanding for the *other* player also blocks all
        // gameplay; resolution never re-enters around a suspension.
        if !self.player(player.opponent()).gate.is_idle() {
            debug!(%player, "dropped: opponent decision outstanding");
            return;
        }
        if self.whose_turn != player {
            debug!(%player, ?command, "dropped: not this player's turn");
            return;
        }

        match command {
            ClientCommand::EndTurn => self.next_turn(),
            ClientCommand::PlayCharacterCard {
                position,
                slot_number,
            } => self.play_character(player, position, slot_number),
            ClientCommand::CharacterActs {
                position,
                slot_number,
                ally,
            } => self.character_acts(player, position, slot_number, ally),
            ClientCommand::PlaySpellCard { position } => self.play_spell(player, position),
            ClientCommand::CharacterAttack { initiator, target } => {
                if initiator.team != player.0
                    || initiator.slot >= BOARD_SLOTS
                    || target.slot >= BOARD_SLOTS
                    || target.team > 1
                {
                    return;
                }
                let attacker = self.player(player).slots[initiator.slot];
                let defender = self.player(PlayerId::new(target.team)).slots[target.slot];
                if let (Some(attacker), Some(defender)) = (attacker, defender) {
                    self.schedule("CharacterAttack", move |game| {
                        game.attack_character(attacker, defender, false);
                    });
                }
            }
            ClientCommand::PlayerAttack { initiator, target } => {
                if initiator.team != player.0 || initiator.slot >= BOARD_SLOTS || target > 1 {
                    return;
                }
                if let Some(attacker) = self.player(player).slots[initiator.slot] {
                    self.attack_player(attacker, PlayerId::new(target), false);
                }
            }
            ClientCommand::TargetChosen { .. }
            | ClientCommand::CancelChoose
            | ClientCommand::ChosenCard { .. } => {
                debug!(%player, ?command, "dropped: no decision outstanding");
            }
        }
    }

    // === Outbound ===

    fn card_data(&self, player: PlayerId) -> CardData {
        let views = |owner: PlayerId| -> Vec<Option<CardView>> {
            self.player(owner)
                .slots
                .iter()
                .map(|slot| slot.and_then(|id| CardView::of(self, id)))
                .collect()
        };
        CardData {
            ally_slots: views(player),
            enemy_slots: views(player.opponent()),
            hand: self
                .player(player)
                .hand
                .iter()
                .filter_map(|id| CardView::of(self, *id))
                .collect(),
        }
    }

    /// Drain pending animation batches into serialized frames, one per
    /// player with output. Serialization failure loses that player's
    /// frame (logged), never the turn.
    pub fn take_frames(&mut self) -> Vec<(PlayerId, String)> {
        let mut frames = Vec::new();
        for player in PlayerId::both() {
            if self.player(player).animations.is_empty() {
                continue;
            }
            let frame = OutboundFrame {
                animation_list: std::mem::take(&mut self.player_mut(player).animations),
                card_data: self.card_data(player),
            };
            match serde_json::to_string(&frame) {
                Ok(encoded) => frames.push((player, encoded)),
                Err(e) => warn!(%player, error = %e, "outbound frame dropped"),
            }
        }
        frames
    }

    /// Rebuild a complete view of the game for one player — the resync
    /// frame a session layer sends on (re)connect. Pending batches are
    /// untouched.
    #[must_use]
    pub fn full_state_frame(&self, player: PlayerId) -> OutboundFrame {
        let mut animations = Vec::new();
        animations.push(Animation::new(
            AnimationTag::SetId,
            json!({ "id": player.0 }),
            0,
        ));

        for (owner, ally) in [(player, true), (player.opponent(), false)] {
            for (slot, occupant) in self.player(owner).slots.iter().enumerate() {
                let Some(id) = occupant else { continue };
                let view = CardView::of(self, *id).map(|v| v.to_value());
                animations.push(Animation::new(
                    AnimationTag::SummonCharacter,
                    json!({ "card": view, "slot": slot, "ally": ally }),
                    0,
                ));
            }
        }
        for id in &self.player(player).hand {
            let view = CardView::of(self, *id).map(|v| v.to_value());
            animations.push(Animation::new(
                AnimationTag::AddCardHand,
                json!({ "card": view }),
                0,
            ));
        }

        let me = self.player(player);
        let opp = self.player(player.opponent());
        let rows = [
            (AnimationTag::UpdateAllyGeo, json!({ "value": me.geo })),
            (AnimationTag::UpdateEnemyGeo, json!({ "value": opp.geo })),
            (AnimationTag::UpdateAllySoul, json!({ "value": me.soul })),
            (AnimationTag::UpdateEnemySoul, json!({ "value": opp.soul })),
            (AnimationTag::UpdateAllyCards, json!({ "value": me.hand.len() })),
            (AnimationTag::UpdateEnemyCards, json!({ "value": opp.hand.len() })),
            (
                AnimationTag::UpdateAllyHealth,
                json!({ "value": format!("{}/{}", me.hp, me.hp_max) }),
            ),
            (
                AnimationTag::UpdateEnemyHealth,
                json!({ "value": format!("{}/{}", opp.hp, opp.hp_max) }),
            ),
            (AnimationTag::UpdateAllyName, json!({ "value": me.name })),
            (AnimationTag::UpdateEnemyName, json!({ "value": opp.name })),
        ];
        for (tag, data) in rows {
            animations.push(Animation::new(tag, data, 0));
        }

        // Re-issue the outstanding prompt, if any.
        match self.player(player).gate.state() {
            GateState::AwaitingTarget { cancellable } => {
                if let Some(legal) = self.player(player).gate.legal_targets() {
                    let targets =
                        serde_json::to_value(legal).unwrap_or(serde_json::Value::Null);
                    if cancellable {
                        let card = self
                            .player(player)
                            .gate
                            .prompt_card()
                            .and_then(|id| CardView::of(self, id))
                            .map(|view| view.to_value())
                            .unwrap_or(serde_json::Value::Null);
                        animations.push(Animation::new(
                            AnimationTag::GetTargetCancellable,
                            json!({ "validTargets": targets, "card": card }),
                            0,
                        ));
                    } else {
                        animations.push(Animation::new(
                            AnimationTag::GetTargetNotCancellable,
                            json!({ "validTargets": targets }),
                            0,
                        ));
                    }
                }
            }
            GateState::AwaitingChoice => {
                if let Some(offered) = self.player(player).gate.offered() {
                    let views: Vec<serde_json::Value> = offered
                        .iter()
                        .filter_map(|name| self.catalog().get(name))
                        .map(|def| CardView::from_definition(&def).to_value())
                        .collect();
                    animations.push(Animation::new(
                        AnimationTag::GetChoose,
                        json!({ "chooseCards": views }),
                        0,
                    ));
                }
            }
            GateState::Idle => {}
        }

        if self.whose_turn == player {
            animations.push(Animation::new(AnimationTag::BeginTurn, json!({}), 0));
        }

        OutboundFrame {
            animation_list: animations,
            card_data: self.card_data(player),
        }
    }
}
