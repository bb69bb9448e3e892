//! Whole-game flow tests through the message dispatcher.
//!
//! These drive the engine the way a session layer does: raw JSON
//! messages in, serialized frames out. They cover setup, turn flow,
//! plays, combat, the taunt rule, fatigue, win, and the input-rejection
//! rules around outstanding decisions.

use std::rc::Rc;

use duelcore::{
    AnimationTag, CardDefinition, CardRegistry, EntityId, EntityRef, GateState, Game, Keyword,
    PlayerId, StatPipeline, TargetRule, Zone,
};

fn catalog() -> Rc<CardRegistry> {
    let mut registry = CardRegistry::new();
    registry.register(CardDefinition::character("Husk Brute", 2, 2, 3));
    registry.register(CardDefinition::character("Gloom Wyrm", 5, 4, 6));
    registry.register(
        CardDefinition::character("Shard Sentinel", 3, 2, 5).with_keyword(Keyword::Taunt),
    );
    registry.register(
        CardDefinition::character("Vault Runner", 1, 1, 1).with_keyword(Keyword::Charge),
    );
    registry.register(
        CardDefinition::spell("Rending Hex", 2)
            .with_target_rule(TargetRule::EnemyCharacters)
            .with_effect(|game, _spell, target| {
                if let Some(EntityRef::Card(id)) = target {
                    StatPipeline::take_damage(game, id, None, 3);
                }
            }),
    );
    Rc::new(registry)
}

fn started_game(deck: &[&str]) -> Game {
    let mut game = Game::new(catalog(), 42);
    game.load_deck(PlayerId::FIRST, deck).unwrap();
    game.load_deck(PlayerId::SECOND, deck).unwrap();
    game.begin();
    let _ = game.take_frames();
    game
}

fn board_character(game: &mut Game, player: PlayerId, name: &str) -> EntityId {
    let id = game.create_card(name, player).unwrap();
    assert!(game.summon_character(player, id, None, false, None));
    // Board characters in these tests are ready to act.
    if let Some(combat) = game.card_mut(id).and_then(|c| c.combat.as_mut()) {
        combat.summoning_sick = false;
    }
    id
}

#[test]
fn test_setup_draws_and_first_turn() {
    let game = started_game(&["Vault Runner"; 10]);

    assert!(game.started);
    assert_eq!(game.whose_turn, PlayerId::FIRST);
    // Opening three plus the first turn's draw.
    assert_eq!(game.player(PlayerId::FIRST).hand.len(), 4);
    assert_eq!(game.player(PlayerId::SECOND).hand.len(), 3);
    assert_eq!(game.player(PlayerId::FIRST).geo, 1);
    assert_eq!(game.player(PlayerId::SECOND).geo, 0);
}

#[test]
fn test_play_character_through_dispatcher() {
    let mut game = started_game(&["Vault Runner"; 10]);

    let frames = game.handle_message(
        PlayerId::FIRST,
        "{\"type\":\"playCharacterCard\",\"position\":0,\"slotNumber\":0}",
    );

    let played = game.player(PlayerId::FIRST).slots[0].expect("character on board");
    assert_eq!(game.card(played).unwrap().zone, Zone::Board);
    assert_eq!(game.player(PlayerId::FIRST).hand.len(), 3);
    assert_eq!(game.player(PlayerId::FIRST).geo, 0);

    // Both players got a frame; the owner's includes the summon command.
    assert_eq!(frames.len(), 2);
    let (_, owner_frame) = frames.iter().find(|(p, _)| *p == PlayerId::FIRST).unwrap();
    let value: serde_json::Value = serde_json::from_str(owner_frame).unwrap();
    assert!(value["animationList"]
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["type"] == "summonCharacter"));
    assert_eq!(value["cardData"]["hand"].as_array().unwrap().len(), 3);
}

#[test]
fn test_wrong_turn_is_silent_noop() {
    let mut game = started_game(&["Vault Runner"; 10]);

    let frames = game.handle_message(
        PlayerId::SECOND,
        "{\"type\":\"playCharacterCard\",\"position\":0,\"slotNumber\":0}",
    );

    assert!(frames.is_empty());
    assert!(game.player(PlayerId::SECOND).no_characters());
    assert_eq!(game.player(PlayerId::SECOND).hand.len(), 3);
}

#[test]
fn test_occupied_slot_is_silent_noop() {
    let mut game = started_game(&["Vault Runner"; 10]);
    board_character(&mut game, PlayerId::FIRST, "Husk Brute");
    let _ = game.take_frames();

    let hand_before = game.player(PlayerId::FIRST).hand.len();
    game.handle_message(
        PlayerId::FIRST,
        "{\"type\":\"playCharacterCard\",\"position\":0,\"slotNumber\":0}",
    );

    assert_eq!(game.player(PlayerId::FIRST).hand.len(), hand_before);
}

#[test]
fn test_end_turn_passes_and_ramps() {
    let mut game = started_game(&["Vault Runner"; 10]);

    game.handle_message(PlayerId::FIRST, "{\"type\":\"endTurn\"}");

    assert_eq!(game.whose_turn, PlayerId::SECOND);
    assert_eq!(game.player(PlayerId::SECOND).geo, 1);
    assert_eq!(game.player(PlayerId::SECOND).hand.len(), 4);

    game.handle_message(PlayerId::SECOND, "{\"type\":\"endTurn\"}");
    // Second turn grants two geo.
    assert_eq!(game.player(PlayerId::FIRST).geo, 1 + 2);
}

#[test]
fn test_character_attack_exchange() {
    let mut game = started_game(&["Vault Runner"; 10]);
    let wyrm = board_character(&mut game, PlayerId::FIRST, "Gloom Wyrm");
    let brute = board_character(&mut game, PlayerId::SECOND, "Husk Brute");

    game.handle_message(
        PlayerId::FIRST,
        "{\"type\":\"characterAttack\",\
         \"initiator\":{\"team\":0,\"slot\":0},\
         \"target\":{\"team\":1,\"slot\":0}}",
    );

    // 4 attack kills the 3-health brute; the wyrm takes 2 back.
    assert_eq!(game.card(brute).unwrap().zone, Zone::Death);
    assert_eq!(game.card(brute).unwrap().killer, Some(wyrm));
    assert_eq!(StatPipeline::outgoing_health(&game, wyrm), Some(4));
    assert!(game
        .card(wyrm)
        .unwrap()
        .combat
        .as_ref()
        .unwrap()
        .has_attacked);

    // The attacker's owner gained soul for the declaration; the victim's
    // owner gained soul for the death.
    assert_eq!(game.player(PlayerId::FIRST).soul, 1);
    assert_eq!(game.player(PlayerId::SECOND).soul, 1);
}

#[test]
fn test_taunt_redirects_attacks() {
    let mut game = started_game(&["Vault Runner"; 10]);
    let runner = board_character(&mut game, PlayerId::FIRST, "Vault Runner");
    let brute = board_character(&mut game, PlayerId::SECOND, "Husk Brute");
    let sentinel = board_character(&mut game, PlayerId::SECOND, "Shard Sentinel");
    let brute_slot = game.card(brute).unwrap().slot.unwrap();

    // The avatar is protected while a taunt stands.
    game.attack_player(runner, PlayerId::SECOND, false);
    assert_eq!(game.player(PlayerId::SECOND).hp, 30);

    // So are non-taunt characters.
    game.attack_character(runner, brute, false);
    assert_eq!(game.card(brute).unwrap().combat.as_ref().unwrap().damage, 0);

    // The taunt itself is a legal target.
    game.attack_character(runner, sentinel, false);
    assert_eq!(
        game.card(sentinel).unwrap().combat.as_ref().unwrap().damage,
        1
    );
}

#[test]
fn test_summoning_sickness_and_charge() {
    let mut game = started_game(&["Vault Runner"; 10]);

    // A freshly summoned character cannot attack...
    let brute = game.create_card("Husk Brute", PlayerId::FIRST).unwrap();
    assert!(game.summon_character(PlayerId::FIRST, brute, None, false, None));
    game.attack_player(brute, PlayerId::SECOND, false);
    assert_eq!(game.player(PlayerId::SECOND).hp, 30);

    // ...unless it has Charge.
    let runner = game.create_card("Vault Runner", PlayerId::FIRST).unwrap();
    assert!(game.summon_character(PlayerId::FIRST, runner, None, false, None));
    game.attack_player(runner, PlayerId::SECOND, false);
    assert_eq!(game.player(PlayerId::SECOND).hp, 29);
}

#[test]
fn test_frozen_thaws_at_turn_end() {
    let mut game = started_game(&["Vault Runner"; 10]);
    let wyrm = board_character(&mut game, PlayerId::FIRST, "Gloom Wyrm");

    if let Some(combat) = game.card_mut(wyrm).and_then(|c| c.combat.as_mut()) {
        combat.frozen = true;
    }
    game.attack_player(wyrm, PlayerId::SECOND, false);
    assert_eq!(game.player(PlayerId::SECOND).hp, 30);

    game.end_turn(PlayerId::FIRST);
    assert!(!game.card(wyrm).unwrap().combat.as_ref().unwrap().frozen);
}

#[test]
fn test_fatigue_escalates_on_empty_deck() {
    let mut game = Game::new(catalog(), 42);
    game.begin();

    // Opening draws 1+2+3 plus the first turn's 4 for player one.
    assert_eq!(game.player(PlayerId::FIRST).hp, 30 - (1 + 2 + 3 + 4));
    assert_eq!(game.player(PlayerId::SECOND).hp, 30 - (1 + 2 + 3));
}

#[test]
fn test_gameplay_blocked_while_decision_outstanding() {
    let mut game = started_game(&["Vault Runner"; 10]);
    board_character(&mut game, PlayerId::SECOND, "Husk Brute");
    let hex = game.conjure(PlayerId::FIRST, "Rending Hex").unwrap().unwrap();
    game.set_player_geo(PlayerId::FIRST, 10);
    let hex_pos = game
        .player(PlayerId::FIRST)
        .hand
        .iter()
        .position(|id| *id == hex)
        .unwrap();

    game.play_spell(PlayerId::FIRST, hex_pos);
    assert!(matches!(
        game.player(PlayerId::FIRST).gate.state(),
        GateState::AwaitingTarget { .. }
    ));
    let _ = game.take_frames();

    // Gameplay from the owner is rejected while the request is open.
    let hand_before = game.player(PlayerId::FIRST).hand.len();
    game.handle_message(
        PlayerId::FIRST,
        "{\"type\":\"playCharacterCard\",\"position\":0,\"slotNumber\":0}",
    );
    assert_eq!(game.player(PlayerId::FIRST).hand.len(), hand_before);
    assert!(game.player(PlayerId::FIRST).no_characters());

    // Gameplay from the opponent is rejected too — even on their turn
    // it would be; here it is doubly dead.
    game.handle_message(PlayerId::SECOND, "{\"type\":\"endTurn\"}");
    assert_eq!(game.whose_turn, PlayerId::FIRST);

    // The owner's answer goes through.
    game.handle_message(
        PlayerId::FIRST,
        "{\"type\":\"targetChosen\",\"target\":{\"location\":\"enemySlots\",\"pos\":0}}",
    );
    assert_eq!(game.player(PlayerId::FIRST).gate.state(), GateState::Idle);
}

#[test]
fn test_win_ends_inbound_gameplay() {
    let mut game = started_game(&["Vault Runner"; 10]);

    game.damage_player(PlayerId::SECOND, None, 30);
    assert_eq!(game.winner, Some(PlayerId::FIRST));
    let _ = game.take_frames();

    let frames = game.handle_message(PlayerId::FIRST, "{\"type\":\"endTurn\"}");
    assert!(frames.is_empty());
    assert_eq!(game.whose_turn, PlayerId::FIRST);
}

#[test]
fn test_malformed_input_is_logged_and_dropped() {
    let mut game = started_game(&["Vault Runner"; 10]);
    let hand_before = game.player(PlayerId::FIRST).hand.len();

    assert!(game.handle_message(PlayerId::FIRST, "not json at all").is_empty());
    assert!(game
        .handle_message(PlayerId::FIRST, "{\"type\":\"unknownCommand\"}")
        .is_empty());

    assert_eq!(game.player(PlayerId::FIRST).hand.len(), hand_before);
}

#[test]
fn test_ping_short_circuits() {
    let mut game = started_game(&["Vault Runner"; 10]);
    assert!(game.handle_message(PlayerId::SECOND, "ping").is_empty());
    assert!(game.player(PlayerId::SECOND).pinged);
}

#[test]
fn test_full_state_frame_reissues_prompt() {
    let mut game = started_game(&["Vault Runner"; 10]);
    board_character(&mut game, PlayerId::SECOND, "Husk Brute");
    let hex = game.conjure(PlayerId::FIRST, "Rending Hex").unwrap().unwrap();
    game.set_player_geo(PlayerId::FIRST, 10);
    let hex_pos = game
        .player(PlayerId::FIRST)
        .hand
        .iter()
        .position(|id| *id == hex)
        .unwrap();
    game.play_spell(PlayerId::FIRST, hex_pos);

    let frame = game.full_state_frame(PlayerId::FIRST);
    assert!(frame
        .animation_list
        .iter()
        .any(|a| a.tag == AnimationTag::GetTargetCancellable));

    // The opponent's resync carries no prompt, but sees the board.
    let frame = game.full_state_frame(PlayerId::SECOND);
    assert!(!frame
        .animation_list
        .iter()
        .any(|a| a.tag == AnimationTag::GetTargetCancellable));
    assert!(frame
        .animation_list
        .iter()
        .any(|a| a.tag == AnimationTag::SummonCharacter));
}

#[test]
fn test_conjure_and_invoke() {
    let mut game = started_game(&["Vault Runner"; 10]);

    let conjured = game.conjure(PlayerId::FIRST, "Husk Brute").unwrap().unwrap();
    assert_eq!(game.card(conjured).unwrap().zone, Zone::Hand);
    assert_eq!(game.player(PlayerId::FIRST).hand.last(), Some(&conjured));

    // Invoke puts a character straight onto the board.
    let invoked = game
        .invoke_character(PlayerId::FIRST, "Husk Brute")
        .unwrap()
        .unwrap();
    assert_eq!(game.card(invoked).unwrap().zone, Zone::Board);

    // A spell cannot be invoked; an unknown name is an error.
    assert!(game.invoke_character(PlayerId::FIRST, "Rending Hex").unwrap().is_none());
    assert!(game.invoke_character(PlayerId::FIRST, "No Such Card").is_err());
}

#[test]
fn test_act_ability() {
    let mut registry = CardRegistry::new();
    registry.register(CardDefinition::character("Husk Brute", 2, 2, 3));
    registry.register(
        CardDefinition::character("Whetstone Keeper", 2, 1, 2)
            .with_act(1)
            .on_act(|game, _card, target| {
                if let Some(EntityRef::Card(id)) = target {
                    StatPipeline::apply_modifier(game, id, duelcore::StatDelta::attack(2));
                }
            }),
    );
    let mut game = Game::new(Rc::new(registry), 42);
    game.set_player_geo(PlayerId::FIRST, 5);

    let brute = game.create_card("Husk Brute", PlayerId::FIRST).unwrap();
    assert!(game.summon_character(PlayerId::FIRST, brute, None, false, None));
    let keeper = game.conjure(PlayerId::FIRST, "Whetstone Keeper").unwrap().unwrap();
    let keeper_pos = game
        .player(PlayerId::FIRST)
        .hand
        .iter()
        .position(|id| *id == keeper)
        .unwrap();

    game.character_acts(PlayerId::FIRST, keeper_pos, 0, true);

    assert_eq!(StatPipeline::outgoing_attack(&game, brute), Some(4));
    assert_eq!(game.player(PlayerId::FIRST).geo, 4);
    assert!(game.card(keeper).unwrap().acted);
    // Acting is once per card.
    game.character_acts(PlayerId::FIRST, keeper_pos, 0, true);
    assert_eq!(StatPipeline::outgoing_attack(&game, brute), Some(4));
}
