//! Decision gate integration tests.
//!
//! Covers gate entry refusal on empty target sets, resolve and cancel
//! round-trips (including the hand restore), rejection of concurrent
//! requests, choices, and the forced-abandonment path.

use std::cell::RefCell;
use std::rc::Rc;

use duelcore::{
    AnimationTag, CardDefinition, CardRegistry, EntityId, EntityRef, GateState, Game, Keyword,
    PlayerId, StatPipeline, TargetRef, TargetRule, TargetSet, Zone,
};

fn catalog() -> Rc<CardRegistry> {
    let mut registry = CardRegistry::new();
    registry.register(CardDefinition::character("Husk Brute", 2, 2, 3));
    registry.register(
        CardDefinition::character("Shard Sentinel", 3, 2, 5).with_keyword(Keyword::Taunt),
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
    registry.register(CardDefinition::spell("Stone Ward", 1));
    Rc::new(registry)
}

fn test_game() -> Game {
    let mut game = Game::new(catalog(), 42);
    game.set_player_geo(PlayerId::FIRST, 10);
    game.set_player_geo(PlayerId::SECOND, 10);
    game
}

fn summon(game: &mut Game, player: PlayerId, name: &str) -> EntityId {
    let id = game.create_card(name, player).unwrap();
    assert!(game.summon_character(player, id, None, false, None));
    id
}

fn to_hand(game: &mut Game, player: PlayerId, name: &str) -> EntityId {
    game.conjure(player, name).unwrap().unwrap()
}

/// A removal spell with zero enemy characters on board is refused
/// outright: no gate transition, hand unchanged.
#[test]
fn test_empty_target_set_refuses_action() {
    let mut game = test_game();
    to_hand(&mut game, PlayerId::FIRST, "Rending Hex");

    game.play_spell(PlayerId::FIRST, 0);

    assert_eq!(game.player(PlayerId::FIRST).gate.state(), GateState::Idle);
    assert_eq!(game.player(PlayerId::FIRST).hand.len(), 1);
    assert_eq!(game.player(PlayerId::FIRST).geo, 10);
}

/// A targeted play suspends: the card leaves the hand, the gate waits,
/// and nothing is paid yet.
#[test]
fn test_targeted_play_suspends() {
    let mut game = test_game();
    summon(&mut game, PlayerId::SECOND, "Husk Brute");
    to_hand(&mut game, PlayerId::FIRST, "Rending Hex");

    game.play_spell(PlayerId::FIRST, 0);

    assert_eq!(
        game.player(PlayerId::FIRST).gate.state(),
        GateState::AwaitingTarget { cancellable: true }
    );
    assert!(game.player(PlayerId::FIRST).hand.is_empty());
    assert_eq!(game.player(PlayerId::FIRST).geo, 10);
}

/// Resolving with a legal target pays the cost, runs the effect, and
/// returns the gate to idle.
#[test]
fn test_resolve_target_runs_continuation() {
    let mut game = test_game();
    let victim = summon(&mut game, PlayerId::SECOND, "Husk Brute");
    let slot = game.card(victim).unwrap().slot.unwrap();
    to_hand(&mut game, PlayerId::FIRST, "Rending Hex");

    game.play_spell(PlayerId::FIRST, 0);
    assert!(game.resolve_target(PlayerId::FIRST, TargetRef::EnemySlot { pos: slot }));

    assert_eq!(game.player(PlayerId::FIRST).gate.state(), GateState::Idle);
    assert_eq!(game.player(PlayerId::FIRST).geo, 8);
    // 3 damage against 3 health.
    assert_eq!(game.card(victim).unwrap().zone, Zone::Death);
}

/// A pick outside the legal set is dropped without touching the gate.
#[test]
fn test_illegal_pick_is_dropped() {
    let mut game = test_game();
    summon(&mut game, PlayerId::SECOND, "Husk Brute");
    to_hand(&mut game, PlayerId::FIRST, "Rending Hex");

    game.play_spell(PlayerId::FIRST, 0);

    // Own avatar is not an enemy character.
    assert!(!game.resolve_target(
        PlayerId::FIRST,
        TargetRef::Player {
            player: PlayerId::FIRST
        }
    ));
    // Empty enemy slot is not a character either.
    assert!(!game.resolve_target(PlayerId::FIRST, TargetRef::EnemySlot { pos: 6 }));

    assert_eq!(
        game.player(PlayerId::FIRST).gate.state(),
        GateState::AwaitingTarget { cancellable: true }
    );
}

/// Cancelling reinserts the card at its original hand index, restores
/// the hand length, and emits exactly one hand-reinsert command.
#[test]
fn test_cancel_restores_hand_at_original_index() {
    let mut game = test_game();
    summon(&mut game, PlayerId::SECOND, "Husk Brute");

    to_hand(&mut game, PlayerId::FIRST, "Stone Ward");
    to_hand(&mut game, PlayerId::FIRST, "Husk Brute");
    let hex = to_hand(&mut game, PlayerId::FIRST, "Rending Hex");
    to_hand(&mut game, PlayerId::FIRST, "Stone Ward");

    game.play_spell(PlayerId::FIRST, 2);
    assert_eq!(game.player(PlayerId::FIRST).hand.len(), 3);

    // Drop the setup animations so the count below is exact.
    let _ = game.take_frames();

    assert!(game.cancel_target(PlayerId::FIRST));

    let hand = &game.player(PlayerId::FIRST).hand;
    assert_eq!(hand.len(), 4);
    assert_eq!(hand[2], hex);
    assert_eq!(game.player(PlayerId::FIRST).geo, 10);

    let reinserts = game
        .player(PlayerId::FIRST)
        .animations
        .iter()
        .filter(|a| a.tag == AnimationTag::AddCardHandPos)
        .count();
    assert_eq!(reinserts, 1);
}

/// A second action attempt while a request is outstanding is rejected,
/// never queued.
#[test]
fn test_second_action_rejected_while_awaiting() {
    let mut game = test_game();
    summon(&mut game, PlayerId::SECOND, "Husk Brute");
    to_hand(&mut game, PlayerId::FIRST, "Rending Hex");
    to_hand(&mut game, PlayerId::FIRST, "Rending Hex");

    game.play_spell(PlayerId::FIRST, 0);
    assert_eq!(game.player(PlayerId::FIRST).hand.len(), 1);

    // The second targeted play bounces off the busy gate; its card stays
    // in hand and the original request is untouched.
    game.play_spell(PlayerId::FIRST, 0);
    assert_eq!(game.player(PlayerId::FIRST).hand.len(), 1);
    assert_eq!(
        game.player(PlayerId::FIRST).gate.state(),
        GateState::AwaitingTarget { cancellable: true }
    );
}

/// Choice round-trip: out-of-bounds picks are dropped, a valid pick
/// resolves with its index and returns to idle.
#[test]
fn test_choice_flow() {
    let mut game = test_game();
    let picked = Rc::new(RefCell::new(None));

    let sink = Rc::clone(&picked);
    let entered = game.wait_for_choice(
        PlayerId::FIRST,
        vec!["Husk Brute".into(), "Stone Ward".into()],
        Box::new(move |_game, chosen| {
            *sink.borrow_mut() = Some(chosen);
        }),
    );
    assert!(entered);
    assert_eq!(
        game.player(PlayerId::FIRST).gate.state(),
        GateState::AwaitingChoice
    );

    assert!(!game.resolve_choice(PlayerId::FIRST, 5));
    assert_eq!(*picked.borrow(), None);

    assert!(game.resolve_choice(PlayerId::FIRST, 1));
    assert_eq!(*picked.borrow(), Some(1));
    assert_eq!(game.player(PlayerId::FIRST).gate.state(), GateState::Idle);
}

/// An empty offer is refused like an empty target set.
#[test]
fn test_empty_choice_refused() {
    let mut game = test_game();
    let entered = game.wait_for_choice(PlayerId::FIRST, Vec::new(), Box::new(|_, _| {}));
    assert!(!entered);
    assert_eq!(game.player(PlayerId::FIRST).gate.state(), GateState::Idle);
}

/// A second request while one is outstanding is refused with no state
/// change.
#[test]
fn test_concurrent_request_refused() {
    let mut game = test_game();
    assert!(game.wait_for_choice(
        PlayerId::FIRST,
        vec!["Husk Brute".into()],
        Box::new(|_, _| {}),
    ));
    assert!(!game.wait_for_choice(
        PlayerId::FIRST,
        vec!["Stone Ward".into()],
        Box::new(|_, _| {}),
    ));
    assert_eq!(
        game.player(PlayerId::FIRST).gate.state(),
        GateState::AwaitingChoice
    );
}

/// Forced abandonment of a cancellable request takes the cancel path
/// and restores the hand.
#[test]
fn test_abandon_cancellable_cancels() {
    let mut game = test_game();
    summon(&mut game, PlayerId::SECOND, "Husk Brute");
    let hex = to_hand(&mut game, PlayerId::FIRST, "Rending Hex");

    game.play_spell(PlayerId::FIRST, 0);
    assert!(game.abandon_decision(PlayerId::FIRST));

    assert_eq!(game.player(PlayerId::FIRST).gate.state(), GateState::Idle);
    assert_eq!(game.player(PlayerId::FIRST).hand, vec![hex]);
}

/// Forced abandonment of a non-cancellable target request resolves with
/// the first legal target.
#[test]
fn test_abandon_noncancellable_autoresolves() {
    let mut game = test_game();
    let victim = summon(&mut game, PlayerId::SECOND, "Husk Brute");
    let slot = game.card(victim).unwrap().slot.unwrap();

    let chosen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&chosen);
    assert!(game.wait_for_target(
        PlayerId::FIRST,
        TargetSet::single_enemy_slot(slot),
        Box::new(move |_game, target| {
            *sink.borrow_mut() = Some(target);
        }),
    ));

    assert!(game.abandon_decision(PlayerId::FIRST));
    assert_eq!(*chosen.borrow(), Some(EntityRef::Card(victim)));
    assert_eq!(game.player(PlayerId::FIRST).gate.state(), GateState::Idle);
}

/// Abandoning an idle gate is a no-op.
#[test]
fn test_abandon_idle_is_noop() {
    let mut game = test_game();
    assert!(!game.abandon_decision(PlayerId::FIRST));
}
