//! The authoritative game aggregate.
//!
//! `Game` owns everything: the entity table, both players, the global
//! bus, the action stack, and the RNG. All gameplay operations are
//! methods here (or in sibling impl blocks), taking ids rather than
//! references, so the borrow story stays simple: look up, mutate,
//! release.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::{json, Value};

use crate::cards::{Card, CardRegistry};
use crate::core::{EngineResult, EntityId, GameRng, PlayerId};
use crate::events::{BusScope, EventBus, EventEnvelope, EventFilter, EventName, Listener, NotifyHandler};
use crate::protocol::{Animation, AnimationTag};
use crate::stack::ActionStack;
use crate::zones::Zone;

use super::player::Player;

/// Built-in player rule: +1 soul whenever an ally dies or an ally
/// declares an attack. Registered on each player's bus at game setup.
struct SoulSurge {
    player: PlayerId,
}

impl NotifyHandler for SoulSurge {
    fn invoke(&self, game: &mut Game, _envelope: &EventEnvelope) {
        let soul = game.player(self.player).soul;
        game.set_player_soul(self.player, soul + 1);
    }
}

/// Complete authoritative state of one duel.
#[derive(Debug)]
pub struct Game {
    catalog: Rc<CardRegistry>,
    entities: FxHashMap<EntityId, Card>,
    next_entity: u32,
    players: [Player; 2],

    /// Game-scope event bus.
    pub(crate) global_bus: EventBus,
    pub(crate) stack: ActionStack,
    pub(crate) pumping: bool,

    pub(crate) rng: GameRng,

    /// Whose turn it is.
    pub whose_turn: PlayerId,

    /// Set once both decks are loaded and opening hands drawn.
    pub started: bool,

    /// The winner, once decided. Ends inbound gameplay.
    pub winner: Option<PlayerId>,
}

impl Game {
    /// Create a game against a catalog, with a seed for in-game
    /// randomness. Decks are loaded separately; see
    /// [`Game::load_deck`] and [`Game::begin`].
    #[must_use]
    pub fn new(catalog: Rc<CardRegistry>, seed: u64) -> Self {
        let mut game = Self {
            catalog,
            entities: FxHashMap::default(),
            next_entity: 1,
            players: [
                Player::new(PlayerId::FIRST, "Player 1"),
                Player::new(PlayerId::SECOND, "Player 2"),
            ],
            global_bus: EventBus::new(),
            stack: ActionStack::new(),
            pumping: false,
            rng: GameRng::new(seed),
            whose_turn: PlayerId::FIRST,
            started: false,
            winner: None,
        };

        for player in PlayerId::both() {
            game.players[player.index()].bus.register(Listener::notify(
                "PlayerSoulSurge",
                EventFilter::AnyOf(vec![EventName::AllyDied, EventName::AllyToAttack]),
                Rc::new(SoulSurge { player }),
            ));
        }

        game
    }

    /// The card catalog.
    #[must_use]
    pub fn catalog(&self) -> &CardRegistry {
        &self.catalog
    }

    /// The game RNG, for scripted random effects.
    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    /// Set a player's display name.
    pub fn set_player_name(&mut self, player: PlayerId, name: impl Into<String>) {
        self.players[player.index()].name = name.into();
    }

    // === Accessors ===

    /// A player's state.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> &Player {
        &self.players[player.index()]
    }

    /// A player's state, mutably.
    pub fn player_mut(&mut self, player: PlayerId) -> &mut Player {
        &mut self.players[player.index()]
    }

    /// A card instance.
    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&Card> {
        self.entities.get(&id)
    }

    /// A card instance, mutably.
    pub fn card_mut(&mut self, id: EntityId) -> Option<&mut Card> {
        self.entities.get_mut(&id)
    }

    // === Entity management ===

    /// Construct a card instance from the catalog. The instance starts
    /// in the void zone; its creation hook, if any, is scheduled on the
    /// action stack.
    pub fn create_card(&mut self, name: &str, owner: PlayerId) -> EngineResult<EntityId> {
        let def = self.catalog.require(name)?;

        let id = EntityId::new(self.next_entity);
        self.next_entity += 1;
        self.entities
            .insert(id, Card::from_definition(id, Rc::clone(&def), owner));

        if let Some(hook) = def.hooks.on_created.clone() {
            let label = format!("OnCardCreated:{}", def.name);
            self.schedule(label, move |game| hook(game, id));
        }

        Ok(id)
    }

    /// Move a card between zones, emitting the zone-change event on the
    /// card's bus.
    pub fn set_zone(&mut self, id: EntityId, zone: Zone) {
        let Some(card) = self.card_mut(id) else { return };
        let prev = card.zone;
        card.zone = zone;

        self.emit_notify(
            BusScope::Card(id),
            EventEnvelope::new(EventName::ZoneChanged)
                .with_source(id)
                .with_zones(prev, zone),
        );
    }

    // === Resources ===
    //
    // Every resource mutator schedules the matching presentation update
    // for both players; nothing changes silently.

    /// Set a player's geo.
    pub fn set_player_geo(&mut self, player: PlayerId, value: i64) {
        self.players[player.index()].geo = value;
        self.push_animation(
            player,
            AnimationTag::UpdateAllyGeo,
            json!({ "value": value }),
            0,
        );
        self.push_animation(
            player.opponent(),
            AnimationTag::UpdateEnemyGeo,
            json!({ "value": value }),
            0,
        );
    }

    /// Add to a player's geo (negative to spend).
    pub fn add_player_geo(&mut self, player: PlayerId, delta: i64) {
        let value = self.player(player).geo + delta;
        self.set_player_geo(player, value);
    }

    /// Set a player's soul.
    pub fn set_player_soul(&mut self, player: PlayerId, value: i64) {
        self.players[player.index()].soul = value;
        self.push_animation(
            player,
            AnimationTag::UpdateAllySoul,
            json!({ "value": value }),
            0,
        );
        self.push_animation(
            player.opponent(),
            AnimationTag::UpdateEnemySoul,
            json!({ "value": value }),
            0,
        );
    }

    /// Add to a player's soul (negative to spend).
    pub fn add_player_soul(&mut self, player: PlayerId, delta: i64) {
        let value = self.player(player).soul + delta;
        self.set_player_soul(player, value);
    }

    /// Set a player's avatar health.
    pub fn set_player_hp(&mut self, player: PlayerId, value: i64) {
        let hp_max = self.player(player).hp_max;
        self.players[player.index()].hp = value;
        let display = format!("{}/{}", value, hp_max);
        self.push_animation(
            player,
            AnimationTag::UpdateAllyHealth,
            json!({ "value": display, "amount": value }),
            0,
        );
        self.push_animation(
            player.opponent(),
            AnimationTag::UpdateEnemyHealth,
            json!({ "value": display, "amount": value }),
            0,
        );
    }

    /// Damage a player's avatar. Lethal damage decides the game.
    pub fn damage_player(&mut self, player: PlayerId, _source: Option<EntityId>, amount: i64) {
        if amount <= 0 {
            return;
        }
        let hp = self.player(player).hp - amount;
        self.set_player_hp(player, hp);
        if hp <= 0 {
            self.win(player.opponent());
        }
    }

    /// Decide the game. Later calls are no-ops; the first winner stands.
    pub fn win(&mut self, player: PlayerId) {
        if self.winner.is_some() {
            return;
        }
        self.winner = Some(player);
        for p in PlayerId::both() {
            self.push_animation(
                p,
                AnimationTag::GameEnd,
                json!({ "winner": player.0 }),
                0,
            );
        }
    }

    // === Animations ===

    /// Queue an animation for one player.
    pub fn push_animation(&mut self, player: PlayerId, tag: AnimationTag, data: Value, time: u64) {
        self.players[player.index()].push_animation(Animation::new(tag, data, time));
    }

    /// Queue an animation for both players. If the payload carries an
    /// `ally` flag, it is flipped for the opponent's copy.
    pub fn push_dual_animation(
        &mut self,
        player: PlayerId,
        tag: AnimationTag,
        data: Value,
        time: u64,
    ) {
        let mut flipped = data.clone();
        if let Some(ally) = flipped.get("ally").and_then(Value::as_bool) {
            flipped["ally"] = Value::Bool(!ally);
        }
        self.push_animation(player, tag, data, time);
        self.push_animation(player.opponent(), tag, flipped, time);
    }

    /// Queue the full resource/name refresh for one player's view.
    pub fn push_data_animations(&mut self, player: PlayerId) {
        let me = self.player(player);
        let opp = self.player(player.opponent());
        let rows: Vec<(AnimationTag, Value)> = vec![
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
            self.push_animation(player, tag, data, 0);
        }
    }
}
