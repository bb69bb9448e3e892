//! Card definitions — static catalog data.
//!
//! A `CardDefinition` holds the unchanging properties of a card: costs,
//! keywords, rules text, archetype-specific stats, and optional lifecycle
//! hooks. Instance state (damage, zone, listeners) lives on
//! [`super::instance::Card`].
//!
//! Hooks are explicit optional slots, so "does this card have a play
//! effect" is a field check, not a runtime probe. The hook bodies
//! themselves — the per-card scripts — are supplied by the catalog and
//! opaque to the engine.

use std::rc::Rc;

use crate::core::{EntityId, EntityRef};
use crate::state::Game;
use crate::targeting::TargetRule;

use super::keywords::KeywordSet;

/// Hook invoked with the game and the card it belongs to.
pub type CardHook = Rc<dyn Fn(&mut Game, EntityId)>;

/// Hook invoked with an optional chosen target.
pub type TargetHook = Rc<dyn Fn(&mut Game, EntityId, Option<EntityRef>)>;

/// A spell's primary effect. Runs with the stack closed.
pub type SpellEffect = Rc<dyn Fn(&mut Game, EntityId, Option<EntityRef>)>;

/// The optional lifecycle hooks a card may carry.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    /// Scheduled on the action stack when the instance is constructed.
    pub on_created: Option<CardHook>,
    /// Runs when a character is played from hand.
    pub on_play: Option<TargetHook>,
    /// Runs when the card's act ability is used.
    pub on_act: Option<TargetHook>,
    /// Runs after a character finishes an attack.
    pub on_attack: Option<TargetHook>,
    /// Runs at the start of the owner's turn while on the board.
    pub on_turn_start: Option<CardHook>,
    /// Runs at the end of the owner's turn while on the board.
    pub on_turn_end: Option<CardHook>,
}

impl LifecycleHooks {
    /// No hooks at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("on_created", &self.on_created.is_some())
            .field("on_play", &self.on_play.is_some())
            .field("on_act", &self.on_act.is_some())
            .field("on_attack", &self.on_attack.is_some())
            .field("on_turn_start", &self.on_turn_start.is_some())
            .field("on_turn_end", &self.on_turn_end.is_some())
            .finish()
    }
}

/// A fragment of a card's rules text.
///
/// Dynamic fragments are evaluated at snapshot time; only the resulting
/// text crosses the serialization boundary.
#[derive(Clone)]
pub enum TextFragment {
    /// Fixed text.
    Literal(String),
    /// Text computed from live game state ("deals X damage").
    Dynamic(Rc<dyn Fn(&Game, EntityId) -> String>),
}

impl std::fmt::Debug for TextFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextFragment::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            TextFragment::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Card archetype, as visible to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Character,
    Spell,
}

/// Act ability: usable from hand on a board character, for a geo cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActSpec {
    /// Geo cost to act. Not subject to cost transforms.
    pub cost: i64,
}

/// Archetype-specific definition data.
#[derive(Clone)]
pub enum CardKind {
    /// A character with combat stats.
    Character {
        attack: i64,
        health: i64,
    },
    /// A spell with an optional primary effect.
    Spell {
        effect: Option<SpellEffect>,
    },
}

impl std::fmt::Debug for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardKind::Character { attack, health } => f
                .debug_struct("Character")
                .field("attack", attack)
                .field("health", health)
                .finish(),
            CardKind::Spell { effect } => f
                .debug_struct("Spell")
                .field("effect", &effect.is_some())
                .finish(),
        }
    }
}

/// Static definition of a card.
#[derive(Clone, Debug)]
pub struct CardDefinition {
    /// Card name; also the catalog key.
    pub name: String,

    /// Base geo cost.
    pub geo_cost: i64,

    /// Base soul cost, for cards that have one.
    pub soul_cost: Option<i64>,

    /// Base keywords.
    pub keywords: KeywordSet,

    /// Rules text fragments.
    pub text: Vec<TextFragment>,

    /// Play-time target requirement, if any.
    pub target_rule: Option<TargetRule>,

    /// Act ability, if any.
    pub act: Option<ActSpec>,

    /// Archetype-specific data.
    pub kind: CardKind,

    /// Optional lifecycle hooks.
    pub hooks: LifecycleHooks,
}

impl CardDefinition {
    /// Define a character.
    #[must_use]
    pub fn character(name: impl Into<String>, geo_cost: i64, attack: i64, health: i64) -> Self {
        Self {
            name: name.into(),
            geo_cost,
            soul_cost: None,
            keywords: KeywordSet::new(),
            text: Vec::new(),
            target_rule: None,
            act: None,
            kind: CardKind::Character { attack, health },
            hooks: LifecycleHooks::none(),
        }
    }

    /// Define a spell.
    #[must_use]
    pub fn spell(name: impl Into<String>, geo_cost: i64) -> Self {
        Self {
            name: name.into(),
            geo_cost,
            soul_cost: None,
            keywords: KeywordSet::new(),
            text: Vec::new(),
            target_rule: None,
            act: None,
            kind: CardKind::Spell { effect: None },
            hooks: LifecycleHooks::none(),
        }
    }

    /// Set a soul cost (builder pattern).
    #[must_use]
    pub fn with_soul_cost(mut self, cost: i64) -> Self {
        self.soul_cost = Some(cost);
        self
    }

    /// Add a base keyword (builder pattern).
    #[must_use]
    pub fn with_keyword(mut self, keyword: super::keywords::Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    /// Add a literal text fragment (builder pattern).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.push(TextFragment::Literal(text.into()));
        self
    }

    /// Add a dynamic text fragment (builder pattern).
    #[must_use]
    pub fn with_dynamic_text(
        mut self,
        eval: impl Fn(&Game, EntityId) -> String + 'static,
    ) -> Self {
        self.text.push(TextFragment::Dynamic(Rc::new(eval)));
        self
    }

    /// Require a play-time target (builder pattern).
    #[must_use]
    pub fn with_target_rule(mut self, rule: TargetRule) -> Self {
        self.target_rule = Some(rule);
        self
    }

    /// Give the card an act ability (builder pattern).
    #[must_use]
    pub fn with_act(mut self, cost: i64) -> Self {
        self.act = Some(ActSpec { cost });
        self
    }

    /// Set the spell's primary effect (builder pattern).
    ///
    /// Only meaningful for spells; ignored on characters.
    #[must_use]
    pub fn with_effect(
        mut self,
        effect: impl Fn(&mut Game, EntityId, Option<EntityRef>) + 'static,
    ) -> Self {
        if let CardKind::Spell { effect: slot } = &mut self.kind {
            *slot = Some(Rc::new(effect));
        }
        self
    }

    /// Set the creation hook (builder pattern).
    #[must_use]
    pub fn on_created(mut self, hook: impl Fn(&mut Game, EntityId) + 'static) -> Self {
        self.hooks.on_created = Some(Rc::new(hook));
        self
    }

    /// Set the play hook (builder pattern).
    #[must_use]
    pub fn on_play(
        mut self,
        hook: impl Fn(&mut Game, EntityId, Option<EntityRef>) + 'static,
    ) -> Self {
        self.hooks.on_play = Some(Rc::new(hook));
        self
    }

    /// Set the act hook (builder pattern).
    #[must_use]
    pub fn on_act(
        mut self,
        hook: impl Fn(&mut Game, EntityId, Option<EntityRef>) + 'static,
    ) -> Self {
        self.hooks.on_act = Some(Rc::new(hook));
        self
    }

    /// Set the after-attack hook (builder pattern).
    #[must_use]
    pub fn on_attack(
        mut self,
        hook: impl Fn(&mut Game, EntityId, Option<EntityRef>) + 'static,
    ) -> Self {
        self.hooks.on_attack = Some(Rc::new(hook));
        self
    }

    /// Set the turn-start hook (builder pattern).
    #[must_use]
    pub fn on_turn_start(mut self, hook: impl Fn(&mut Game, EntityId) + 'static) -> Self {
        self.hooks.on_turn_start = Some(Rc::new(hook));
        self
    }

    /// Set the turn-end hook (builder pattern).
    #[must_use]
    pub fn on_turn_end(mut self, hook: impl Fn(&mut Game, EntityId) + 'static) -> Self {
        self.hooks.on_turn_end = Some(Rc::new(hook));
        self
    }

    /// The card's archetype.
    #[must_use]
    pub fn archetype(&self) -> Archetype {
        match self.kind {
            CardKind::Character { .. } => Archetype::Character,
            CardKind::Spell { .. } => Archetype::Spell,
        }
    }

    /// Whether playing this card demands a target choice.
    #[must_use]
    pub fn requires_target(&self) -> bool {
        self.target_rule.is_some()
    }
}
