//! Card registry — the external, read-only catalog.
//!
//! The registry is a keyed table of static definitions. The engine loads
//! an entity's base layer from it once at construction and never writes
//! back. Catalog content (the actual card set) is supplied by the game
//! package around this crate.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::core::{EngineError, EngineResult, GameRng};

use super::definition::CardDefinition;

/// Keyed table of card definitions.
#[derive(Debug, Default)]
pub struct CardRegistry {
    defs: FxHashMap<String, Rc<CardDefinition>>,
}

impl CardRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its name. Replaces any previous
    /// definition with the same name.
    pub fn register(&mut self, def: CardDefinition) {
        self.defs.insert(def.name.clone(), Rc::new(def));
    }

    /// Look up a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<CardDefinition>> {
        self.defs.get(name).map(Rc::clone)
    }

    /// Look up a definition, erroring on a miss.
    pub fn require(&self, name: &str) -> EngineResult<Rc<CardDefinition>> {
        self.get(name)
            .ok_or_else(|| EngineError::UnknownCard(name.to_string()))
    }

    /// Whether a card name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<CardDefinition>> {
        self.defs.values()
    }

    /// Draw up to `amount` distinct card names matching a requirement,
    /// uniformly at random. Used by conjuring effects.
    pub fn random_cards(
        &self,
        rng: &mut GameRng,
        amount: usize,
        requirement: impl Fn(&CardDefinition) -> bool,
    ) -> Vec<String> {
        let mut candidates: Vec<&str> = self
            .defs
            .values()
            .filter(|def| requirement(def))
            .map(|def| def.name.as_str())
            .collect();
        // Hash-map order is arbitrary; sort before shuffling so the same
        // seed always yields the same picks.
        candidates.sort_unstable();
        rng.shuffle(&mut candidates);
        candidates
            .into_iter()
            .take(amount)
            .map(String::from)
            .collect()
    }
}
