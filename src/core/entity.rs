//! Entity identifiers.
//!
//! Every card instance in a game gets a unique `EntityId` at construction.
//! Ids are never reused within a game, so references held by listeners,
//! kill credits, and animation payloads stay unambiguous even after the
//! entity leaves play.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Unique identifier for a card instance within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A reference to something that can be damaged, healed, or targeted:
/// either a card instance or a player avatar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// A card instance on the board or in a hand.
    Card(EntityId),
    /// A player's avatar.
    Player(PlayerId),
}

impl EntityRef {
    /// The card instance, if this references one.
    #[must_use]
    pub fn card(self) -> Option<EntityId> {
        match self {
            EntityRef::Card(id) => Some(id),
            EntityRef::Player(_) => None,
        }
    }

    /// The player, if this references an avatar.
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            EntityRef::Card(_) => None,
            EntityRef::Player(p) => Some(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id() {
        let id = EntityId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "Entity(5)");
    }

    #[test]
    fn test_entity_ref_accessors() {
        let card = EntityRef::Card(EntityId::new(3));
        assert_eq!(card.card(), Some(EntityId::new(3)));
        assert_eq!(card.player(), None);

        let avatar = EntityRef::Player(PlayerId::new(1));
        assert_eq!(avatar.card(), None);
        assert_eq!(avatar.player(), Some(PlayerId::new(1)));
    }
}
