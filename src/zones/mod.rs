//! Card zones.
//!
//! A card is always in exactly one zone. Zone changes go through
//! `Game::set_zone` so that the `ZoneChanged` event fires; listeners that
//! track auras or play/death triggers key off that transition.

use serde::{Deserialize, Serialize};

/// Number of board slots per player.
pub const BOARD_SLOTS: usize = 7;

/// Maximum hand size; draws past this burn the card.
pub const HAND_LIMIT: usize = 10;

/// Where a card currently lives.
///
/// `Void` is the limbo zone for cards that are nowhere visible: freshly
/// constructed instances, spells mid-cast. `Death` is terminal for
/// characters; a card enters it at most once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    #[default]
    Void,
    Deck,
    Hand,
    Board,
    Death,
}
