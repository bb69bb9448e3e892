//! Player identification.
//!
//! The duel is strictly two-player: `PlayerId(0)` and `PlayerId(1)`.
//! Most code never spells the indices out; it asks for `opponent()`.

use serde::{Deserialize, Serialize};

/// Player identifier for a two-player duel.
///
/// Indices are 0-based; the only valid values are 0 and 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The player who goes first.
    pub const FIRST: PlayerId = PlayerId(0);

    /// The player who goes second.
    pub const SECOND: PlayerId = PlayerId(1);

    /// Create a new player ID. Only 0 and 1 are meaningful.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Both players, in seat order.
    #[must_use]
    pub const fn both() -> [PlayerId; 2] {
        [PlayerId::FIRST, PlayerId::SECOND]
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(PlayerId::FIRST.opponent(), PlayerId::SECOND);
        assert_eq!(PlayerId::SECOND.opponent(), PlayerId::FIRST);
        assert_eq!(PlayerId::FIRST.opponent().opponent(), PlayerId::FIRST);
    }

    #[test]
    fn test_both() {
        let [a, b] = PlayerId::both();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }
}
