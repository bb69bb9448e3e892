//! Stat snapshots for change diffing.
//!
//! After every stat mutation the pipeline recomputes the outgoing values
//! into a `StatSnapshot` and compares it against the card's cached one.
//! Only a difference in a tracked field produces a presentation update,
//! which keeps redundant update traffic off the wire.

use crate::cards::KeywordSet;

/// The tracked outgoing values of a card at one moment.
///
/// `attack` and `health` are `None` for spells, which only track costs
/// and keywords.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatSnapshot {
    /// Outgoing geo cost.
    pub geo_cost: i64,
    /// Outgoing soul cost, if the card has one.
    pub soul_cost: Option<i64>,
    /// Outgoing attack (characters only).
    pub attack: Option<i64>,
    /// Outgoing health after damage (characters only).
    pub health: Option<i64>,
    /// Outgoing keyword set.
    pub keywords: KeywordSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Keyword;

    #[test]
    fn test_snapshot_equality() {
        let a = StatSnapshot {
            geo_cost: 3,
            soul_cost: None,
            attack: Some(2),
            health: Some(5),
            keywords: [Keyword::Taunt].into_iter().collect(),
        };
        let mut b = a.clone();
        assert_eq!(a, b);

        b.health = Some(4);
        assert_ne!(a, b);
    }
}
