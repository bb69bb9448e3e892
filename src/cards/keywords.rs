//! Keywords and keyword sets.
//!
//! Keywords are the small fixed vocabulary of rules-text abilities the
//! engine itself interprets: `Armor` reduces every hit by one, `Taunt`
//! redirects enemy attacks, `Charge` ignores summoning sickness.
//!
//! `KeywordSet` is a bitset so a whole set fits in one stat value and can
//! ride a Transform event unchanged.

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A rules-text ability the engine interprets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// Every hit against this character deals 1 less damage.
    Armor,
    /// Enemy characters must attack this character.
    Taunt,
    /// Can attack the turn it is summoned.
    Charge,
}

impl Keyword {
    /// All keywords, in bit order.
    pub const ALL: [Keyword; 3] = [Keyword::Armor, Keyword::Taunt, Keyword::Charge];

    const fn bit(self) -> u32 {
        match self {
            Keyword::Armor => 1 << 0,
            Keyword::Taunt => 1 << 1,
            Keyword::Charge => 1 << 2,
        }
    }
}

/// A set of keywords, stored as a bitset.
///
/// Duplicates are impossible by construction, which is exactly the
/// deduplication the outgoing-keywords query needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeywordSet(u32);

impl KeywordSet {
    /// The empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Raw bits, for threading through a stat-valued event.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Rebuild from raw bits. Unknown bits are dropped.
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        let mask: u32 = Keyword::ALL.iter().map(|k| k.bit()).sum();
        Self(bits & mask)
    }

    /// Whether the set contains a keyword.
    #[must_use]
    pub const fn contains(self, keyword: Keyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    /// Add a keyword.
    pub fn insert(&mut self, keyword: Keyword) {
        self.0 |= keyword.bit();
    }

    /// Remove a keyword.
    pub fn remove(&mut self, keyword: Keyword) {
        self.0 &= !keyword.bit();
    }

    /// Union with another set.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of keywords in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate keywords in bit order.
    pub fn iter(self) -> impl Iterator<Item = Keyword> {
        Keyword::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<Keyword> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for keyword in iter {
            set.insert(keyword);
        }
        set
    }
}

// On the wire a keyword set is a plain list of keyword names.
impl Serialize for KeywordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for keyword in self.iter() {
            seq.serialize_element(&keyword)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for KeywordSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = KeywordSet;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a sequence of keywords")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<KeywordSet, A::Error> {
                let mut set = KeywordSet::new();
                while let Some(keyword) = seq.next_element::<Keyword>()? {
                    set.insert(keyword);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(SetVisitor)
    }
}
