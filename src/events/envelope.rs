//! Event envelopes.
//!
//! An `EventEnvelope` carries everything a listener may need: the event
//! name and kind, the entities and player involved, zone movement, a
//! numeric amount, and — for Transform events only — the threaded value.
//!
//! Envelopes use optional context fields with builder setters rather than
//! a payload enum per event; listeners read the fields they care about.

use crate::cards::KeywordSet;
use crate::core::{EntityId, EntityRef, PlayerId};
use crate::zones::Zone;

use super::name::{EventKind, EventName};

/// A value threaded through Transform events or returned from Collect
/// handlers. Exactly two kinds exist by design: a boolean gate and a
/// numeric stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventValue {
    /// A yes/no gate (playable, can-act).
    Gate(bool),
    /// A numeric stat (cost, attack, health, keyword bits).
    Stat(i64),
}

impl EventValue {
    /// The gate value, if this is one.
    #[must_use]
    pub fn as_gate(self) -> Option<bool> {
        match self {
            EventValue::Gate(b) => Some(b),
            EventValue::Stat(_) => None,
        }
    }

    /// The stat value, if this is one.
    #[must_use]
    pub fn as_stat(self) -> Option<i64> {
        match self {
            EventValue::Gate(_) => None,
            EventValue::Stat(n) => Some(n),
        }
    }

    /// Pack a keyword set into a stat value.
    #[must_use]
    pub fn from_keywords(keywords: KeywordSet) -> Self {
        EventValue::Stat(i64::from(keywords.bits()))
    }

    /// Unpack a keyword set from a stat value. Unknown bits are dropped.
    #[must_use]
    pub fn as_keywords(self) -> Option<KeywordSet> {
        self.as_stat().map(|n| KeywordSet::from_bits(n as u32))
    }
}

/// An event as delivered to listeners.
#[derive(Clone, Debug)]
pub struct EventEnvelope {
    /// Which event this is.
    pub name: EventName,

    /// Emission semantics, derived from the name.
    pub kind: EventKind,

    /// The card that caused the event, if any.
    pub source: Option<EntityId>,

    /// The card or avatar affected, if any.
    pub target: Option<EntityRef>,

    /// The player associated with the event, if any.
    pub player: Option<PlayerId>,

    /// Zone movement `(from, to)` for zone-change events.
    pub zones: Option<(Zone, Zone)>,

    /// Numeric amount (damage dealt, cards drawn), if any.
    pub amount: Option<i64>,

    /// The threaded value. Present only for Transform events.
    pub value: Option<EventValue>,
}

impl EventEnvelope {
    /// Create an envelope for a Notify or Collect event.
    #[must_use]
    pub fn new(name: EventName) -> Self {
        Self {
            name,
            kind: name.kind(),
            source: None,
            target: None,
            player: None,
            zones: None,
            amount: None,
            value: None,
        }
    }

    /// Create an envelope for a Transform event with its initial value.
    #[must_use]
    pub fn transform(name: EventName, initial: EventValue) -> Self {
        let mut envelope = Self::new(name);
        envelope.value = Some(initial);
        envelope
    }

    /// Set the source card (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the affected card or avatar (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: EntityRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the associated player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set zone movement (builder pattern).
    #[must_use]
    pub fn with_zones(mut self, from: Zone, to: Zone) -> Self {
        self.zones = Some((from, to));
        self
    }

    /// Set the numeric amount (builder pattern).
    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Keyword;

    #[test]
    fn test_envelope_builder() {
        let envelope = EventEnvelope::new(EventName::AllyDied)
            .with_source(EntityId::new(3))
            .with_player(PlayerId::FIRST)
            .with_amount(2);

        assert_eq!(envelope.kind, EventKind::Notify);
        assert_eq!(envelope.source, Some(EntityId::new(3)));
        assert_eq!(envelope.player, Some(PlayerId::FIRST));
        assert_eq!(envelope.amount, Some(2));
        assert!(envelope.value.is_none());
    }

    #[test]
    fn test_transform_carries_value() {
        let envelope = EventEnvelope::transform(EventName::ModifyAttack, EventValue::Stat(4));
        assert_eq!(envelope.kind, EventKind::Transform);
        assert_eq!(envelope.value, Some(EventValue::Stat(4)));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(EventValue::Gate(true).as_gate(), Some(true));
        assert_eq!(EventValue::Gate(true).as_stat(), None);
        assert_eq!(EventValue::Stat(7).as_stat(), Some(7));
    }

    #[test]
    fn test_keyword_round_trip() {
        let mut set = KeywordSet::new();
        set.insert(Keyword::Armor);
        set.insert(Keyword::Taunt);

        let value = EventValue::from_keywords(set);
        assert_eq!(value.as_keywords(), Some(set));
    }
}
