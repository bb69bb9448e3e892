//! Listener registry.
//!
//! Each card, each player, and the game itself owns one `EventBus`.
//! The bus stores listeners in registration order and never reorders
//! them; emission order is registration order, always.
//!
//! The bus itself does not invoke handlers. Emission lives on `Game`,
//! which snapshots the matching handlers from a bus and then runs or
//! defers them — that keeps handler invocation (which may mutate the
//! game, including this very bus) out of any iteration over bus storage.

use std::rc::Rc;

use crate::core::{EntityId, PlayerId};

use super::envelope::EventEnvelope;
use super::listener::{CollectHandler, Handler, Listener, ListenerId, NotifyHandler, TransformHandler};

/// Addresses one of the three bus tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusScope {
    /// A card's own bus.
    Card(EntityId),
    /// A player's bus.
    Player(PlayerId),
    /// The game-wide bus.
    Global,
}

/// A snapshot of one matching Notify listener, taken at emission time.
pub(crate) struct NotifyMatch {
    pub label: String,
    pub skip_stack: bool,
    pub handler: Rc<dyn NotifyHandler>,
}

/// Registry of listeners for one scope.
#[derive(Debug, Default)]
pub struct EventBus {
    entries: Vec<(ListenerId, Listener)>,
    next_id: u32,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, appending it after all existing ones.
    pub fn register(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId::new(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Remove a listener by its exact handle.
    pub fn unregister(&mut self, id: ListenerId) -> Option<Listener> {
        let index = self.entries.iter().position(|(lid, _)| *lid == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bus has no listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every listener owned by the given card. Returns how many
    /// were removed.
    pub fn remove_owned_by(&mut self, owner: EntityId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, l)| l.owner != Some(owner));
        before - self.entries.len()
    }

    /// Snapshot the Notify listeners matching an envelope, in
    /// registration order.
    pub(crate) fn notify_matches(&self, envelope: &EventEnvelope) -> Vec<NotifyMatch> {
        self.entries
            .iter()
            .filter(|(_, l)| l.filter.matches(envelope))
            .filter_map(|(_, l)| match &l.handler {
                Handler::Notify(h) => Some(NotifyMatch {
                    label: l.label.clone(),
                    skip_stack: l.skip_stack,
                    handler: Rc::clone(h),
                }),
                _ => None,
            })
            .collect()
    }

    /// Snapshot the Collect handlers matching an envelope.
    pub(crate) fn collect_matches(&self, envelope: &EventEnvelope) -> Vec<Rc<dyn CollectHandler>> {
        self.entries
            .iter()
            .filter(|(_, l)| l.filter.matches(envelope))
            .filter_map(|(_, l)| match &l.handler {
                Handler::Collect(h) => Some(Rc::clone(h)),
                _ => None,
            })
            .collect()
    }

    /// Snapshot the Transform handlers matching an envelope.
    pub(crate) fn transform_matches(
        &self,
        envelope: &EventEnvelope,
    ) -> Vec<Rc<dyn TransformHandler>> {
        self.entries
            .iter()
            .filter(|(_, l)| l.filter.matches(envelope))
            .filter_map(|(_, l)| match &l.handler {
                Handler::Transform(h) => Some(Rc::clone(h)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventFilter, EventName, EventValue, TransformFn};
    use crate::state::Game;

    fn noop_notify(label: &str, name: EventName) -> Listener {
        Listener::notify(
            label,
            EventFilter::Name(name),
            Rc::new(|_: &mut Game, _: &EventEnvelope| {}),
        )
    }

    #[test]
    fn test_register_and_unregister() {
        let mut bus = EventBus::new();
        let a = bus.register(noop_notify("a", EventName::AllyDied));
        let b = bus.register(noop_notify("b", EventName::AllyDied));

        assert_eq!(bus.len(), 2);
        assert_ne!(a, b);

        assert!(bus.unregister(a).is_some());
        assert_eq!(bus.len(), 1);
        // Second removal of the same handle is a no-op.
        assert!(bus.unregister(a).is_none());
    }

    #[test]
    fn test_match_order_is_registration_order() {
        let mut bus = EventBus::new();
        bus.register(noop_notify("first", EventName::AllyDied));
        bus.register(noop_notify("second", EventName::AllyDied));
        bus.register(noop_notify("other", EventName::SpellCast));
        bus.register(noop_notify("third", EventName::AllyDied));

        let envelope = EventEnvelope::new(EventName::AllyDied);
        let labels: Vec<_> = bus
            .notify_matches(&envelope)
            .into_iter()
            .map(|m| m.label)
            .collect();
        assert_eq!(labels, ["first", "second", "third"]);
    }

    #[test]
    fn test_kind_mismatch_is_skipped() {
        let mut bus = EventBus::new();
        bus.register(Listener::transform(
            "buff",
            EventFilter::Name(EventName::ModifyAttack),
            Rc::new(TransformFn(|_: &Game, _: &EventEnvelope| {
                Some(EventValue::Stat(9))
            })),
        ));

        // A Notify snapshot over the same envelope finds nothing.
        let envelope = EventEnvelope::transform(EventName::ModifyAttack, EventValue::Stat(1));
        assert!(bus.notify_matches(&envelope).is_empty());
        assert_eq!(bus.transform_matches(&envelope).len(), 1);
    }

    #[test]
    fn test_remove_owned_by() {
        let mut bus = EventBus::new();
        bus.register(noop_notify("keep", EventName::AllyDied));
        bus.register(noop_notify("drop", EventName::AllyDied).with_owner(EntityId::new(7)));
        bus.register(noop_notify("drop2", EventName::SpellCast).with_owner(EntityId::new(7)));

        assert_eq!(bus.remove_owned_by(EntityId::new(7)), 2);
        assert_eq!(bus.len(), 1);
    }
}
