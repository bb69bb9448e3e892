//! Listeners and their handlers.
//!
//! A listener is an explicit record: a debug label, the owning card (if
//! any), an event filter, the skip-stack flag, and the handler. Handlers
//! are trait objects whose captured state lives in named struct fields —
//! engine-internal rules like the soul-gain listener are concrete types,
//! not anonymous closures. Blanket impls let plain functions serve as
//! handlers at the seams (tests, external card scripts).

use std::rc::Rc;

use crate::core::EntityId;
use crate::state::Game;

use super::envelope::{EventEnvelope, EventValue};
use super::name::EventName;

/// Handle returned by listener registration. Removal requires the exact
/// handle; listeners are never looked up by label or shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

impl ListenerId {
    /// Create a new listener ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Which events a listener receives.
///
/// Filters are data, not predicates over code: the match depends only on
/// the event name, so buses can report their interests without running
/// handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventFilter {
    /// Match a single event.
    Name(EventName),
    /// Match any of the listed events.
    AnyOf(Vec<EventName>),
}

impl EventFilter {
    /// Does this filter accept the envelope?
    #[must_use]
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        match self {
            EventFilter::Name(name) => *name == envelope.name,
            EventFilter::AnyOf(names) => names.contains(&envelope.name),
        }
    }
}

/// Handler for Notify events. Invocations mutate game state and are
/// normally deferred through the action stack.
pub trait NotifyHandler {
    fn invoke(&self, game: &mut Game, envelope: &EventEnvelope);
}

impl<F> NotifyHandler for F
where
    F: Fn(&mut Game, &EventEnvelope),
{
    fn invoke(&self, game: &mut Game, envelope: &EventEnvelope) {
        self(game, envelope);
    }
}

/// Handler for Collect events. Pure; a `None` return contributes nothing.
pub trait CollectHandler {
    fn invoke(&self, game: &Game, envelope: &EventEnvelope) -> Option<EventValue>;
}

impl<F> CollectHandler for F
where
    F: Fn(&Game, &EventEnvelope) -> Option<EventValue>,
{
    fn invoke(&self, game: &Game, envelope: &EventEnvelope) -> Option<EventValue> {
        self(game, envelope)
    }
}

/// Handler for Transform events. Reads the current value from
/// `envelope.value`; returning `Some` replaces it, `None` leaves it.
pub trait TransformHandler {
    fn invoke(&self, game: &Game, envelope: &EventEnvelope) -> Option<EventValue>;
}

/// Adapter so plain functions can act as Transform handlers.
///
/// A separate wrapper (rather than a second blanket impl) keeps closure
/// handlers unambiguous between Collect and Transform, which share a
/// signature.
pub struct TransformFn<F>(pub F);

impl<F> TransformHandler for TransformFn<F>
where
    F: Fn(&Game, &EventEnvelope) -> Option<EventValue>,
{
    fn invoke(&self, game: &Game, envelope: &EventEnvelope) -> Option<EventValue> {
        (self.0)(game, envelope)
    }
}

/// A listener's handler, tagged by the event kind it serves.
///
/// Emissions only consider handlers of the matching kind; a Notify
/// emission never invokes a Transform handler even if the filter matches.
#[derive(Clone)]
pub enum Handler {
    Notify(Rc<dyn NotifyHandler>),
    Collect(Rc<dyn CollectHandler>),
    Transform(Rc<dyn TransformHandler>),
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Notify(_) => write!(f, "Handler::Notify"),
            Handler::Collect(_) => write!(f, "Handler::Collect"),
            Handler::Transform(_) => write!(f, "Handler::Transform"),
        }
    }
}

/// A registered listener record.
#[derive(Clone, Debug)]
pub struct Listener {
    /// Debug label; also labels deferred stack entries.
    pub label: String,

    /// The card that registered this listener, if any. Silencing a card
    /// removes every listener it owns, wherever registered.
    pub owner: Option<EntityId>,

    /// Which events to receive.
    pub filter: EventFilter,

    /// Run synchronously during the emission loop instead of deferring
    /// through the action stack. For listeners that must observe state
    /// ahead of reactive effects (aura trackers).
    pub skip_stack: bool,

    /// What to do when an event matches.
    pub handler: Handler,
}

impl Listener {
    /// Create a Notify listener.
    #[must_use]
    pub fn notify(
        label: impl Into<String>,
        filter: EventFilter,
        handler: Rc<dyn NotifyHandler>,
    ) -> Self {
        Self {
            label: label.into(),
            owner: None,
            filter,
            skip_stack: false,
            handler: Handler::Notify(handler),
        }
    }

    /// Create a Collect listener.
    #[must_use]
    pub fn collect(
        label: impl Into<String>,
        filter: EventFilter,
        handler: Rc<dyn CollectHandler>,
    ) -> Self {
        Self {
            label: label.into(),
            owner: None,
            filter,
            skip_stack: false,
            handler: Handler::Collect(handler),
        }
    }

    /// Create a Transform listener.
    #[must_use]
    pub fn transform(
        label: impl Into<String>,
        filter: EventFilter,
        handler: Rc<dyn TransformHandler>,
    ) -> Self {
        Self {
            label: label.into(),
            owner: None,
            filter,
            skip_stack: false,
            handler: Handler::Transform(handler),
        }
    }

    /// Set the owning card (builder pattern).
    #[must_use]
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Run synchronously during emission (builder pattern).
    #[must_use]
    pub fn with_skip_stack(mut self) -> Self {
        self.skip_stack = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_name() {
        let filter = EventFilter::Name(EventName::AllyDied);
        assert!(filter.matches(&EventEnvelope::new(EventName::AllyDied)));
        assert!(!filter.matches(&EventEnvelope::new(EventName::AllyAttacked)));
    }

    #[test]
    fn test_filter_any_of() {
        let filter = EventFilter::AnyOf(vec![EventName::AllyDied, EventName::AllyToAttack]);
        assert!(filter.matches(&EventEnvelope::new(EventName::AllyDied)));
        assert!(filter.matches(&EventEnvelope::new(EventName::AllyToAttack)));
        assert!(!filter.matches(&EventEnvelope::new(EventName::SpellCast)));
    }

    #[test]
    fn test_listener_builder() {
        let listener = Listener::notify(
            "test",
            EventFilter::Name(EventName::AllyDied),
            Rc::new(|_: &mut Game, _: &EventEnvelope| {}),
        )
        .with_owner(EntityId::new(4))
        .with_skip_stack();

        assert_eq!(listener.label, "test");
        assert_eq!(listener.owner, Some(EntityId::new(4)));
        assert!(listener.skip_stack);
        assert!(matches!(listener.handler, Handler::Notify(_)));
    }
}
