//! Event emission and stack pumping.
//!
//! Emission snapshots the matching listeners from the addressed bus
//! first, then runs or defers them — handlers may mutate the game,
//! including the bus being emitted on, without invalidating the loop.
//! Snapshot order is registration order; nothing is ever reordered.

use tracing::trace;

use crate::core::{EntityId, EntityRef, PlayerId};
use crate::events::{
    BusScope, EventBus, EventEnvelope, EventKind, EventName, EventValue, Listener, ListenerId,
};
use crate::stack::StackEntry;

use super::game::Game;

impl Game {
    fn bus(&self, scope: BusScope) -> Option<&EventBus> {
        match scope {
            BusScope::Card(id) => self.card(id).map(|card| &card.bus),
            BusScope::Player(player) => Some(&self.player(player).bus),
            BusScope::Global => Some(&self.global_bus),
        }
    }

    fn bus_mut(&mut self, scope: BusScope) -> Option<&mut EventBus> {
        match scope {
            BusScope::Card(id) => self.card_mut(id).map(|card| &mut card.bus),
            BusScope::Player(player) => Some(&mut self.player_mut(player).bus),
            BusScope::Global => Some(&mut self.global_bus),
        }
    }

    // === Registration ===

    /// Register a listener on a bus. Returns `None` only when the card
    /// scope no longer exists.
    pub fn register_listener(&mut self, scope: BusScope, listener: Listener) -> Option<ListenerId> {
        self.bus_mut(scope).map(|bus| bus.register(listener))
    }

    /// Register a listener on behalf of a card, recording the handle on
    /// the card so silencing can remove it later.
    pub fn register_card_listener(
        &mut self,
        owner: EntityId,
        scope: BusScope,
        listener: Listener,
    ) -> Option<ListenerId> {
        let id = self.register_listener(scope, listener.with_owner(owner))?;
        self.card_mut(owner)?.registrations.push((scope, id));
        Some(id)
    }

    /// Remove a listener by its exact handle.
    pub fn unregister_listener(&mut self, scope: BusScope, id: ListenerId) -> bool {
        self.bus_mut(scope)
            .and_then(|bus| bus.unregister(id))
            .is_some()
    }

    /// Silence a card: remove every listener it registered, wherever it
    /// registered them. Listeners other cards aimed at this card's bus
    /// survive.
    pub fn silence(&mut self, card: EntityId) {
        let registrations = match self.card_mut(card) {
            Some(card) => std::mem::take(&mut card.registrations),
            None => return,
        };
        for (scope, id) in registrations {
            self.unregister_listener(scope, id);
        }
    }

    // === Emission ===

    /// Emit a Notify event. Matching listeners are deferred through the
    /// action stack in registration order; `skip_stack` listeners run
    /// synchronously inside the loop, ahead of all deferred work. The
    /// stack is pumped once the loop finishes.
    pub fn emit_notify(&mut self, scope: BusScope, envelope: EventEnvelope) {
        debug_assert_eq!(envelope.kind, EventKind::Notify);

        let matches = match self.bus(scope) {
            Some(bus) => bus.notify_matches(&envelope),
            None => return,
        };

        for entry in matches {
            if entry.skip_stack {
                entry.handler.invoke(self, &envelope);
            } else {
                let handler = entry.handler;
                let deferred = envelope.clone();
                self.stack.push(StackEntry::new(
                    entry.label,
                    Box::new(move |game| handler.invoke(game, &deferred)),
                ));
            }
        }

        self.pump_stack();
    }

    /// Emit a Collect event: synchronously invoke every matching
    /// listener in order and gather the non-empty results.
    #[must_use]
    pub fn emit_collect(&self, scope: BusScope, envelope: &EventEnvelope) -> Vec<EventValue> {
        debug_assert_eq!(envelope.kind, EventKind::Collect);

        let handlers = match self.bus(scope) {
            Some(bus) => bus.collect_matches(envelope),
            None => return Vec::new(),
        };

        handlers
            .into_iter()
            .filter_map(|handler| handler.invoke(self, envelope))
            .collect()
    }

    /// Emit a Transform event against one bus, threading the envelope's
    /// value through matching listeners in registration order. A
    /// non-empty return replaces the value; the last one in sequence
    /// wins each step.
    pub fn emit_transform(&self, scope: BusScope, envelope: &mut EventEnvelope) {
        debug_assert_eq!(envelope.kind, EventKind::Transform);

        let handlers = match self.bus(scope) {
            Some(bus) => bus.transform_matches(envelope),
            None => return,
        };

        for handler in handlers {
            if let Some(value) = handler.invoke(self, envelope) {
                envelope.value = Some(value);
            }
        }
    }

    /// Fold a stat query for a card: its own bus first, then the global
    /// bus. The player bus never participates in transforms.
    #[must_use]
    pub fn transform_query(
        &self,
        card: EntityId,
        name: EventName,
        initial: EventValue,
    ) -> EventValue {
        let mut envelope = EventEnvelope::transform(name, initial)
            .with_source(card)
            .with_target(EntityRef::Card(card))
            .with_player(self.card(card).map(|c| c.owner).unwrap_or(PlayerId::FIRST));
        self.emit_transform(BusScope::Card(card), &mut envelope);
        self.emit_transform(BusScope::Global, &mut envelope);
        envelope.value.unwrap_or(initial)
    }

    // === Stack ===

    /// Append a deferred invocation and pump. The first call site to
    /// enqueue while the stack is idle becomes the pumper and drains
    /// synchronously before regaining control.
    pub fn schedule(
        &mut self,
        label: impl Into<String>,
        thunk: impl FnOnce(&mut Game) + 'static,
    ) {
        self.stack.push(StackEntry::new(label, Box::new(thunk)));
        self.pump_stack();
    }

    /// Drain the action stack in FIFO order until it is empty, closed,
    /// or someone above us is already draining. Entries enqueued while
    /// draining run after everything queued ahead of them.
    pub fn pump_stack(&mut self) {
        if self.pumping {
            return;
        }
        self.pumping = true;
        while let Some(entry) = self.stack.pop() {
            trace!(label = entry.label(), "stack pump");
            entry.run(self);
        }
        self.pumping = false;
    }

    /// Suspend stack draining. Enqueues still accumulate. Used around a
    /// card's primary effect so listeners it triggers cannot interrupt
    /// the script mid-run.
    pub fn close_stack(&mut self) {
        self.stack.close();
    }

    /// Resume stack draining and pump whatever accumulated.
    pub fn open_stack(&mut self) {
        self.stack.open();
        self.pump_stack();
    }

    /// Number of queued stack entries (diagnostics).
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }
}
