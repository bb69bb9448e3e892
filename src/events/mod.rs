//! Event system: names, envelopes, listeners, and the per-scope bus.
//!
//! Three emission modes exist, each with its own fold rule:
//!
//! - **Notify** — fire-and-forget; handler invocations are deferred
//!   through the action stack in registration order unless the listener
//!   is marked `skip_stack`.
//! - **Collect** — synchronous; non-empty results are gathered into an
//!   ordered sequence.
//! - **Transform** — synchronous left-fold; each handler may replace the
//!   threaded value, and the last non-empty return in sequence wins.
//!
//! Emission itself lives on [`crate::state::Game`], which owns all three
//! bus tiers (card, player, game).

mod bus;
mod envelope;
mod listener;
mod name;

pub use bus::{BusScope, EventBus};
pub use envelope::{EventEnvelope, EventValue};
pub use listener::{
    CollectHandler, EventFilter, Handler, Listener, ListenerId, NotifyHandler, TransformFn,
    TransformHandler,
};
pub use name::{EventKind, EventName};
