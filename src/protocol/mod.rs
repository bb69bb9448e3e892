//! Wire protocol: inbound commands, outbound animation frames, and the
//! card snapshot that crosses the serialization boundary.

mod animation;
mod commands;
mod dispatch;
mod view;

pub use animation::{Animation, AnimationTag, CardData, OutboundFrame};
pub use commands::{ClientCommand, SlotSpec};
pub use view::CardView;
