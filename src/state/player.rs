//! Per-player state.
//!
//! A player owns exactly the mutable state the opponent may only read:
//! resources, hand, deck, board slots — plus a bus (player scope), the
//! decision gate, and the pending animation batch for their connection.

use serde_json::{json, Value};

use crate::core::{EntityId, PlayerId};
use crate::decision::DecisionGate;
use crate::events::EventBus;
use crate::protocol::{Animation, AnimationTag};
use crate::zones::BOARD_SLOTS;

/// One player's authoritative state.
#[derive(Debug)]
pub struct Player {
    /// Seat id.
    pub id: PlayerId,

    /// Display name.
    pub name: String,

    /// Avatar health.
    pub hp: i64,

    /// Avatar maximum health.
    pub hp_max: i64,

    /// Geo, the per-turn resource.
    pub geo: i64,

    /// Geo granted at the next turn start; ramps up to 10.
    pub geo_next: i64,

    /// Soul, the slow resource earned from deaths and attacks.
    pub soul: i64,

    /// Damage the next empty-deck draw deals; escalates.
    pub fatigue_next: i64,

    /// Remaining deck, top first.
    pub deck: Vec<EntityId>,

    /// Cards in hand, in display order.
    pub hand: Vec<EntityId>,

    /// Board slots.
    pub slots: [Option<EntityId>; BOARD_SLOTS],

    /// Player-scope event bus.
    pub bus: EventBus,

    /// Suspend/resume register for target and choice requests.
    pub gate: DecisionGate,

    /// Outbound animation batch; drained at flush.
    pub animations: Vec<Animation>,

    /// Saw a session ping since the last liveness check.
    pub pinged: bool,
}

impl Player {
    /// Create a player with starting resources.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        let mut player = Self {
            id,
            name: name.into(),
            hp: 30,
            hp_max: 30,
            geo: 0,
            geo_next: 1,
            soul: 0,
            fatigue_next: 1,
            deck: Vec::new(),
            hand: Vec::new(),
            slots: [None; BOARD_SLOTS],
            bus: EventBus::new(),
            gate: DecisionGate::new(),
            animations: Vec::new(),
            pinged: false,
        };
        player.push_animation(Animation::new(
            AnimationTag::SetId,
            json!({ "id": id.0 }),
            0,
        ));
        player
    }

    /// Whether any board slot is free.
    #[must_use]
    pub fn has_empty_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// The first free board slot, if any.
    #[must_use]
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Whether the board is completely empty.
    #[must_use]
    pub fn no_characters(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Append an animation to the batch.
    ///
    /// Consecutive death animations collapse into one multi-death
    /// command (looking back across interleaved card-data updates), so a
    /// board wipe plays as a single simultaneous animation instead of a
    /// ripple.
    pub fn push_animation(&mut self, animation: Animation) {
        if animation.tag != AnimationTag::AwaitDeath {
            self.animations.push(animation);
            return;
        }

        let mut i = self.animations.len();
        while i > 0 {
            i -= 1;
            match self.animations[i].tag {
                AnimationTag::AwaitDeath => {
                    let mut prev = self.animations.remove(i);
                    let merged = json!({
                        "allyList": [prev.data.get("ally"), animation.data.get("ally")],
                        "slotList": [prev.data.get("slot"), animation.data.get("slot")],
                    });
                    prev.tag = AnimationTag::MultiAwaitDeath;
                    prev.data = merged;
                    self.animations.push(prev);
                    return;
                }
                AnimationTag::MultiAwaitDeath => {
                    let mut prev = self.animations.remove(i);
                    push_onto(&mut prev.data, "allyList", animation.data.get("ally"));
                    push_onto(&mut prev.data, "slotList", animation.data.get("slot"));
                    self.animations.push(prev);
                    return;
                }
                AnimationTag::UpdateBoardCardData | AnimationTag::UpdateHandCardData => {}
                _ => break,
            }
        }

        self.animations.push(animation);
    }
}

fn push_onto(data: &mut Value, key: &str, item: Option<&Value>) {
    if let Some(list) = data.get_mut(key).and_then(Value::as_array_mut) {
        list.push(item.cloned().unwrap_or(Value::Null));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn await_death(ally: bool, slot: usize) -> Animation {
        Animation::new(
            AnimationTag::AwaitDeath,
            json!({ "ally": ally, "slot": slot }),
            300,
        )
    }

    #[test]
    fn test_slots_helpers() {
        let mut player = Player::new(PlayerId::FIRST, "Quirrel");
        assert!(player.has_empty_slot());
        assert!(player.no_characters());
        assert_eq!(player.first_empty_slot(), Some(0));

        player.slots[0] = Some(EntityId::new(1));
        assert!(!player.no_characters());
        assert_eq!(player.first_empty_slot(), Some(1));
    }

    #[test]
    fn test_death_animations_merge() {
        let mut player = Player::new(PlayerId::FIRST, "Quirrel");
        player.animations.clear();

        player.push_animation(await_death(true, 2));
        player.push_animation(Animation::new(
            AnimationTag::UpdateBoardCardData,
            json!({ "ally": true, "slot": 3 }),
            0,
        ));
        player.push_animation(await_death(true, 3));

        // One update + one merged multi-death, moved to the end.
        assert_eq!(player.animations.len(), 2);
        let last = player.animations.last().unwrap();
        assert_eq!(last.tag, AnimationTag::MultiAwaitDeath);
        assert_eq!(last.data["slotList"], json!([2, 3]));
    }

    #[test]
    fn test_death_animation_does_not_merge_across_other_commands() {
        let mut player = Player::new(PlayerId::FIRST, "Quirrel");
        player.animations.clear();

        player.push_animation(await_death(true, 1));
        player.push_animation(Animation::new(AnimationTag::Wait, json!({}), 400));
        player.push_animation(await_death(true, 4));

        assert_eq!(player.animations.len(), 3);
        assert_eq!(player.animations[0].tag, AnimationTag::AwaitDeath);
        assert_eq!(player.animations[2].tag, AnimationTag::AwaitDeath);
    }
}
