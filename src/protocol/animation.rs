//! Outbound animation commands.
//!
//! The presentation channel receives an ordered list of discriminated
//! animation commands: a tag, a JSON payload, and a display-duration
//! hint in milliseconds. Commands accumulate per player and flush as one
//! frame after each externally triggered action fully resolves.

use serde::Serialize;
use serde_json::Value;

use super::view::CardView;

/// Tag of an outbound animation command.
///
/// A closed enum: the client vocabulary is fixed, and a typo'd tag is a
/// compile error rather than a dead command on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationTag {
    #[serde(rename = "setID")]
    SetId,
    UpdateAllyGeo,
    UpdateEnemyGeo,
    UpdateAllySoul,
    UpdateEnemySoul,
    UpdateAllyHealth,
    UpdateEnemyHealth,
    UpdateAllyCards,
    UpdateEnemyCards,
    UpdateAllyName,
    UpdateEnemyName,
    AddCardHand,
    AddCardHandPos,
    RemoveCardHand,
    BurnCard,
    ClearBurntCard,
    SummonCharacter,
    UpdateBoardCardData,
    UpdateHandCardData,
    AwaitDeath,
    MultiAwaitDeath,
    DisplayAttackOverlay,
    HideAttackOverlay,
    DisplayDefendOverlay,
    HideDefendOverlay,
    DisplayAvatarAttacked,
    HideAvatarAttacked,
    Wait,
    BeginTurn,
    EndTurn,
    GetTargetCancellable,
    GetTargetNotCancellable,
    GetChoose,
    ClearTargetSelection,
    ClearChooseCardSelection,
    ShowTargeted,
    TriggerEffect,
    GameEnd,
}

/// One animation command.
#[derive(Clone, Debug, Serialize)]
pub struct Animation {
    /// Discriminator tag.
    #[serde(rename = "type")]
    pub tag: AnimationTag,
    /// Command payload.
    pub data: Value,
    /// Display-duration hint in milliseconds.
    pub time: u64,
}

impl Animation {
    /// Create an animation command.
    #[must_use]
    pub fn new(tag: AnimationTag, data: Value, time: u64) -> Self {
        Self { tag, data, time }
    }
}

/// The card data mirrored alongside every flushed frame.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    /// The receiving player's board.
    pub ally_slots: Vec<Option<CardView>>,
    /// The opponent's board.
    pub enemy_slots: Vec<Option<CardView>>,
    /// The receiving player's hand.
    pub hand: Vec<CardView>,
}

/// A flushed outbound frame: the batched animations plus current card
/// data for the receiving player.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame {
    /// Ordered animation commands.
    pub animation_list: Vec<Animation>,
    /// Snapshot card data.
    pub card_data: CardData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_wire_names() {
        assert_eq!(
            serde_json::to_string(&AnimationTag::SetId).unwrap(),
            "\"setID\""
        );
        assert_eq!(
            serde_json::to_string(&AnimationTag::UpdateBoardCardData).unwrap(),
            "\"updateBoardCardData\""
        );
    }

    #[test]
    fn test_animation_serialization() {
        let animation = Animation::new(AnimationTag::Wait, json!({}), 400);
        let value = serde_json::to_value(&animation).unwrap();
        assert_eq!(value["type"], "wait");
        assert_eq!(value["time"], 400);
    }
}
