//! Inbound client commands.
//!
//! One command per message, tagged by `type`. Parsing is strict; a
//! malformed message never reaches dispatch. Positions and slots arrive
//! as raw indices and are re-validated against game state — the client
//! is never trusted.

use serde::{Deserialize, Serialize};

use crate::targeting::TargetRef;

/// A board position as the client names it: whose side, which slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// Owning player index.
    pub team: u8,
    /// Board slot.
    pub slot: usize,
}

/// Everything a client can ask for, one command per message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Pass the turn.
    EndTurn,
    /// Play a character card from hand into a board slot.
    PlayCharacterCard {
        /// Hand index.
        position: usize,
        /// Destination board slot.
        slot_number: usize,
    },
    /// Use a hand card's act ability on a board character.
    CharacterActs {
        /// Hand index of the acting card.
        position: usize,
        /// Board slot of the character acted on.
        slot_number: usize,
        /// Whether that slot is on the sender's own board.
        ally: bool,
    },
    /// Play a spell card from hand.
    PlaySpellCard {
        /// Hand index.
        position: usize,
    },
    /// Attack a character with a character.
    CharacterAttack {
        /// The attacking character's position.
        initiator: SlotSpec,
        /// The defending character's position.
        target: SlotSpec,
    },
    /// Attack a player with a character.
    PlayerAttack {
        /// The attacking character's position.
        initiator: SlotSpec,
        /// Defending player index.
        target: u8,
    },
    /// Answer an outstanding target request.
    TargetChosen {
        /// The chosen target.
        target: TargetRef,
    },
    /// Back out of a cancellable target request.
    CancelChoose,
    /// Answer an outstanding choice request.
    ChosenCard {
        /// Index into the offered items.
        chosen: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_end_turn() {
        let command: ClientCommand = serde_json::from_str("{\"type\":\"endTurn\"}").unwrap();
        assert_eq!(command, ClientCommand::EndTurn);
    }

    #[test]
    fn test_parse_play_character() {
        let raw = "{\"type\":\"playCharacterCard\",\"position\":2,\"slotNumber\":4}";
        let command: ClientCommand = serde_json::from_str(raw).unwrap();
        assert_eq!(
            command,
            ClientCommand::PlayCharacterCard {
                position: 2,
                slot_number: 4
            }
        );
    }

    #[test]
    fn test_parse_target_chosen() {
        let raw = "{\"type\":\"targetChosen\",\"target\":{\"location\":\"enemySlots\",\"pos\":1}}";
        let command: ClientCommand = serde_json::from_str(raw).unwrap();
        assert_eq!(
            command,
            ClientCommand::TargetChosen {
                target: TargetRef::EnemySlot { pos: 1 }
            }
        );
    }

    #[test]
    fn test_parse_attack() {
        let raw = "{\"type\":\"characterAttack\",\
                   \"initiator\":{\"team\":0,\"slot\":1},\
                   \"target\":{\"team\":1,\"slot\":3}}";
        let command: ClientCommand = serde_json::from_str(raw).unwrap();
        assert_eq!(
            command,
            ClientCommand::CharacterAttack {
                initiator: SlotSpec { team: 0, slot: 1 },
                target: SlotSpec { team: 1, slot: 3 },
            }
        );
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(serde_json::from_str::<ClientCommand>("{\"type\":\"hack\"}").is_err());
        assert!(serde_json::from_str::<ClientCommand>("not json").is_err());
    }
}
