//! The decision gate: per-player suspend/resume for actions that need
//! out-of-band human input (pick a target, pick one of N offered cards).
//!
//! The resolution pipeline is synchronous; when an action needs input,
//! the initiating operation stores its continuation here and returns all
//! the way out to the message dispatcher. The next valid message from
//! the owning player resumes it. At most one decision per player is ever
//! live, and a request with an empty legal set is refused outright — a
//! prompt nobody can answer would stall the whole game.

use serde_json::json;
use tracing::{debug, warn};

use crate::core::{EntityId, EntityRef, PlayerId};
use crate::protocol::{AnimationTag, CardView};
use crate::state::Game;
use crate::targeting::{TargetRef, TargetSet, Targeting};

/// Continuation run when a target is chosen.
pub type TargetContinuation = Box<dyn FnOnce(&mut Game, EntityRef)>;

/// Continuation run when a cancellable request is cancelled. Must fully
/// restore any partial mutation the initiating action already applied.
pub type CancelContinuation = Box<dyn FnOnce(&mut Game)>;

/// Continuation run when a choice is made, with the chosen index.
pub type ChoiceContinuation = Box<dyn FnOnce(&mut Game, usize)>;

/// The gate's externally visible state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// No decision outstanding.
    Idle,
    /// Waiting for the owner to pick a target.
    AwaitingTarget {
        /// Whether the owner may back out.
        cancellable: bool,
    },
    /// Waiting for the owner to pick one of N offered items.
    AwaitingChoice,
}

enum PendingDecision {
    Target {
        legal: TargetSet,
        prompt: Option<EntityId>,
        on_resolve: TargetContinuation,
        on_cancel: Option<CancelContinuation>,
    },
    Choice {
        offered: Vec<String>,
        on_resolve: ChoiceContinuation,
    },
}

impl std::fmt::Debug for PendingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingDecision::Target { legal, prompt, .. } => f
                .debug_struct("Target")
                .field("legal", legal)
                .field("prompt", prompt)
                .finish_non_exhaustive(),
            PendingDecision::Choice { offered, .. } => f
                .debug_struct("Choice")
                .field("offered", offered)
                .finish_non_exhaustive(),
        }
    }
}

/// Single-slot suspend/resume register for one player.
#[derive(Debug, Default)]
pub struct DecisionGate {
    pending: Option<PendingDecision>,
}

impl DecisionGate {
    /// Create an idle gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GateState {
        match &self.pending {
            None => GateState::Idle,
            Some(PendingDecision::Target { on_cancel, .. }) => GateState::AwaitingTarget {
                cancellable: on_cancel.is_some(),
            },
            Some(PendingDecision::Choice { .. }) => GateState::AwaitingChoice,
        }
    }

    /// Whether no decision is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// The legal target set of an outstanding target request.
    #[must_use]
    pub fn legal_targets(&self) -> Option<&TargetSet> {
        match &self.pending {
            Some(PendingDecision::Target { legal, .. }) => Some(legal),
            _ => None,
        }
    }

    /// The card that prompted an outstanding target request.
    #[must_use]
    pub fn prompt_card(&self) -> Option<EntityId> {
        match &self.pending {
            Some(PendingDecision::Target { prompt, .. }) => *prompt,
            _ => None,
        }
    }

    /// The offered items of an outstanding choice request.
    #[must_use]
    pub fn offered(&self) -> Option<&[String]> {
        match &self.pending {
            Some(PendingDecision::Choice { offered, .. }) => Some(offered),
            _ => None,
        }
    }
}

impl Game {
    /// Suspend for a cancellable target choice driven by a card's target
    /// rule. Returns whether the gate was entered; a refusal leaves all
    /// state untouched.
    pub fn wait_for_target_cancellable(
        &mut self,
        player: PlayerId,
        card: EntityId,
        on_resolve: TargetContinuation,
        on_cancel: CancelContinuation,
    ) -> bool {
        let Some(rule) = self.card(card).and_then(|c| c.def.target_rule) else {
            return false;
        };
        let legal = Targeting::legal_targets(self, player, rule);
        self.enter_target_wait(player, legal, Some(card), on_resolve, Some(on_cancel))
    }

    /// Suspend for a non-cancellable target choice over an explicit
    /// legal set. Returns whether the gate was entered.
    pub fn wait_for_target(
        &mut self,
        player: PlayerId,
        legal: TargetSet,
        on_resolve: TargetContinuation,
    ) -> bool {
        self.enter_target_wait(player, legal, None, on_resolve, None)
    }

    fn enter_target_wait(
        &mut self,
        player: PlayerId,
        legal: TargetSet,
        prompt: Option<EntityId>,
        on_resolve: TargetContinuation,
        on_cancel: Option<CancelContinuation>,
    ) -> bool {
        if !self.player(player).gate.is_idle() {
            warn!(%player, "target request while a decision is already outstanding");
            return false;
        }
        if legal.is_empty() {
            debug!(%player, "target request refused: no legal targets");
            return false;
        }

        let targets = serde_json::to_value(&legal).unwrap_or(serde_json::Value::Null);
        if on_cancel.is_some() {
            let card_value = prompt
                .and_then(|id| CardView::of(self, id))
                .map(|view| view.to_value())
                .unwrap_or(serde_json::Value::Null);
            self.push_animation(
                player,
                AnimationTag::GetTargetCancellable,
                json!({ "validTargets": targets, "card": card_value }),
                0,
            );
        } else {
            self.push_animation(
                player,
                AnimationTag::GetTargetNotCancellable,
                json!({ "validTargets": targets }),
                0,
            );
        }

        self.player_mut(player).gate.pending = Some(PendingDecision::Target {
            legal,
            prompt,
            on_resolve,
            on_cancel,
        });
        true
    }

    /// Suspend for a pick-one-of-N choice. `offered` is a list of card
    /// names to present. Returns whether the gate was entered.
    pub fn wait_for_choice(
        &mut self,
        player: PlayerId,
        offered: Vec<String>,
        on_resolve: ChoiceContinuation,
    ) -> bool {
        if !self.player(player).gate.is_idle() {
            warn!(%player, "choice request while a decision is already outstanding");
            return false;
        }
        if offered.is_empty() {
            debug!(%player, "choice request refused: nothing offered");
            return false;
        }

        let views: Vec<serde_json::Value> = offered
            .iter()
            .filter_map(|name| self.catalog().get(name))
            .map(|def| CardView::from_definition(&def).to_value())
            .collect();
        self.push_animation(
            player,
            AnimationTag::GetChoose,
            json!({ "chooseCards": views }),
            0,
        );

        self.player_mut(player).gate.pending = Some(PendingDecision::Choice {
            offered,
            on_resolve,
        });
        true
    }

    /// Resolve an outstanding target request with the owner's pick.
    /// Invalid or out-of-set picks are dropped without touching the gate.
    pub fn resolve_target(&mut self, player: PlayerId, target: TargetRef) -> bool {
        let valid = match self.player(player).gate.legal_targets() {
            Some(legal) => legal.contains(player, target),
            None => false,
        };
        if !valid {
            debug!(%player, ?target, "target pick dropped");
            return false;
        }
        let Some(resolved) = Targeting::resolve(self, player, target) else {
            return false;
        };

        let Some(PendingDecision::Target { on_resolve, .. }) =
            self.player_mut(player).gate.pending.take()
        else {
            return false;
        };
        self.push_animation(
            player,
            AnimationTag::ClearTargetSelection,
            json!({}),
            0,
        );
        on_resolve(self, resolved);
        self.pump_stack();
        true
    }

    /// Cancel an outstanding cancellable target request. The cancel
    /// continuation restores whatever the initiating action had already
    /// mutated.
    pub fn cancel_target(&mut self, player: PlayerId) -> bool {
        let cancellable = matches!(
            self.player(player).gate.state(),
            GateState::AwaitingTarget { cancellable: true }
        );
        if !cancellable {
            return false;
        }
        let Some(PendingDecision::Target {
            on_cancel: Some(on_cancel),
            ..
        }) = self.player_mut(player).gate.pending.take()
        else {
            return false;
        };
        self.push_animation(
            player,
            AnimationTag::ClearTargetSelection,
            json!({}),
            0,
        );
        on_cancel(self);
        self.pump_stack();
        true
    }

    /// Resolve an outstanding choice request with the picked index.
    pub fn resolve_choice(&mut self, player: PlayerId, chosen: usize) -> bool {
        let in_bounds = match self.player(player).gate.offered() {
            Some(offered) => chosen < offered.len(),
            None => false,
        };
        if !in_bounds {
            debug!(%player, chosen, "choice pick dropped");
            return false;
        }

        let Some(PendingDecision::Choice { on_resolve, .. }) =
            self.player_mut(player).gate.pending.take()
        else {
            return false;
        };
        self.push_animation(
            player,
            AnimationTag::ClearChooseCardSelection,
            json!({}),
            0,
        );
        on_resolve(self, chosen);
        self.pump_stack();
        true
    }

    /// Forcibly settle an abandoned decision (disconnect, idle timeout).
    /// The session layer calls this; the engine itself has no timer.
    ///
    /// Cancellable requests take the cancel path. Non-cancellable target
    /// requests resolve with the first legal target — the set is
    /// non-empty by the entry invariant. Choices resolve with index 0.
    pub fn abandon_decision(&mut self, player: PlayerId) -> bool {
        match self.player(player).gate.state() {
            GateState::Idle => false,
            GateState::AwaitingTarget { cancellable: true } => self.cancel_target(player),
            GateState::AwaitingTarget { cancellable: false } => {
                let pick = self
                    .player(player)
                    .gate
                    .legal_targets()
                    .and_then(|legal| first_legal(player, legal));
                match pick {
                    Some(target) => self.resolve_target(player, target),
                    None => false,
                }
            }
            GateState::AwaitingChoice => self.resolve_choice(player, 0),
        }
    }
}

fn first_legal(viewer: PlayerId, legal: &TargetSet) -> Option<TargetRef> {
    if let Some(&pos) = legal.ally_slots.first() {
        return Some(TargetRef::AllySlot { pos });
    }
    if let Some(&pos) = legal.enemy_slots.first() {
        return Some(TargetRef::EnemySlot { pos });
    }
    if legal.ally_player {
        return Some(TargetRef::Player { player: viewer });
    }
    if legal.enemy_player {
        return Some(TargetRef::Player {
            player: viewer.opponent(),
        });
    }
    None
}
