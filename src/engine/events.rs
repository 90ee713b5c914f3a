//! Step event stream and card-selection input
//!
//! Each `next_step()` call yields one tagged event carrying the round, any
//! human-readable log lines produced by the step, and a snapshot of the
//! state after the step. Renderers and the stats harness consume these;
//! the engine itself never renders anything.

use serde::{Deserialize, Serialize};

use crate::core::types::{Round, Side};
use crate::engine::snapshot::Snapshot;
use crate::engine::victory::Outcome;

/// How a submitted card is meant to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayAction {
    /// Resolve in queue order
    Queue,
    /// Hold in reserve (React cards)
    Hold,
}

/// One entry of a submitted card queue; `card` indexes the side's
/// candidate pool for the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedPlay {
    pub card: usize,
    pub action: PlayAction,
}

impl QueuedPlay {
    pub fn queue(card: usize) -> Self {
        Self {
            card,
            action: PlayAction::Queue,
        }
    }

    pub fn hold(card: usize) -> Self {
        Self {
            card,
            action: PlayAction::Hold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StepEventKind {
    EncounterStart { name: String },
    RoundStart { round: Round },
    AutoEffects,
    AwaitingInput { side: Side },
    CardPlayed { side: Side, card: String, held: bool },
    CardSkipped { side: Side, card: String, reason: String },
    RoundEnd { round: Round },
    EncounterEnd { outcome: Outcome },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub kind: StepEventKind,
    pub round: Round,
    pub log: Vec<String>,
    pub snapshot: Snapshot,
}
