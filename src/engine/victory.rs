//! Win-condition evaluation
//!
//! Checked after every state mutation step. Conditions are mutually
//! exclusive and checked in a fixed first-match order; the scheduler
//! records the first satisfied outcome and never replaces it.

use serde::{Deserialize, Serialize};

use crate::content::encounter::EncounterConfig;
use crate::core::types::Side;
use crate::engine::context::EncounterContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    Kill,
    Break,
    Panic,
    Bond,
    Dominate,
    Overcome,
    Survive,
    Inert,
}

impl std::fmt::Display for WinCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WinCondition::Kill => "kill",
            WinCondition::Break => "break",
            WinCondition::Panic => "panic",
            WinCondition::Bond => "bond",
            WinCondition::Dominate => "dominate",
            WinCondition::Overcome => "overcome",
            WinCondition::Survive => "survive",
            WinCondition::Inert => "inert",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Option<Side>,
    pub condition: WinCondition,
    pub description: String,
}

impl Outcome {
    fn new(winner: Option<Side>, condition: WinCondition, description: impl Into<String>) -> Self {
        Self {
            winner,
            condition,
            description: description.into(),
        }
    }
}

/// First-match terminal check over the current state. Survive and Inert
/// are round-end conditions and live in their own constructors below.
pub fn evaluate(ctx: &EncounterContext, config: &EncounterConfig) -> Option<Outcome> {
    // 1. Kill
    let killed = match ctx.visitor.party_size() {
        Some(size) => {
            let threshold = config.kill_threshold.unwrap_or(size as u32);
            ctx.visitor.knockouts() >= threshold
        }
        None => ctx.visitor.vitality_total() <= 0.0,
    };
    if killed {
        return Some(Outcome::new(
            Some(Side::Dungeon),
            WinCondition::Kill,
            "the visitor's body gives out",
        ));
    }

    // 2. Break
    if ctx.visitor.resolve.is_empty() {
        return Some(Outcome::new(
            Some(Side::Dungeon),
            WinCondition::Break,
            "the visitor's resolve is broken",
        ));
    }

    // 3. Panic
    if ctx.visitor.nerve.is_empty() {
        return Some(Outcome::new(
            Some(Side::Dungeon),
            WinCondition::Panic,
            "the visitor's nerve fails and they flee",
        ));
    }

    // 4. Bond
    let bonded = ctx.dungeon.rapport >= config.bond_threshold
        && (ctx.covenant_sealed || !config.covenant_required);
    if bonded {
        return Some(Outcome::new(
            Some(Side::Dungeon),
            WinCondition::Bond,
            "the dungeon and visitor are bound together",
        ));
    }

    // 5. Dominate
    if ctx.dungeon.presence.value <= config.dominate_threshold {
        return Some(Outcome::new(
            Some(Side::Visitor),
            WinCondition::Dominate,
            "the visitor subdues the dungeon's presence",
        ));
    }

    // 6. Overcome
    if ctx.dungeon.structure.value <= config.overcome_threshold {
        return Some(Outcome::new(
            Some(Side::Visitor),
            WinCondition::Overcome,
            "the dungeon's structure collapses",
        ));
    }

    None
}

/// Round cap reached with nothing else decided
pub fn survive_outcome() -> Outcome {
    Outcome::new(
        Some(Side::Visitor),
        WinCondition::Survive,
        "the visitor outlasts the room",
    )
}

/// Degenerate stalemate: no meaningful state change for the configured
/// number of rounds
pub fn inert_outcome() -> Outcome {
    Outcome::new(
        None,
        WinCondition::Inert,
        "both sides are spent; the room goes still",
    )
}
