//! Multi-encounter orchestration
//!
//! Carries meters, trust, and persistent conditions through an ordered
//! room sequence. The visitor advances on Survive/Overcome/Dominate;
//! anything else ends the run in that room.

use serde::{Deserialize, Serialize};

use crate::ai::profile::{AiProfile, ProfileContribution};
use crate::content::scenario::{ScenarioDef, VisitorBodyTemplate};
use crate::core::types::{RunId, Side};
use crate::engine::context::EncounterContext;
use crate::engine::scheduler::{ControlMode, EncounterEngine};
use crate::engine::state::{DungeonState, VisitorState};
use crate::engine::victory::{self, Outcome, WinCondition};

/// Hard step ceiling per room so a degenerate matchup cannot hang a batch
const STEP_CEILING: usize = 100_000;

/// Aggregated result of one full gauntlet run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub scenario: String,
    pub seed: u64,
    /// Per-room outcomes, in room order, up to where the run ended
    pub outcomes: Vec<Outcome>,
    pub rooms_cleared: usize,
    pub rounds_total: u32,
    /// Run-level winner; the visitor must clear every room
    pub winner: Option<Side>,
}

/// Drives a scenario from the first room to a run-level outcome
pub struct ScenarioRunner {
    scenario: ScenarioDef,
    seed: u64,
}

impl ScenarioRunner {
    pub fn new(scenario: ScenarioDef, seed: u64) -> Self {
        Self { scenario, seed }
    }

    fn dungeon_profile(&self, room: usize) -> AiProfile {
        AiProfile::from_contributions(&[
            &self.scenario.dungeon.profile,
            &self.scenario.encounters[room].dungeon_fragment,
        ])
    }

    fn visitor_profile(&self, room: usize) -> AiProfile {
        let mut parts: Vec<&ProfileContribution> = vec![
            &self.scenario.visitor.profile,
            &self.scenario.encounters[room].visitor_fragment,
        ];
        if let VisitorBodyTemplate::Party { members, .. } = &self.scenario.visitor.body {
            parts.extend(members.iter().map(|m| &m.profile));
        }
        AiProfile::from_contributions(&parts)
    }

    /// Run the whole gauntlet, both sides AI-driven
    pub fn run(&self) -> RunReport {
        let dungeon = DungeonState::from_template(&self.scenario.dungeon);
        let visitor = VisitorState::from_template(&self.scenario.visitor);
        let mut ctx = EncounterContext::new(dungeon, visitor, self.seed);

        let mut outcomes: Vec<Outcome> = Vec::new();
        let mut rooms_cleared = 0_usize;
        let mut rounds_total = 0_u32;

        for (room, def) in self.scenario.encounters.iter().enumerate() {
            let profiles = [self.dungeon_profile(room), self.visitor_profile(room)];
            let mut engine = EncounterEngine::from_context(
                def.clone(),
                ctx,
                profiles,
                [ControlMode::Ai, ControlMode::Ai],
            );

            let mut steps = 0_usize;
            while !engine.is_finished() && steps < STEP_CEILING {
                engine.next_step();
                steps += 1;
            }
            if steps >= STEP_CEILING {
                tracing::warn!(room = %def.name, "step ceiling reached, ruling the room inert");
            }
            let outcome = engine
                .outcome()
                .cloned()
                .unwrap_or_else(victory::inert_outcome);
            tracing::info!(room = %def.name, condition = %outcome.condition, "room decided");

            ctx = engine.into_context();
            rounds_total += ctx.round;

            let advance = matches!(
                outcome.condition,
                WinCondition::Survive | WinCondition::Overcome | WinCondition::Dominate
            );
            outcomes.push(outcome);
            if !advance {
                break;
            }
            rooms_cleared += 1;
            ctx.carry_into_next_room();
        }

        let cleared_all = rooms_cleared == self.scenario.encounters.len();
        let winner = if cleared_all {
            Some(Side::Visitor)
        } else {
            outcomes.last().and_then(|o| o.winner)
        };

        RunReport {
            run_id: RunId::new(),
            scenario: self.scenario.name.clone(),
            seed: self.seed,
            outcomes,
            rooms_cleared,
            rounds_total,
            winner,
        }
    }
}
