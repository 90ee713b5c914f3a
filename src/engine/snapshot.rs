//! Read-only state projection
//!
//! A snapshot is what external collaborators (renderer, stats harness,
//! playtest loop) see after each step: meters, energy, trust, conditions,
//! party statuses. Full engine save/restore lives on the engine itself,
//! which serializes completely including the RNG position.

use serde::{Deserialize, Serialize};

use crate::core::types::Round;
use crate::engine::condition::Condition;
use crate::engine::context::EncounterContext;
use crate::engine::state::VisitorBody;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub name: String,
    pub vitality: f32,
    pub max_vitality: f32,
    pub knocked_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySnapshot {
    pub available: f32,
    pub base: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub round: Round,
    pub structure: f32,
    pub veil: f32,
    pub presence: f32,
    pub rapport: f32,
    /// Standing vitality total (per-member detail in `members`)
    pub vitality: f32,
    pub resolve: f32,
    pub nerve: f32,
    pub trust: f32,
    pub members: Vec<MemberSnapshot>,
    pub dungeon_energy: EnergySnapshot,
    pub visitor_energy: EnergySnapshot,
    pub conditions: Vec<Condition>,
    pub armed_traps: usize,
    pub covenant_sealed: bool,
}

impl Snapshot {
    pub fn capture(ctx: &EncounterContext) -> Self {
        let members = match &ctx.visitor.body {
            VisitorBody::Solitary { .. } => Vec::new(),
            VisitorBody::Party { members, .. } => members
                .iter()
                .map(|m| MemberSnapshot {
                    name: m.name.clone(),
                    vitality: m.vitality.value,
                    max_vitality: m.vitality.max,
                    knocked_out: m.knocked_out,
                })
                .collect(),
        };
        Self {
            round: ctx.round,
            structure: ctx.dungeon.structure.value,
            veil: ctx.dungeon.veil.value,
            presence: ctx.dungeon.presence.value,
            rapport: ctx.dungeon.rapport,
            vitality: ctx.visitor.vitality_total(),
            resolve: ctx.visitor.resolve.value,
            nerve: ctx.visitor.nerve.value,
            trust: ctx.visitor.trust,
            members,
            dungeon_energy: EnergySnapshot {
                available: ctx.dungeon.energy.available,
                base: ctx.dungeon.energy.base,
            },
            visitor_energy: EnergySnapshot {
                available: ctx.visitor.energy.available,
                base: ctx.visitor.energy.base,
            },
            conditions: ctx.conditions.clone(),
            armed_traps: ctx.traps.armed().len(),
            covenant_sealed: ctx.covenant_sealed,
        }
    }
}
