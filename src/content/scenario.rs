//! Scenario definitions
//!
//! A scenario is an ordered room sequence plus the starting templates for
//! both sides. Authored by external tooling; the core only consumes it.

use serde::{Deserialize, Serialize};

use crate::ai::profile::ProfileContribution;
use crate::content::card::Card;
use crate::content::encounter::EncounterDef;
use crate::core::types::Side;

/// Starting dungeon resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonTemplate {
    pub structure: f32,
    pub veil: f32,
    pub presence: f32,
    pub base_energy: f32,
    #[serde(default)]
    pub profile: ProfileContribution,
}

/// Morale damage to the collective pools when a member goes down;
/// indexed by knockout order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoralePenalty {
    pub resolve: f32,
    pub nerve: f32,
}

/// A party member template: own vitality, own card contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTemplate {
    pub name: String,
    pub vitality: f32,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub profile: ProfileContribution,
}

/// Solitary creature or multi-member party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum VisitorBodyTemplate {
    Solitary {
        vitality: f32,
    },
    Party {
        members: Vec<MemberTemplate>,
        knockout_morale: Vec<MoralePenalty>,
    },
}

/// Starting visitor resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorTemplate {
    pub resolve: f32,
    pub nerve: f32,
    pub base_energy: f32,
    pub body: VisitorBodyTemplate,
    #[serde(default)]
    pub profile: ProfileContribution,
}

/// Ordered gauntlet plus both starting templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub name: String,
    pub encounters: Vec<EncounterDef>,
    pub dungeon: DungeonTemplate,
    pub visitor: VisitorTemplate,
}

impl ScenarioDef {
    pub fn validate(&self) -> Result<(), String> {
        if self.encounters.is_empty() {
            return Err("scenario has no encounters".into());
        }
        for encounter in &self.encounters {
            encounter
                .validate()
                .map_err(|reason| format!("encounter '{}': {}", encounter.name, reason))?;
        }
        if self.dungeon.structure <= 0.0 || self.dungeon.veil <= 0.0 || self.dungeon.presence <= 0.0
        {
            return Err("dungeon meters must start positive".into());
        }
        if self.visitor.resolve <= 0.0 || self.visitor.nerve <= 0.0 {
            return Err("visitor pools must start positive".into());
        }
        match &self.visitor.body {
            VisitorBodyTemplate::Solitary { vitality } => {
                if *vitality <= 0.0 {
                    return Err("solitary vitality must start positive".into());
                }
            }
            VisitorBodyTemplate::Party {
                members,
                knockout_morale,
            } => {
                if members.is_empty() {
                    return Err("party has no members".into());
                }
                if members.iter().any(|m| m.vitality <= 0.0) {
                    return Err("every member needs positive vitality".into());
                }
                if knockout_morale.is_empty() {
                    return Err("party needs knockout morale penalties".into());
                }
                for member in members {
                    for card in &member.cards {
                        card.validate(Side::Visitor).map_err(|reason| {
                            format!("member '{}' card '{}': {}", member.name, card.name, reason)
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn party_size(&self) -> Option<usize> {
        match &self.visitor.body {
            VisitorBodyTemplate::Solitary { .. } => None,
            VisitorBodyTemplate::Party { members, .. } => Some(members.len()),
        }
    }
}
