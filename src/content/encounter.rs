//! Encounter definitions
//!
//! An encounter is one room of the gauntlet: both decks, the initiative
//! side, periodic auto-effects, and the room's terminal-condition knobs.

use serde::{Deserialize, Serialize};

use crate::ai::profile::ProfileContribution;
use crate::content::card::Card;
use crate::core::types::{Meter, Side};

/// Cadence of an auto-effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Fires every round
    Every,
    /// Fires on even-numbered rounds
    Other,
}

impl Cadence {
    pub fn fires_on(&self, round: u32) -> bool {
        match self {
            Cadence::Every => true,
            Cadence::Other => round % 2 == 0,
        }
    }
}

/// Periodic environmental drain. Not a card play: bypasses the resolver
/// and goes straight to the meters and the win-condition evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoEffect {
    pub cadence: Cadence,
    pub meter: Meter,
    pub amount: f32,
    pub note: String,
}

/// Per-room terminal-condition configuration.
///
/// Dominate/Overcome/Inert thresholds are intentionally per-encounter
/// rather than hard-coded; rooms tune them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Trust the dungeon must accumulate for Bond
    pub bond_threshold: f32,
    /// Round cap forcing the Survive check, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
    /// Knockouts needed for a party Kill; defaults to the party size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill_threshold: Option<u32>,
    /// Whether Bond additionally requires a sealed Covenant in this room
    pub covenant_required: bool,
    /// Presence level at or below which Dominate fires
    pub dominate_threshold: f32,
    /// Structure level at or below which Overcome fires
    pub overcome_threshold: f32,
    /// Consecutive stagnant rounds before the Inert stalemate
    pub inert_rounds: u32,
    /// Hand size dealt to an externally controlled side
    pub hand_size: usize,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            bond_threshold: 10.0,
            max_rounds: None,
            kill_threshold: None,
            covenant_required: true,
            dominate_threshold: 0.0,
            overcome_threshold: 0.0,
            inert_rounds: 2,
            hand_size: 5,
        }
    }
}

/// One room of the gauntlet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterDef {
    pub name: String,
    pub initiative: Side,
    #[serde(default)]
    pub auto_effects: Vec<AutoEffect>,
    pub dungeon_deck: Vec<Card>,
    pub visitor_deck: Vec<Card>,
    #[serde(default)]
    pub config: EncounterConfig,
    /// Room-specific additions to the dungeon's decision profile
    #[serde(default)]
    pub dungeon_fragment: ProfileContribution,
    /// Room-specific additions to the visitor's decision profile
    #[serde(default)]
    pub visitor_fragment: ProfileContribution,
}

impl EncounterDef {
    pub fn validate(&self) -> Result<(), String> {
        if self.dungeon_deck.is_empty() {
            return Err("dungeon deck is empty".into());
        }
        for card in &self.dungeon_deck {
            card.validate(Side::Dungeon)
                .map_err(|reason| format!("card '{}': {}", card.name, reason))?;
        }
        for card in &self.visitor_deck {
            card.validate(Side::Visitor)
                .map_err(|reason| format!("card '{}': {}", card.name, reason))?;
        }
        for effect in &self.auto_effects {
            if effect.amount <= 0.0 {
                return Err(format!("auto-effect '{}' needs a positive amount", effect.note));
            }
        }
        if self.config.inert_rounds == 0 {
            return Err("inert_rounds must be at least 1".into());
        }
        if self.config.hand_size == 0 {
            return Err("hand_size must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_other_fires_on_even_rounds() {
        assert!(!Cadence::Other.fires_on(1));
        assert!(Cadence::Other.fires_on(2));
        assert!(!Cadence::Other.fires_on(3));
        assert!(Cadence::Every.fires_on(1));
        assert!(Cadence::Every.fires_on(2));
    }

    #[test]
    fn test_empty_dungeon_deck_rejected() {
        let def = EncounterDef {
            name: "Bare Room".into(),
            initiative: Side::Dungeon,
            auto_effects: Vec::new(),
            dungeon_deck: Vec::new(),
            visitor_deck: Vec::new(),
            config: EncounterConfig::default(),
            dungeon_fragment: ProfileContribution::default(),
            visitor_fragment: ProfileContribution::default(),
        };
        assert!(def.validate().is_err());
    }
}
