//! AI decision profiles
//!
//! A profile is assembled by a pure reducer over contribution records from
//! the scenario templates, the current room, and (for parties) the members
//! still standing. Contributions add; nothing mutates a shared profile.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::content::card::CardCategory;
use crate::core::types::Meter;

pub const ALL_CATEGORIES: [CardCategory; 10] = [
    CardCategory::Energy,
    CardCategory::Strike,
    CardCategory::Empower,
    CardCategory::Disrupt,
    CardCategory::Counter,
    CardCategory::React,
    CardCategory::Trap,
    CardCategory::Offer,
    CardCategory::Test,
    CardCategory::Reshape,
];

/// Trust level at which this profile starts cooperating on Test/Offer
/// responses. Sensitive profiles use the cooperative bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooperationThresholds {
    pub cautious: f32,
    pub cooperative: f32,
}

impl Default for CooperationThresholds {
    fn default() -> Self {
        Self {
            cautious: 6.0,
            cooperative: 3.0,
        }
    }
}

/// Partial profile carried by a content piece (template, room, member)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileContribution {
    /// Additive weight deltas per card category
    pub weights: AHashMap<CardCategory, f32>,
    pub preferred_targets: Vec<Meter>,
    pub combo_awareness: f32,
    pub energy_eagerness: f32,
    pub bond_affinity: f32,
    pub betrayal_affinity: f32,
    pub cooperation_sensitivity: f32,
}

/// Complete decision profile for one side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    pub base_weights: AHashMap<CardCategory, f32>,
    pub preferred_targets: Vec<Meter>,
    /// Boost applied to combo-completing plays (0.0 to 1.0)
    pub combo_awareness: f32,
    /// Bias toward Energy plays when the pool runs low (0.0 to 1.0)
    pub energy_eagerness: f32,
    /// Dungeon: appetite for the Bond route (0.0 to 1.0)
    pub bond_affinity: f32,
    /// Dungeon: appetite for cooperating early and turning later (0.0 to 1.0)
    pub betrayal_affinity: f32,
    /// Visitor: willingness to cooperate on Tests and accept Offers
    pub cooperation_sensitivity: f32,
    pub cooperation_thresholds: CooperationThresholds,
}

impl Default for AiProfile {
    fn default() -> Self {
        let mut base_weights = AHashMap::new();
        for category in ALL_CATEGORIES {
            base_weights.insert(category, 1.0);
        }
        Self {
            base_weights,
            preferred_targets: Vec::new(),
            combo_awareness: 0.5,
            energy_eagerness: 0.5,
            bond_affinity: 0.0,
            betrayal_affinity: 0.0,
            cooperation_sensitivity: 0.5,
            cooperation_thresholds: CooperationThresholds::default(),
        }
    }
}

impl AiProfile {
    /// Reduce a list of contributions into a profile. Weight deltas add to
    /// the 1.0 baseline (floored at zero); behavioral scalars add and clamp
    /// to [0, 1]; preferred targets union in first-seen order.
    pub fn from_contributions(parts: &[&ProfileContribution]) -> Self {
        let mut profile = Self::default();
        for part in parts {
            for (category, delta) in &part.weights {
                let weight = profile.base_weights.entry(*category).or_insert(1.0);
                *weight = (*weight + delta).max(0.0);
            }
            for target in &part.preferred_targets {
                if !profile.preferred_targets.contains(target) {
                    profile.preferred_targets.push(*target);
                }
            }
            profile.combo_awareness = (profile.combo_awareness + part.combo_awareness).clamp(0.0, 1.0);
            profile.energy_eagerness =
                (profile.energy_eagerness + part.energy_eagerness).clamp(0.0, 1.0);
            profile.bond_affinity = (profile.bond_affinity + part.bond_affinity).clamp(0.0, 1.0);
            profile.betrayal_affinity =
                (profile.betrayal_affinity + part.betrayal_affinity).clamp(0.0, 1.0);
            profile.cooperation_sensitivity =
                (profile.cooperation_sensitivity + part.cooperation_sensitivity).clamp(0.0, 1.0);
        }
        profile
    }

    pub fn weight(&self, category: CardCategory) -> f32 {
        self.base_weights.get(&category).copied().unwrap_or(1.0)
    }

    /// The trust bar this profile requires before cooperating
    pub fn cooperation_threshold(&self) -> f32 {
        if self.cooperation_sensitivity >= 0.5 {
            self.cooperation_thresholds.cooperative
        } else {
            self.cooperation_thresholds.cautious
        }
    }

    /// Trust level at which a deceptive profile turns on its partner.
    /// Profiles without betrayal appetite never turn.
    pub fn betrayal_trigger(&self, bond_threshold: f32) -> Option<f32> {
        if self.betrayal_affinity > 0.0 {
            Some(bond_threshold * (1.0 - 0.5 * self.betrayal_affinity))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_cover_every_category() {
        let profile = AiProfile::default();
        for category in ALL_CATEGORIES {
            assert!((profile.weight(category) - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_reducer_sums_weight_deltas() {
        let mut a = ProfileContribution::default();
        a.weights.insert(CardCategory::Strike, 0.5);
        let mut b = ProfileContribution::default();
        b.weights.insert(CardCategory::Strike, 0.25);
        b.weights.insert(CardCategory::Offer, -0.4);

        let profile = AiProfile::from_contributions(&[&a, &b]);
        assert!((profile.weight(CardCategory::Strike) - 1.75).abs() < 1e-6);
        assert!((profile.weight(CardCategory::Offer) - 0.6).abs() < 1e-6);
        assert!((profile.weight(CardCategory::Energy) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reducer_clamps_scalars() {
        let mut a = ProfileContribution::default();
        a.betrayal_affinity = 0.8;
        let mut b = ProfileContribution::default();
        b.betrayal_affinity = 0.9;

        let profile = AiProfile::from_contributions(&[&a, &b]);
        assert!((profile.betrayal_affinity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reducer_is_order_insensitive_for_weights() {
        let mut a = ProfileContribution::default();
        a.weights.insert(CardCategory::Trap, 0.3);
        let mut b = ProfileContribution::default();
        b.weights.insert(CardCategory::Trap, 0.2);

        let ab = AiProfile::from_contributions(&[&a, &b]);
        let ba = AiProfile::from_contributions(&[&b, &a]);
        assert_eq!(ab.weight(CardCategory::Trap), ba.weight(CardCategory::Trap));
    }

    #[test]
    fn test_cooperation_threshold_tracks_sensitivity() {
        let mut profile = AiProfile::default();
        profile.cooperation_sensitivity = 0.9;
        assert_eq!(
            profile.cooperation_threshold(),
            profile.cooperation_thresholds.cooperative
        );
        profile.cooperation_sensitivity = 0.1;
        assert_eq!(
            profile.cooperation_threshold(),
            profile.cooperation_thresholds.cautious
        );
    }

    #[test]
    fn test_betrayal_trigger_requires_appetite() {
        let mut profile = AiProfile::default();
        assert!(profile.betrayal_trigger(10.0).is_none());
        profile.betrayal_affinity = 1.0;
        assert_eq!(profile.betrayal_trigger(10.0), Some(5.0));
    }
}
