//! Typed side state: meters, energy pools, party members
//!
//! All meter mutation funnels through `Gauge::apply`, which clamps to
//! `[0, max]` and reports clamp-to-zero transitions so the win-condition
//! evaluator can react within the same step.

use serde::{Deserialize, Serialize};

use crate::content::card::Card;
use crate::content::scenario::{
    DungeonTemplate, MoralePenalty, VisitorBodyTemplate, VisitorTemplate,
};
use crate::core::types::Meter;

/// Outcome of a single clamped meter mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaOutcome {
    /// Change actually applied after clamping
    pub applied: f32,
    /// The meter crossed from positive to zero in this step
    pub hit_zero: bool,
}

impl DeltaOutcome {
    pub const NONE: DeltaOutcome = DeltaOutcome {
        applied: 0.0,
        hit_zero: false,
    };
}

/// A meter with its cap. Caps are fixed at template values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub value: f32,
    pub max: f32,
}

impl Gauge {
    pub fn full(max: f32) -> Self {
        Self { value: max, max }
    }

    pub fn apply(&mut self, delta: f32) -> DeltaOutcome {
        let before = self.value;
        self.value = (self.value + delta).clamp(0.0, self.max);
        DeltaOutcome {
            applied: self.value - before,
            hit_zero: before > 0.0 && self.value == 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }
}

/// Per-side energy economy. `available` refills to `base` each round;
/// Energy cards raise `available` (or `base`, for permanent siphons).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPool {
    pub available: f32,
    pub base: f32,
}

impl EnergyPool {
    pub fn new(base: f32) -> Self {
        Self {
            available: base,
            base,
        }
    }

    pub fn refill(&mut self) {
        self.available = self.base;
    }

    pub fn gain(&mut self, amount: f32) {
        self.available += amount;
    }

    pub fn raise_base(&mut self, amount: f32) {
        self.base += amount;
        self.available += amount;
    }

    pub fn can_afford(&self, cost: f32) -> bool {
        self.available + 1e-6 >= cost
    }

    pub fn spend(&mut self, cost: f32) {
        self.available = (self.available - cost).max(0.0);
    }
}

/// Dungeon side state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonState {
    pub structure: Gauge,
    pub veil: Gauge,
    pub presence: Gauge,
    /// Trust the dungeon has accumulated toward the visitor
    pub rapport: f32,
    pub energy: EnergyPool,
}

impl DungeonState {
    pub fn from_template(template: &DungeonTemplate) -> Self {
        Self {
            structure: Gauge::full(template.structure),
            veil: Gauge::full(template.veil),
            presence: Gauge::full(template.presence),
            rapport: 0.0,
            energy: EnergyPool::new(template.base_energy),
        }
    }

    pub fn gauge_mut(&mut self, meter: Meter) -> Option<&mut Gauge> {
        match meter {
            Meter::Structure => Some(&mut self.structure),
            Meter::Veil => Some(&mut self.veil),
            Meter::Presence => Some(&mut self.presence),
            _ => None,
        }
    }

    pub fn gauge(&self, meter: Meter) -> Option<&Gauge> {
        match meter {
            Meter::Structure => Some(&self.structure),
            Meter::Veil => Some(&self.veil),
            Meter::Presence => Some(&self.presence),
            _ => None,
        }
    }
}

/// A party member with independent knockout state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberState {
    pub name: String,
    pub vitality: Gauge,
    pub knocked_out: bool,
    /// Cards this member contributes to the visitor candidate pool
    pub cards: Vec<Card>,
}

/// Solitary creature or party body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisitorBody {
    Solitary {
        vitality: Gauge,
    },
    Party {
        members: Vec<MemberState>,
        knockout_morale: Vec<MoralePenalty>,
        knockouts: u32,
    },
}

/// Visitor side state. For a party, vitality is decomposed per member;
/// resolve and nerve stay collective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorState {
    pub body: VisitorBody,
    pub resolve: Gauge,
    pub nerve: Gauge,
    /// Trust the visitor has accumulated toward the dungeon
    pub trust: f32,
    pub energy: EnergyPool,
}

impl VisitorState {
    pub fn from_template(template: &VisitorTemplate) -> Self {
        let body = match &template.body {
            VisitorBodyTemplate::Solitary { vitality } => VisitorBody::Solitary {
                vitality: Gauge::full(*vitality),
            },
            VisitorBodyTemplate::Party {
                members,
                knockout_morale,
            } => VisitorBody::Party {
                members: members
                    .iter()
                    .map(|m| MemberState {
                        name: m.name.clone(),
                        vitality: Gauge::full(m.vitality),
                        knocked_out: false,
                        cards: m.cards.clone(),
                    })
                    .collect(),
                knockout_morale: knockout_morale.clone(),
                knockouts: 0,
            },
        };
        Self {
            body,
            resolve: Gauge::full(template.resolve),
            nerve: Gauge::full(template.nerve),
            trust: 0.0,
            energy: EnergyPool::new(template.base_energy),
        }
    }

    pub fn is_party(&self) -> bool {
        matches!(self.body, VisitorBody::Party { .. })
    }

    pub fn party_size(&self) -> Option<usize> {
        match &self.body {
            VisitorBody::Solitary { .. } => None,
            VisitorBody::Party { members, .. } => Some(members.len()),
        }
    }

    pub fn knockouts(&self) -> u32 {
        match &self.body {
            VisitorBody::Solitary { .. } => 0,
            VisitorBody::Party { knockouts, .. } => *knockouts,
        }
    }

    /// Total remaining vitality across the body
    pub fn vitality_total(&self) -> f32 {
        match &self.body {
            VisitorBody::Solitary { vitality } => vitality.value,
            VisitorBody::Party { members, .. } => members
                .iter()
                .filter(|m| !m.knocked_out)
                .map(|m| m.vitality.value)
                .sum(),
        }
    }

    /// First standing member, the one a strike reaches by default
    pub fn front_member_index(&self) -> Option<usize> {
        match &self.body {
            VisitorBody::Solitary { .. } => None,
            VisitorBody::Party { members, .. } => {
                members.iter().position(|m| !m.knocked_out)
            }
        }
    }

    /// Standing member with the lowest vitality
    pub fn weakest_member_index(&self) -> Option<usize> {
        match &self.body {
            VisitorBody::Solitary { .. } => None,
            VisitorBody::Party { members, .. } => members
                .iter()
                .enumerate()
                .filter(|(_, m)| !m.knocked_out)
                .min_by(|(_, a), (_, b)| {
                    a.vitality
                        .value
                        .partial_cmp(&b.vitality.value)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i),
        }
    }

    pub fn gauge_mut(&mut self, meter: Meter) -> Option<&mut Gauge> {
        match meter {
            Meter::Resolve => Some(&mut self.resolve),
            Meter::Nerve => Some(&mut self.nerve),
            Meter::Vitality => match &mut self.body {
                VisitorBody::Solitary { vitality } => Some(vitality),
                // Party vitality routing picks a member; handled by the context
                VisitorBody::Party { .. } => None,
            },
            _ => None,
        }
    }

    pub fn gauge(&self, meter: Meter) -> Option<&Gauge> {
        match meter {
            Meter::Resolve => Some(&self.resolve),
            Meter::Nerve => Some(&self.nerve),
            Meter::Vitality => match &self.body {
                VisitorBody::Solitary { vitality } => Some(vitality),
                VisitorBody::Party { .. } => None,
            },
            _ => None,
        }
    }
}
