//! Card content records
//!
//! Cards are immutable content. Each category carries its own payload shape,
//! so the effect is a tagged variant keyed by `category` rather than one
//! loose record with optional fields everywhere.

use serde::{Deserialize, Serialize};

use crate::core::types::{Meter, Side};

/// Card type, used for attunement discounts and Resonate matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Physical,
    Social,
    Mystical,
    Environmental,
}

/// Keyword modifiers altering strike resolution and defense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Entangle,
    Erode,
    Overwhelm,
    Resonate,
    Drain,
    Ward,
}

/// Card category, used as the AI weight key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    Energy,
    Strike,
    Empower,
    Disrupt,
    Counter,
    React,
    Trap,
    Offer,
    Test,
    Reshape,
}

/// Predicate over encounter state, used by siphon Energy cards and
/// conditional power triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatePredicate {
    MeterBelow { meter: Meter, value: f32 },
    MeterAbove { meter: Meter, value: f32 },
    TrustAtLeast { side: Side, value: f32 },
    RoundAtLeast { round: u32 },
    Afflicted { side: Side },
    Any { of: Vec<StatePredicate> },
    All { of: Vec<StatePredicate> },
}

/// Conditional power bonus on a Strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerTrigger {
    pub when: StatePredicate,
    pub bonus: f32,
}

/// Energy card variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyKind {
    /// Flat gain
    Standard,
    /// Flat gain plus a discount on the next card of the matching type
    Attune,
    /// Larger flat burst
    Surge,
    /// Predicate check: permanent gain on success, one-round gain otherwise
    Siphon,
}

/// Buff attached to the caster's next Strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "boost", rename_all = "snake_case")]
pub enum EmpowerBoost {
    Advantage,
    PowerBonus { amount: f32 },
    GrantKeyword { keyword: Keyword },
}

/// Debuff attached to the opponent's next Strike, or a member guard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hindrance", rename_all = "snake_case")]
pub enum Hindrance {
    Disadvantage,
    StripKeyword { keyword: Keyword },
    Backlash { amount: f32 },
    Guard { member: usize, reduction: f32 },
}

/// Secondary effect of a successful Counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CounterFollowup {
    StealEmpower,
    SpreadFortify { amount: f32, duration: u32 },
    Entangle { magnitude: f32 },
}

/// Reward for a successful React defense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reward", rename_all = "snake_case")]
pub enum ReactReward {
    Fortify { amount: f32, duration: u32 },
    Reflect { fraction: f32 },
}

/// Play events that can spring an armed trap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapTrigger {
    OfferAccepted,
    StrikePlayed,
    CounterPlayed,
    EmpowerPlayed,
}

/// What a sprung trap does to the opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum TrapEffect {
    MeterDamage { meter: Meter, amount: f32 },
    TrustDrain { amount: f32 },
    EnergyTheft { amount: f32 },
}

/// Benefit applied to the recipient of an accepted Offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferBenefit {
    pub meter: Meter,
    pub amount: f32,
}

/// Cost borne by the recipient of an accepted Offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfferCost {
    /// Fixed immediate cost
    Flat { meter: Meter, amount: f32 },
    /// Delayed recurring cost, one toll per round
    Binding { meter: Meter, amount: f32, rounds: u32 },
    /// Vulnerability window: incoming strike damage is amplified
    Exposure { magnitude: f32, duration: u32 },
    /// Informational-only cost
    Extraction,
    /// Large reversal cost if the offerer's trust later crashes
    Dependency { amount: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub trust: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovenantRequirement {
    pub min_trust: f32,
}

/// Offer payload, resolved through the negotiation subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSpec {
    pub benefit: OfferBenefit,
    pub cost: OfferCost,
    pub investment: Investment,
    #[serde(default)]
    pub covenant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covenant_requirement: Option<CovenantRequirement>,
}

/// One-shot prisoner's dilemma payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Trust granted to both accumulators on mutual cooperation
    pub mutual_trust: f32,
    /// Meter cost both sides pay on cooperation (veil / nerve)
    pub exposure_cost: f32,
    /// Fractional multiplier applied to the offerer's trust on defection
    pub crash_multiplier: f32,
    /// Next-strike power bonus granted to the defector
    pub defect_power_bonus: f32,
}

/// Reshape payload: heals, fortifies, or shifts own resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ReshapeSpec {
    Heal { target: Meter, amount: f32 },
    /// Heals the weakest party member, or the caster's lowest meter
    HealWeakest { amount: f32 },
    Fortify { amount: f32, duration: u32 },
    Shift { from: Meter, to: Meter, amount: f32 },
    /// Revives a knocked-out member at a fraction of max vitality
    Restore { fraction: f32 },
}

/// Category-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum CardEffect {
    Energy {
        energy: EnergyKind,
        amount: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        predicate: Option<StatePredicate>,
    },
    Strike {
        power: f32,
        target: Meter,
    },
    Empower {
        boost: EmpowerBoost,
    },
    Disrupt {
        hindrance: Hindrance,
    },
    Counter {
        #[serde(default)]
        chip: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        followup: Option<CounterFollowup>,
    },
    React {
        power: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reward: Option<ReactReward>,
    },
    Trap {
        trigger: TrapTrigger,
        effect: TrapEffect,
    },
    Offer {
        offer: OfferSpec,
    },
    Test {
        test: TestSpec,
    },
    Reshape {
        shape: ReshapeSpec,
    },
}

/// Immutable card content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub kind: CardKind,
    pub cost: f32,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(flatten)]
    pub effect: CardEffect,
    #[serde(
        rename = "power_trigger",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger: Option<PowerTrigger>,
}

impl Card {
    pub fn category(&self) -> CardCategory {
        match self.effect {
            CardEffect::Energy { .. } => CardCategory::Energy,
            CardEffect::Strike { .. } => CardCategory::Strike,
            CardEffect::Empower { .. } => CardCategory::Empower,
            CardEffect::Disrupt { .. } => CardCategory::Disrupt,
            CardEffect::Counter { .. } => CardCategory::Counter,
            CardEffect::React { .. } => CardCategory::React,
            CardEffect::Trap { .. } => CardCategory::Trap,
            CardEffect::Offer { .. } => CardCategory::Offer,
            CardEffect::Test { .. } => CardCategory::Test,
            CardEffect::Reshape { .. } => CardCategory::Reshape,
        }
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Content-level validation for this card as part of `owner`'s deck.
    /// Category payload shape is already enforced by the tagged variant;
    /// this checks cross-field constraints serde cannot see.
    pub fn validate(&self, owner: Side) -> Result<(), String> {
        if self.cost < 0.0 {
            return Err("cost must be non-negative".into());
        }
        match &self.effect {
            CardEffect::Energy { amount, .. } => {
                if *amount <= 0.0 {
                    return Err("energy amount must be positive".into());
                }
            }
            CardEffect::Strike { power, target } => {
                if *power <= 0.0 {
                    return Err("strike power must be positive".into());
                }
                if target.side() != owner.opponent() {
                    return Err(format!("strike target {} belongs to the caster's side", target));
                }
            }
            CardEffect::Disrupt { hindrance } => {
                if let Hindrance::Guard { reduction, .. } = hindrance {
                    if !(0.0..=1.0).contains(reduction) {
                        return Err("guard reduction must be within [0, 1]".into());
                    }
                }
            }
            CardEffect::React { power, .. } => {
                if *power <= 0.0 {
                    return Err("react power must be positive".into());
                }
            }
            CardEffect::Offer { offer } => {
                if offer.benefit.meter.side() != owner.opponent() {
                    return Err("offer benefit must target the recipient's side".into());
                }
                match offer.cost {
                    OfferCost::Flat { meter, .. } | OfferCost::Binding { meter, .. }
                        if meter.side() != owner.opponent() =>
                    {
                        return Err("offer cost must fall on the recipient's side".into());
                    }
                    OfferCost::Binding { rounds, .. } if rounds == 0 => {
                        return Err("binding cost needs at least one round".into());
                    }
                    _ => {}
                }
                if offer.covenant && offer.covenant_requirement.is_none() {
                    return Err("covenant offer is missing covenant_requirement".into());
                }
            }
            CardEffect::Test { test } => {
                if !(0.0..1.0).contains(&test.crash_multiplier) {
                    return Err("crash multiplier must be within [0, 1)".into());
                }
            }
            CardEffect::Reshape { shape } => match shape {
                ReshapeSpec::Heal { target, .. } => {
                    if target.side() != owner {
                        return Err("reshape heal must target the caster's side".into());
                    }
                }
                ReshapeSpec::Shift { from, to, .. } => {
                    if from.side() != owner || to.side() != owner {
                        return Err("reshape shift must stay on the caster's side".into());
                    }
                    if from == to {
                        return Err("reshape shift needs two distinct meters".into());
                    }
                }
                ReshapeSpec::Restore { fraction } => {
                    if !(0.0..=1.0).contains(fraction) {
                        return Err("restore fraction must be within [0, 1]".into());
                    }
                    if owner != Side::Visitor {
                        return Err("restore only applies to a visitor party".into());
                    }
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }
}
