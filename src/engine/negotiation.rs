//! Trust-based offer negotiation
//!
//! Each relationship direction (dungeon->visitor, visitor->dungeon) is keyed
//! by the offering side's accumulated trust. The tier gates cost visibility
//! and acceptance odds; acceptance applies benefit, cost (possibly
//! deferred), and the offerer's trust investment, in that order.

use serde::{Deserialize, Serialize};

use crate::ai::profile::AiProfile;
use crate::content::card::{OfferCost, OfferSpec, TestSpec};
use crate::core::types::{Meter, Side};
use crate::engine::condition::{Condition, ConditionKind};
use crate::engine::context::EncounterContext;

/// Trust below this is Transparent
pub const VEILED_TRUST: f32 = 3.0;
/// Trust at or above this auto-accepts
pub const BINDING_TRUST: f32 = 6.0;
/// Fractional trust granted for a refused offer
pub const REFUSAL_TRUST: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    Transparent,
    Veiled,
    Binding,
    CovenantEligible,
}

impl std::fmt::Display for TrustTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TrustTier::Transparent => "transparent",
            TrustTier::Veiled => "veiled",
            TrustTier::Binding => "binding",
            TrustTier::CovenantEligible => "covenant-eligible",
        };
        write!(f, "{}", name)
    }
}

/// Tier for an offer from a side holding `trust`, given the covenant bar
/// (if the relationship has one)
pub fn tier_for(trust: f32, covenant_min: Option<f32>) -> TrustTier {
    if let Some(min_trust) = covenant_min {
        if trust >= min_trust {
            return TrustTier::CovenantEligible;
        }
    }
    if trust >= BINDING_TRUST {
        TrustTier::Binding
    } else if trust >= VEILED_TRUST {
        TrustTier::Veiled
    } else {
        TrustTier::Transparent
    }
}

/// Base acceptance odds before the responder's disposition is applied
pub fn acceptance_probability(tier: TrustTier, cost: &OfferCost) -> f32 {
    match tier {
        TrustTier::Transparent => 0.30,
        TrustTier::Veiled => match cost {
            OfferCost::Flat { .. } => 0.75,
            OfferCost::Binding { .. } => 0.70,
            OfferCost::Exposure { .. } => 0.65,
            OfferCost::Extraction => 0.75,
            OfferCost::Dependency { .. } => 0.60,
        },
        TrustTier::Binding | TrustTier::CovenantEligible => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegotiationOutcome {
    pub accepted: bool,
    pub tier: TrustTier,
    pub sealed_covenant: bool,
}

/// Apply the mechanics of an accepted offer: benefit, cost, investment
pub fn apply_acceptance(ctx: &mut EncounterContext, offerer: Side, offer: &OfferSpec) {
    let recipient = offerer.opponent();

    ctx.apply_meter(offer.benefit.meter, offer.benefit.amount);
    match &offer.cost {
        OfferCost::Flat { meter, amount } => {
            ctx.apply_meter(*meter, -amount);
        }
        OfferCost::Binding {
            meter,
            amount,
            rounds,
        } => {
            ctx.add_condition(Condition::persistent(
                ConditionKind::BindingToll { meter: *meter },
                recipient,
                *amount,
                *rounds,
            ));
        }
        OfferCost::Exposure {
            magnitude,
            duration,
        } => {
            ctx.add_condition(Condition::new(
                ConditionKind::Exposed,
                recipient,
                *magnitude,
                *duration,
            ));
        }
        OfferCost::Extraction => {
            ctx.push_log(format!("the {} yields a confidence", recipient));
        }
        OfferCost::Dependency { amount } => {
            ctx.add_condition(Condition::persistent(
                ConditionKind::DependencyDebt { creditor: offerer },
                recipient,
                *amount,
                u32::MAX,
            ));
        }
    }
    ctx.add_trust(offerer, offer.investment.trust);
}

pub fn apply_refusal(ctx: &mut EncounterContext, offerer: Side) {
    ctx.add_trust(offerer, REFUSAL_TRUST);
    ctx.push_log(format!("the {} declines the offer", offerer.opponent()));
}

/// Resolve an Offer card end to end. The caller is responsible for
/// springing `offer_accepted` traps afterwards, so the investment lands
/// before any trap does.
pub fn resolve_offer(
    ctx: &mut EncounterContext,
    offerer: Side,
    offer: &OfferSpec,
    responder: &AiProfile,
) -> NegotiationOutcome {
    let trust = ctx.held_trust(offerer);
    let covenant_min = offer.covenant_requirement.map(|r| r.min_trust);
    let tier = tier_for(trust, if offer.covenant { covenant_min } else { None });

    let base = acceptance_probability(tier, &offer.cost);
    let odds = if base >= 1.0 {
        1.0
    } else {
        (base * (1.0 + 0.2 * (responder.cooperation_sensitivity - 0.5))).clamp(0.05, 1.0)
    };
    let accepted = odds >= 1.0 || ctx.rng.roll() < odds;

    if accepted {
        apply_acceptance(ctx, offerer, offer);
        let sealed = offer.covenant;
        if sealed {
            ctx.covenant_sealed = true;
            ctx.push_log("the covenant is sealed".to_string());
        }
        ctx.push_log(format!(
            "the {} accepts a {} offer ({} tier)",
            offerer.opponent(),
            describe_cost(&offer.cost),
            tier
        ));
        NegotiationOutcome {
            accepted: true,
            tier,
            sealed_covenant: sealed,
        }
    } else {
        apply_refusal(ctx, offerer);
        NegotiationOutcome {
            accepted: false,
            tier,
            sealed_covenant: false,
        }
    }
}

/// Resolve a Test card once the responder has chosen.
/// Cooperation pays both accumulators at an exposure cost; defection
/// crashes the offerer's trust and arms the defector's next strike.
pub fn resolve_test(
    ctx: &mut EncounterContext,
    offerer: Side,
    test: &TestSpec,
    responder_cooperates: bool,
) {
    let responder = offerer.opponent();
    if responder_cooperates {
        ctx.add_trust(offerer, test.mutual_trust);
        ctx.add_trust(responder, test.mutual_trust);
        ctx.apply_meter(Meter::Veil, -test.exposure_cost);
        ctx.apply_meter(Meter::Nerve, -test.exposure_cost);
        ctx.push_log(format!("the {} reciprocates the test", responder));
    } else {
        ctx.crash_trust(offerer, test.crash_multiplier);
        ctx.add_condition(Condition::new(
            ConditionKind::PowerBonus,
            responder,
            test.defect_power_bonus,
            1,
        ));
        ctx.push_log(format!("the {} turns on the test", responder));
    }
}

fn describe_cost(cost: &OfferCost) -> &'static str {
    match cost {
        OfferCost::Flat { .. } => "flat-cost",
        OfferCost::Binding { .. } => "binding",
        OfferCost::Exposure { .. } => "exposure",
        OfferCost::Extraction => "extraction",
        OfferCost::Dependency { .. } => "dependency",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::profile::ProfileContribution;
    use crate::content::card::{CovenantRequirement, Investment, OfferBenefit};
    use crate::content::scenario::{DungeonTemplate, VisitorBodyTemplate, VisitorTemplate};
    use crate::engine::state::{DungeonState, VisitorState};

    fn solitary_context() -> EncounterContext {
        let dungeon = DungeonState::from_template(&DungeonTemplate {
            structure: 10.0,
            veil: 10.0,
            presence: 10.0,
            base_energy: 3.0,
            profile: ProfileContribution::default(),
        });
        let visitor = VisitorState::from_template(&VisitorTemplate {
            resolve: 10.0,
            nerve: 10.0,
            base_energy: 3.0,
            body: VisitorBodyTemplate::Solitary { vitality: 8.0 },
            profile: ProfileContribution::default(),
        });
        EncounterContext::new(dungeon, visitor, 11)
    }

    fn sweet_offer() -> OfferSpec {
        OfferSpec {
            benefit: OfferBenefit {
                meter: Meter::Vitality,
                amount: 2.0,
            },
            cost: OfferCost::Flat {
                meter: Meter::Resolve,
                amount: 1.0,
            },
            investment: Investment { trust: 1.0 },
            covenant: false,
            covenant_requirement: None,
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for(0.0, None), TrustTier::Transparent);
        assert_eq!(tier_for(2.9, None), TrustTier::Transparent);
        assert_eq!(tier_for(3.0, None), TrustTier::Veiled);
        assert_eq!(tier_for(5.9, None), TrustTier::Veiled);
        assert_eq!(tier_for(6.0, None), TrustTier::Binding);
        assert_eq!(tier_for(9.0, Some(9.0)), TrustTier::CovenantEligible);
        assert_eq!(tier_for(8.9, Some(9.0)), TrustTier::Binding);
    }

    #[test]
    fn test_veiled_offer_arithmetic() {
        // The reference interaction: benefit +2 vitality, flat cost -1
        // resolve, investment +1 at trust 5
        let mut ctx = solitary_context();
        ctx.apply_meter(Meter::Vitality, -4.0); // leave headroom to heal
        ctx.add_trust(Side::Dungeon, 5.0);

        let outcome = resolve_offer(
            &mut ctx,
            Side::Dungeon,
            &sweet_offer(),
            &AiProfile::default(),
        );
        // tier is checked at trust 5, before the investment lands
        assert_eq!(outcome.tier, TrustTier::Veiled);
        if outcome.accepted {
            assert_eq!(ctx.meter_value(Meter::Vitality), 6.0);
            assert_eq!(ctx.meter_value(Meter::Resolve), 9.0);
            assert_eq!(ctx.held_trust(Side::Dungeon), 6.0);
        } else {
            assert_eq!(ctx.held_trust(Side::Dungeon), 5.5);
        }
    }

    #[test]
    fn test_binding_tier_auto_accepts() {
        let mut ctx = solitary_context();
        ctx.apply_meter(Meter::Vitality, -4.0);
        ctx.add_trust(Side::Dungeon, 6.0);
        let outcome = resolve_offer(
            &mut ctx,
            Side::Dungeon,
            &sweet_offer(),
            &AiProfile::default(),
        );
        assert!(outcome.accepted);
        assert_eq!(ctx.held_trust(Side::Dungeon), 7.0);
    }

    #[test]
    fn test_refusal_grants_half_point() {
        let mut ctx = solitary_context();
        apply_refusal(&mut ctx, Side::Visitor);
        assert_eq!(ctx.held_trust(Side::Visitor), REFUSAL_TRUST);
    }

    #[test]
    fn test_binding_cost_defers_as_toll() {
        let mut ctx = solitary_context();
        let offer = OfferSpec {
            benefit: OfferBenefit {
                meter: Meter::Nerve,
                amount: 1.0,
            },
            cost: OfferCost::Binding {
                meter: Meter::Resolve,
                amount: 1.0,
                rounds: 2,
            },
            investment: Investment { trust: 1.0 },
            covenant: false,
            covenant_requirement: None,
        };
        apply_acceptance(&mut ctx, Side::Dungeon, &offer);
        // nothing up front
        assert_eq!(ctx.meter_value(Meter::Resolve), 10.0);
        ctx.tick_conditions();
        assert_eq!(ctx.meter_value(Meter::Resolve), 9.0);
        ctx.tick_conditions();
        assert_eq!(ctx.meter_value(Meter::Resolve), 8.0);
        ctx.tick_conditions();
        assert_eq!(ctx.meter_value(Meter::Resolve), 8.0);
    }

    #[test]
    fn test_covenant_acceptance_seals_bond() {
        let mut ctx = solitary_context();
        ctx.add_trust(Side::Dungeon, 9.0);
        let offer = OfferSpec {
            benefit: OfferBenefit {
                meter: Meter::Nerve,
                amount: 1.0,
            },
            cost: OfferCost::Extraction,
            investment: Investment { trust: 1.0 },
            covenant: true,
            covenant_requirement: Some(CovenantRequirement { min_trust: 9.0 }),
        };
        let outcome = resolve_offer(&mut ctx, Side::Dungeon, &offer, &AiProfile::default());
        assert!(outcome.accepted);
        assert!(outcome.sealed_covenant);
        assert!(ctx.covenant_sealed);
    }

    #[test]
    fn test_defection_crashes_and_arms_defector() {
        let mut ctx = solitary_context();
        ctx.add_trust(Side::Dungeon, 8.0);
        let test = TestSpec {
            mutual_trust: 1.0,
            exposure_cost: 1.0,
            crash_multiplier: 0.25,
            defect_power_bonus: 2.0,
        };
        resolve_test(&mut ctx, Side::Dungeon, &test, false);
        assert_eq!(ctx.held_trust(Side::Dungeon), 2.0);
        assert!(ctx
            .conditions
            .iter()
            .any(|c| matches!(c.kind, ConditionKind::PowerBonus) && c.owner == Side::Visitor));
    }

    #[test]
    fn test_cooperation_pays_both_sides() {
        let mut ctx = solitary_context();
        let test = TestSpec {
            mutual_trust: 1.5,
            exposure_cost: 1.0,
            crash_multiplier: 0.5,
            defect_power_bonus: 2.0,
        };
        resolve_test(&mut ctx, Side::Visitor, &test, true);
        assert_eq!(ctx.held_trust(Side::Dungeon), 1.5);
        assert_eq!(ctx.held_trust(Side::Visitor), 1.5);
        assert_eq!(ctx.meter_value(Meter::Veil), 9.0);
        assert_eq!(ctx.meter_value(Meter::Nerve), 9.0);
    }
}
