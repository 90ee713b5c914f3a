//! Card effect resolution
//!
//! One function per card category, all driven through the shared
//! `EncounterContext`. Strike resolution follows the fixed keyword order:
//! resonance bonus, base damage, overwhelm spillover, then
//! drain/erode/entangle side effects.

use crate::ai::profile::AiProfile;
use crate::content::card::{
    Card, CardEffect, CounterFollowup, EmpowerBoost, EnergyKind, Hindrance, Keyword, ReactReward,
    ReshapeSpec, StatePredicate, TrapEffect, TrapTrigger,
};
use crate::core::types::{Meter, Side};
use crate::engine::condition::{Condition, ConditionKind};
use crate::engine::context::{EncounterContext, HeldReaction};
use crate::engine::negotiation;
use crate::engine::state::VisitorBody;
use crate::engine::traps::ArmedTrap;

/// Advantage multiplies the next strike's power by this much
const ADVANTAGE_FACTOR: f32 = 1.5;
const DISADVANTAGE_FACTOR: f32 = 0.5;
/// Resonate bonus when the same card type landed last round
const RESONATE_FACTOR: f32 = 1.25;
/// Portion of dealt damage converted to energy by Drain
const DRAIN_RATE: f32 = 0.5;
/// Erode attaches a dot worth this fraction of the strike's printed power
const ERODE_RATE: f32 = 0.25;
const ERODE_ROUNDS: u32 = 2;
const ENTANGLE_COST_PENALTY: f32 = 1.0;
/// Discount on the next card matching an attunement's type
const ATTUNE_DISCOUNT: f32 = 1.0;
/// Ward grants this much fortification after the play resolves
const WARD_FORTIFY: f32 = 1.0;

/// What a resolved play reports back to the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolutionReport {
    /// Set when an offer was accepted, for `offer_accepted` traps
    pub offer_accepted_by: Option<Side>,
}

/// Resolve one queued card for `side`. The responder profile and the
/// precomputed Test response belong to the opposing side.
pub fn resolve_card(
    ctx: &mut EncounterContext,
    side: Side,
    card: &Card,
    responder: &AiProfile,
    test_cooperates: bool,
) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    match &card.effect {
        CardEffect::Energy {
            energy,
            amount,
            predicate,
        } => resolve_energy(ctx, side, card.kind, *energy, *amount, predicate.as_ref()),
        CardEffect::Strike { power, target } => {
            resolve_strike(ctx, side, card, *power, *target);
        }
        CardEffect::Empower { boost } => resolve_empower(ctx, side, boost),
        CardEffect::Disrupt { hindrance } => resolve_disrupt(ctx, side, hindrance),
        CardEffect::Counter { chip, followup } => {
            resolve_counter(ctx, side, *chip, followup.as_ref())
        }
        CardEffect::React { .. } => {
            // React cards are never resolved inline: they wait for a strike
            ctx.held_reactions.push(HeldReaction {
                side,
                card: card.clone(),
            });
            ctx.push_log(format!("the {} holds {} in reserve", side, card.name));
        }
        CardEffect::Trap { trigger, effect } => resolve_trap_arm(ctx, side, card, *trigger, effect),
        CardEffect::Offer { offer } => {
            let outcome = negotiation::resolve_offer(ctx, side, offer, responder);
            if outcome.accepted {
                report.offer_accepted_by = Some(side.opponent());
            }
        }
        CardEffect::Test { test } => {
            negotiation::resolve_test(ctx, side, test, test_cooperates);
        }
        CardEffect::Reshape { shape } => resolve_reshape(ctx, side, shape),
    }

    if card.has_keyword(Keyword::Ward) {
        ctx.add_condition(Condition::new(ConditionKind::Fortify, side, WARD_FORTIFY, 1));
    }
    ctx.record_kind(side, card.kind);
    report
}

fn resolve_energy(
    ctx: &mut EncounterContext,
    side: Side,
    kind: crate::content::card::CardKind,
    energy: EnergyKind,
    amount: f32,
    predicate: Option<&StatePredicate>,
) {
    match energy {
        EnergyKind::Standard | EnergyKind::Surge => {
            ctx.energy_mut(side).gain(amount);
        }
        EnergyKind::Attune => {
            ctx.energy_mut(side).gain(amount);
            ctx.add_condition(Condition::new(
                ConditionKind::AttuneDiscount { kind },
                side,
                ATTUNE_DISCOUNT,
                1,
            ));
        }
        EnergyKind::Siphon => {
            let sated = predicate.map(|p| ctx.eval_predicate(p)).unwrap_or(false);
            if sated {
                ctx.energy_mut(side).raise_base(amount);
                ctx.push_log(format!("the {} siphons {:.1} lasting energy", side, amount));
            } else {
                ctx.energy_mut(side).gain(amount);
                ctx.add_condition(Condition::new(ConditionKind::TempEnergy, side, amount, 1));
            }
        }
    }
}

/// Effective power and keyword set for a strike: conditional trigger,
/// consumed next-strike modifiers, then the resonance multiplier
fn effective_strike(
    ctx: &mut EncounterContext,
    side: Side,
    card: &Card,
    base_power: f32,
) -> (f32, Vec<Keyword>) {
    let mut power = base_power;
    let mut keywords = card.keywords.clone();

    if let Some(trigger) = &card.trigger {
        if ctx.eval_predicate(&trigger.when) {
            power += trigger.bonus;
            ctx.push_log(format!("{} finds its moment (+{:.1})", card.name, trigger.bonus));
        }
    }

    let mut advantage = false;
    let mut disadvantage = false;
    let mut backlash = 0.0;
    for modifier in ctx.take_strike_modifiers(side) {
        match modifier.kind {
            ConditionKind::Advantage => advantage = true,
            ConditionKind::Disadvantage => disadvantage = true,
            ConditionKind::PowerBonus => power += modifier.magnitude,
            ConditionKind::KeywordGrant { keyword } => {
                if !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }
            ConditionKind::KeywordStrip { keyword } => keywords.retain(|k| *k != keyword),
            ConditionKind::Backlash => backlash += modifier.magnitude,
            _ => {}
        }
    }
    if advantage {
        power *= ADVANTAGE_FACTOR;
    }
    if disadvantage {
        power *= DISADVANTAGE_FACTOR;
    }
    if keywords.contains(&Keyword::Resonate) && ctx.resonates(side, card.kind) {
        power *= RESONATE_FACTOR;
        ctx.push_log(format!("{} resonates with last round", card.name));
    }
    if backlash > 0.0 {
        ctx.push_log(format!("the {} suffers {:.1} backlash", side, backlash));
        ctx.apply_meter(Meter::primary(side), -backlash);
    }

    (power, keywords)
}

fn resolve_strike(ctx: &mut EncounterContext, side: Side, card: &Card, power: f32, target: Meter) {
    let defender = side.opponent();
    debug_assert_eq!(target.side(), defender, "strike target belongs to the defender");

    let (power, keywords) = effective_strike(ctx, side, card, power);

    // a held React contests the whole strike; ties favor the defender
    if let Some(reaction) = ctx.take_held_reaction(defender) {
        let (react_power, reward) = match &reaction.card.effect {
            CardEffect::React { power, reward } => (*power, reward.clone()),
            _ => (0.0, None),
        };
        if react_power >= power {
            ctx.push_log(format!(
                "the {} turns {} aside with {}",
                defender, card.name, reaction.card.name
            ));
            match reward {
                Some(ReactReward::Fortify { amount, duration }) => {
                    ctx.add_condition(Condition::new(
                        ConditionKind::Fortify,
                        defender,
                        amount,
                        duration,
                    ));
                }
                Some(ReactReward::Reflect { fraction }) => {
                    let reflected = power * fraction;
                    ctx.push_log(format!("{:.1} is reflected back", reflected));
                    ctx.apply_meter(Meter::primary(side), -reflected);
                }
                None => {}
            }
            return;
        }
        ctx.push_log(format!("{} fails to stop {}", reaction.card.name, card.name));
    }

    let dealt = deal_strike_damage(ctx, defender, target, power, keywords.contains(&Keyword::Overwhelm));
    ctx.push_log(format!("{} hits {} for {:.1}", card.name, target, dealt));

    // keyword side effects come after the damage lands
    if dealt > 0.0 {
        if keywords.contains(&Keyword::Drain) {
            let gained = dealt * DRAIN_RATE;
            ctx.energy_mut(side).gain(gained);
            ctx.push_log(format!("the {} drains {:.1} energy", side, gained));
        }
        if keywords.contains(&Keyword::Erode) {
            ctx.add_condition(Condition::new(
                ConditionKind::Eroding { meter: target },
                defender,
                (power * ERODE_RATE).max(0.5),
                ERODE_ROUNDS,
            ));
        }
        if keywords.contains(&Keyword::Entangle) {
            ctx.add_condition(Condition::new(
                ConditionKind::Entangled,
                defender,
                ENTANGLE_COST_PENALTY,
                1,
            ));
        }
    }
}

/// Damage pipeline: exposure amplification, guard routing, fortification,
/// then the clamped hit with optional overwhelm spillover. Returns the
/// total damage that landed.
fn deal_strike_damage(
    ctx: &mut EncounterContext,
    defender: Side,
    target: Meter,
    raw: f32,
    overwhelm: bool,
) -> f32 {
    let mut amount = raw * (1.0 + ctx.exposed_bonus(defender));

    let mut member: Option<usize> = None;
    if defender == Side::Visitor && target == Meter::Vitality && ctx.visitor.is_party() {
        if let Some((guarded, reduction)) = ctx.active_guard(defender) {
            member = Some(guarded);
            amount *= 1.0 - reduction;
        } else {
            member = ctx.visitor.front_member_index();
        }
    }

    let fortify = ctx.fortify_total(defender, member);
    amount = (amount - fortify).max(0.0);
    if amount <= 0.0 {
        return 0.0;
    }

    let remaining = match member {
        Some(index) => match &ctx.visitor.body {
            VisitorBody::Party { members, .. } => members
                .get(index)
                .filter(|m| !m.knocked_out)
                .map(|m| m.vitality.value)
                .unwrap_or(0.0),
            VisitorBody::Solitary { vitality } => vitality.value,
        },
        None => ctx.meter_value(target),
    };
    let spill = if overwhelm {
        (amount - remaining).max(0.0)
    } else {
        0.0
    };

    match member {
        Some(index) => {
            ctx.damage_member(index, amount);
        }
        None => {
            ctx.apply_meter(target, -amount);
        }
    }

    if spill > 0.0 {
        let secondary = target.spill_target();
        ctx.push_log(format!("{:.1} overwhelms into {}", spill, secondary));
        ctx.apply_meter(secondary, -spill);
    }

    amount.min(remaining) + spill
}

fn resolve_empower(ctx: &mut EncounterContext, side: Side, boost: &EmpowerBoost) {
    let condition = match boost {
        EmpowerBoost::Advantage => Condition::new(ConditionKind::Advantage, side, 0.0, 1),
        EmpowerBoost::PowerBonus { amount } => {
            Condition::new(ConditionKind::PowerBonus, side, *amount, 1)
        }
        EmpowerBoost::GrantKeyword { keyword } => Condition::new(
            ConditionKind::KeywordGrant { keyword: *keyword },
            side,
            0.0,
            1,
        ),
    };
    ctx.add_condition(condition);
}

fn resolve_disrupt(ctx: &mut EncounterContext, side: Side, hindrance: &Hindrance) {
    let opponent = side.opponent();
    match hindrance {
        Hindrance::Disadvantage => {
            ctx.add_condition(Condition::new(ConditionKind::Disadvantage, opponent, 0.0, 1));
        }
        Hindrance::StripKeyword { keyword } => {
            ctx.add_condition(Condition::new(
                ConditionKind::KeywordStrip { keyword: *keyword },
                opponent,
                0.0,
                1,
            ));
        }
        Hindrance::Backlash { amount } => {
            ctx.add_condition(Condition::new(ConditionKind::Backlash, opponent, *amount, 1));
        }
        Hindrance::Guard { member, reduction } => {
            if ctx.visitor.is_party() && side == Side::Visitor {
                ctx.add_condition(
                    Condition::new(ConditionKind::GuardMember, side, *reduction, 1)
                        .on_member(*member),
                );
            } else {
                // no party to guard; falls back to plain fortification
                ctx.add_condition(Condition::new(ConditionKind::Fortify, side, *reduction, 1));
            }
        }
    }
}

fn resolve_counter(
    ctx: &mut EncounterContext,
    side: Side,
    chip: f32,
    followup: Option<&CounterFollowup>,
) {
    if let Some(cleared) = ctx.remove_first_debuff(side) {
        ctx.push_log(format!("the {} shakes off {:?}", side, cleared.kind));
    }
    if chip > 0.0 {
        let opponent = side.opponent();
        ctx.apply_meter(Meter::primary(opponent), -chip);
        ctx.push_log(format!("the counter chips the {} for {:.1}", opponent, chip));
    }
    match followup {
        Some(CounterFollowup::StealEmpower) => {
            if let Some(kind) = ctx.steal_empower(side) {
                ctx.push_log(format!("the {} steals {:?}", side, kind));
            }
        }
        Some(CounterFollowup::SpreadFortify { amount, duration }) => {
            ctx.add_condition(Condition::new(ConditionKind::Fortify, side, *amount, *duration));
        }
        Some(CounterFollowup::Entangle { magnitude }) => {
            ctx.add_condition(Condition::new(
                ConditionKind::Entangled,
                side.opponent(),
                *magnitude,
                1,
            ));
        }
        None => {}
    }
}

fn resolve_trap_arm(
    ctx: &mut EncounterContext,
    side: Side,
    card: &Card,
    trigger: TrapTrigger,
    effect: &TrapEffect,
) {
    ctx.traps.arm(ArmedTrap {
        owner: side,
        trigger,
        effect: effect.clone(),
        armed_round: ctx.round,
        source: card.name.clone(),
    });
    ctx.push_log(format!("the {} sets something in place", side));
}

fn resolve_reshape(ctx: &mut EncounterContext, side: Side, shape: &ReshapeSpec) {
    match shape {
        ReshapeSpec::Heal { target, amount } => {
            ctx.apply_meter(*target, *amount);
            ctx.push_log(format!("the {} restores {:.1} {}", side, amount, target));
        }
        ReshapeSpec::HealWeakest { amount } => match side {
            Side::Visitor if ctx.visitor.is_party() => {
                if let Some(index) = ctx.visitor.weakest_member_index() {
                    ctx.heal_member(index, *amount);
                }
            }
            Side::Visitor => {
                let weakest = [Meter::Vitality, Meter::Resolve, Meter::Nerve]
                    .into_iter()
                    .min_by(|a, b| {
                        ctx.meter_value(*a)
                            .partial_cmp(&ctx.meter_value(*b))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(Meter::Vitality);
                ctx.apply_meter(weakest, *amount);
            }
            Side::Dungeon => {
                let weakest = [Meter::Structure, Meter::Veil, Meter::Presence]
                    .into_iter()
                    .min_by(|a, b| {
                        ctx.meter_value(*a)
                            .partial_cmp(&ctx.meter_value(*b))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(Meter::Structure);
                ctx.apply_meter(weakest, *amount);
            }
        },
        ReshapeSpec::Fortify { amount, duration } => {
            ctx.add_condition(Condition::new(ConditionKind::Fortify, side, *amount, *duration));
        }
        ReshapeSpec::Shift { from, to, amount } => {
            let moved = ctx.meter_value(*from).min(*amount);
            if moved > 0.0 {
                ctx.apply_meter(*from, -moved);
                ctx.apply_meter(*to, moved);
                ctx.push_log(format!("the {} shifts {:.1} from {} to {}", side, moved, from, to));
            }
        }
        ReshapeSpec::Restore { fraction } => {
            if ctx.revive_member(*fraction).is_none() {
                ctx.push_log("nothing to restore".to_string());
            }
        }
    }
}
