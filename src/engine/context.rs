//! Encounter context
//!
//! The single mutable state record threaded through every resolution call:
//! both side states, active conditions, armed traps, held reactions, and
//! the RNG stream. No module-level state anywhere in the engine.

use serde::{Deserialize, Serialize};

use crate::content::card::{Card, CardKind, StatePredicate, TrapEffect};
use crate::content::scenario::MoralePenalty;
use crate::core::types::{Meter, Round, Side};
use crate::engine::condition::{Condition, ConditionKind, ConditionScope};
use crate::engine::rng::EngineRng;
use crate::engine::state::{DeltaOutcome, DungeonState, EnergyPool, VisitorBody, VisitorState};
use crate::engine::traps::{ArmedTrap, TrapRegistry};

/// A React card held back, waiting to contest an incoming Strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldReaction {
    pub side: Side,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterContext {
    pub round: Round,
    pub dungeon: DungeonState,
    pub visitor: VisitorState,
    pub conditions: Vec<Condition>,
    pub traps: TrapRegistry,
    pub held_reactions: Vec<HeldReaction>,
    pub rng: EngineRng,
    /// Set when a Covenant offer has been accepted
    pub covenant_sealed: bool,
    /// Card kinds each side resolved last round, for Resonate matching
    pub prev_kinds: [Vec<CardKind>; 2],
    pub this_kinds: [Vec<CardKind>; 2],
    #[serde(default)]
    log: Vec<String>,
}

impl EncounterContext {
    pub fn new(dungeon: DungeonState, visitor: VisitorState, seed: u64) -> Self {
        Self {
            round: 0,
            dungeon,
            visitor,
            conditions: Vec::new(),
            traps: TrapRegistry::new(),
            held_reactions: Vec::new(),
            rng: EngineRng::seeded(seed),
            covenant_sealed: false,
            prev_kinds: [Vec::new(), Vec::new()],
            this_kinds: [Vec::new(), Vec::new()],
            log: Vec::new(),
        }
    }

    // ----- logging -----

    pub fn push_log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(round = self.round, "{}", line);
        self.log.push(line);
    }

    pub fn drain_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }

    // ----- meters -----

    pub fn energy(&self, side: Side) -> &EnergyPool {
        match side {
            Side::Dungeon => &self.dungeon.energy,
            Side::Visitor => &self.visitor.energy,
        }
    }

    pub fn energy_mut(&mut self, side: Side) -> &mut EnergyPool {
        match side {
            Side::Dungeon => &mut self.dungeon.energy,
            Side::Visitor => &mut self.visitor.energy,
        }
    }

    /// Current value of a meter; party vitality reads as the standing total
    pub fn meter_value(&self, meter: Meter) -> f32 {
        match meter.side() {
            Side::Dungeon => self.dungeon.gauge(meter).map(|g| g.value).unwrap_or(0.0),
            Side::Visitor => match meter {
                Meter::Vitality => self.visitor.vitality_total(),
                _ => self.visitor.gauge(meter).map(|g| g.value).unwrap_or(0.0),
            },
        }
    }

    /// Clamped mutation of any meter. Party vitality routes damage to the
    /// front member and healing to the weakest standing member.
    pub fn apply_meter(&mut self, meter: Meter, delta: f32) -> DeltaOutcome {
        match meter.side() {
            Side::Dungeon => self
                .dungeon
                .gauge_mut(meter)
                .map(|g| g.apply(delta))
                .unwrap_or(DeltaOutcome::NONE),
            Side::Visitor => {
                if meter == Meter::Vitality && self.visitor.is_party() {
                    if delta < 0.0 {
                        match self.visitor.front_member_index() {
                            Some(index) => self.damage_member(index, -delta),
                            None => DeltaOutcome::NONE,
                        }
                    } else {
                        match self.visitor.weakest_member_index() {
                            Some(index) => self.heal_member(index, delta),
                            None => DeltaOutcome::NONE,
                        }
                    }
                } else {
                    self.visitor
                        .gauge_mut(meter)
                        .map(|g| g.apply(delta))
                        .unwrap_or(DeltaOutcome::NONE)
                }
            }
        }
    }

    /// Damage one party member (or the solitary body), handling knockout
    /// accounting and morale damage on the same step
    pub fn damage_member(&mut self, index: usize, amount: f32) -> DeltaOutcome {
        let mut knockout: Option<(String, MoralePenalty)> = None;
        let outcome = match &mut self.visitor.body {
            VisitorBody::Solitary { vitality } => vitality.apply(-amount),
            VisitorBody::Party {
                members,
                knockout_morale,
                knockouts,
            } => {
                let Some(member) = members.get_mut(index) else {
                    return DeltaOutcome::NONE;
                };
                if member.knocked_out {
                    return DeltaOutcome::NONE;
                }
                let outcome = member.vitality.apply(-amount);
                if outcome.hit_zero {
                    member.knocked_out = true;
                    let ko_index = *knockouts as usize;
                    *knockouts += 1;
                    let penalty = knockout_morale
                        .get(ko_index.min(knockout_morale.len().saturating_sub(1)))
                        .copied()
                        .unwrap_or(MoralePenalty {
                            resolve: 0.0,
                            nerve: 0.0,
                        });
                    knockout = Some((member.name.clone(), penalty));
                }
                outcome
            }
        };
        if let Some((name, penalty)) = knockout {
            self.push_log(format!("{} goes down", name));
            self.visitor.resolve.apply(-penalty.resolve);
            self.visitor.nerve.apply(-penalty.nerve);
        }
        outcome
    }

    pub fn heal_member(&mut self, index: usize, amount: f32) -> DeltaOutcome {
        match &mut self.visitor.body {
            VisitorBody::Solitary { vitality } => vitality.apply(amount),
            VisitorBody::Party { members, .. } => members
                .get_mut(index)
                .filter(|m| !m.knocked_out)
                .map(|m| m.vitality.apply(amount))
                .unwrap_or(DeltaOutcome::NONE),
        }
    }

    /// Revive the first knocked-out member at a fraction of max vitality
    pub fn revive_member(&mut self, fraction: f32) -> Option<String> {
        let name = match &mut self.visitor.body {
            VisitorBody::Solitary { .. } => None,
            VisitorBody::Party {
                members, knockouts, ..
            } => {
                let member = members.iter_mut().find(|m| m.knocked_out)?;
                member.knocked_out = false;
                member.vitality.value = (member.vitality.max * fraction).max(1.0);
                *knockouts = knockouts.saturating_sub(1);
                Some(member.name.clone())
            }
        };
        if let Some(name) = &name {
            self.push_log(format!("{} is back on their feet", name));
        }
        name
    }

    // ----- trust accumulators -----

    /// Trust held by `side` toward its opponent
    pub fn held_trust(&self, side: Side) -> f32 {
        match side {
            Side::Dungeon => self.dungeon.rapport,
            Side::Visitor => self.visitor.trust,
        }
    }

    pub fn add_trust(&mut self, side: Side, delta: f32) {
        let slot = match side {
            Side::Dungeon => &mut self.dungeon.rapport,
            Side::Visitor => &mut self.visitor.trust,
        };
        *slot = (*slot + delta).max(0.0);
    }

    fn set_trust(&mut self, side: Side, value: f32) {
        let slot = match side {
            Side::Dungeon => &mut self.dungeon.rapport,
            Side::Visitor => &mut self.visitor.trust,
        };
        *slot = value.max(0.0);
    }

    /// Multiply a side's accumulated trust down and fire every dependency
    /// debt keyed to that side
    pub fn crash_trust(&mut self, side: Side, multiplier: f32) {
        let before = self.held_trust(side);
        let after = before * multiplier.clamp(0.0, 1.0);
        self.set_trust(side, after);
        self.push_log(format!(
            "{} trust crashes from {:.1} to {:.1}",
            side, before, after
        ));

        let mut fired: Vec<(Side, f32)> = Vec::new();
        self.conditions.retain(|c| match c.kind {
            ConditionKind::DependencyDebt { creditor } if creditor == side => {
                fired.push((c.owner, c.magnitude));
                false
            }
            _ => true,
        });
        for (debtor, magnitude) in fired {
            self.push_log(format!(
                "dependency reversal strikes the {} for {:.1}",
                debtor, magnitude
            ));
            self.apply_meter(Meter::primary(debtor), -magnitude);
        }
    }

    // ----- conditions -----

    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn has_debuff(&self, side: Side) -> bool {
        self.conditions
            .iter()
            .any(|c| c.owner == side && c.kind.is_debuff())
    }

    /// Remove and return every condition modifying `side`'s next strike
    pub fn take_strike_modifiers(&mut self, side: Side) -> Vec<Condition> {
        let mut taken = Vec::new();
        let mut index = 0;
        while index < self.conditions.len() {
            let c = &self.conditions[index];
            if c.owner == side && c.kind.modifies_next_strike() {
                taken.push(self.conditions.remove(index));
            } else {
                index += 1;
            }
        }
        taken
    }

    pub fn remove_first_debuff(&mut self, side: Side) -> Option<Condition> {
        let index = self
            .conditions
            .iter()
            .position(|c| c.owner == side && c.kind.is_debuff())?;
        Some(self.conditions.remove(index))
    }

    /// Transfer the opponent's first empower-class buff to `thief`
    pub fn steal_empower(&mut self, thief: Side) -> Option<ConditionKind> {
        let index = self
            .conditions
            .iter()
            .position(|c| c.owner == thief.opponent() && c.kind.is_empower())?;
        self.conditions[index].owner = thief;
        Some(self.conditions[index].kind.clone())
    }

    pub fn fortify_total(&self, side: Side, member: Option<usize>) -> f32 {
        self.conditions
            .iter()
            .filter(|c| {
                c.owner == side
                    && matches!(c.kind, ConditionKind::Fortify)
                    && (c.member.is_none() || c.member == member)
            })
            .map(|c| c.magnitude)
            .sum()
    }

    pub fn exposed_bonus(&self, side: Side) -> f32 {
        self.conditions
            .iter()
            .filter(|c| c.owner == side && matches!(c.kind, ConditionKind::Exposed))
            .map(|c| c.magnitude)
            .sum()
    }

    pub fn entangle_penalty(&self, side: Side) -> f32 {
        self.conditions
            .iter()
            .filter(|c| c.owner == side && matches!(c.kind, ConditionKind::Entangled))
            .map(|c| c.magnitude)
            .sum()
    }

    /// Discount that would apply to a card of this type, without consuming it
    pub fn peek_attune_discount(&self, side: Side, kind: CardKind) -> f32 {
        self.conditions
            .iter()
            .find(|c| {
                c.owner == side
                    && matches!(&c.kind, ConditionKind::AttuneDiscount { kind: k } if *k == kind)
            })
            .map(|c| c.magnitude)
            .unwrap_or(0.0)
    }

    /// Energy a play of this card would actually cost right now:
    /// printed cost, plus entanglement, minus any attunement discount
    pub fn effective_cost(&self, side: Side, card: &Card) -> f32 {
        (card.cost + self.entangle_penalty(side) - self.peek_attune_discount(side, card.kind))
            .max(0.0)
    }

    /// Consume the first attunement discount matching the card type
    pub fn take_attune_discount(&mut self, side: Side, kind: CardKind) -> f32 {
        let index = self.conditions.iter().position(|c| {
            c.owner == side && matches!(&c.kind, ConditionKind::AttuneDiscount { kind: k } if *k == kind)
        });
        match index {
            Some(index) => self.conditions.remove(index).magnitude,
            None => 0.0,
        }
    }

    /// Active guard on this side, as (member index, damage reduction)
    pub fn active_guard(&self, side: Side) -> Option<(usize, f32)> {
        self.conditions
            .iter()
            .find(|c| c.owner == side && matches!(c.kind, ConditionKind::GuardMember))
            .and_then(|c| c.member.map(|m| (m, c.magnitude)))
    }

    pub fn take_held_reaction(&mut self, side: Side) -> Option<HeldReaction> {
        let index = self.held_reactions.iter().position(|r| r.side == side)?;
        Some(self.held_reactions.remove(index))
    }

    /// Round-end tick: periodic condition damage, duration decrement,
    /// temp-energy expiry, purge of spent conditions
    pub fn tick_conditions(&mut self) {
        let periodic: Vec<(Meter, f32, &'static str)> = self
            .conditions
            .iter()
            .filter_map(|c| match &c.kind {
                ConditionKind::Eroding { meter } => Some((*meter, c.magnitude, "erosion")),
                ConditionKind::BindingToll { meter } => Some((*meter, c.magnitude, "binding toll")),
                _ => None,
            })
            .collect();
        for (meter, amount, what) in periodic {
            self.apply_meter(meter, -amount);
            self.push_log(format!("{} takes {:.1} {}", what, amount, meter));
        }

        let mut expired_energy: Vec<(Side, f32)> = Vec::new();
        for condition in &mut self.conditions {
            if condition.duration > 0 {
                condition.duration -= 1;
            }
            if condition.duration == 0 {
                if let ConditionKind::TempEnergy = condition.kind {
                    expired_energy.push((condition.owner, condition.magnitude));
                }
            }
        }
        for (side, amount) in expired_energy {
            let pool = self.energy_mut(side);
            pool.available = (pool.available - amount).max(0.0);
        }
        self.conditions.retain(|c| c.duration > 0);
    }

    // ----- traps -----

    pub fn apply_trap(&mut self, trap: &ArmedTrap) {
        let victim = trap.owner.opponent();
        self.push_log(format!("trap '{}' springs against the {}", trap.source, victim));
        match &trap.effect {
            TrapEffect::MeterDamage { meter, amount } => {
                if meter.side() == victim {
                    self.apply_meter(*meter, -amount);
                }
            }
            TrapEffect::TrustDrain { amount } => {
                self.add_trust(victim, -amount);
            }
            TrapEffect::EnergyTheft { amount } => {
                let stolen = self.energy(victim).available.min(*amount);
                self.energy_mut(victim).spend(stolen);
                self.energy_mut(trap.owner).gain(stolen);
            }
        }
    }

    // ----- predicates & resonance -----

    pub fn eval_predicate(&self, predicate: &StatePredicate) -> bool {
        match predicate {
            StatePredicate::MeterBelow { meter, value } => self.meter_value(*meter) < *value,
            StatePredicate::MeterAbove { meter, value } => self.meter_value(*meter) > *value,
            StatePredicate::TrustAtLeast { side, value } => self.held_trust(*side) >= *value,
            StatePredicate::RoundAtLeast { round } => self.round >= *round,
            StatePredicate::Afflicted { side } => self.has_debuff(*side),
            StatePredicate::Any { of } => of.iter().any(|p| self.eval_predicate(p)),
            StatePredicate::All { of } => of.iter().all(|p| self.eval_predicate(p)),
        }
    }

    pub fn record_kind(&mut self, side: Side, kind: CardKind) {
        self.this_kinds[side.index()].push(kind);
    }

    /// Did `side` play a card of this type last round?
    pub fn resonates(&self, side: Side, kind: CardKind) -> bool {
        self.prev_kinds[side.index()].contains(&kind)
    }

    pub fn rotate_kinds(&mut self) {
        self.prev_kinds[0] = std::mem::take(&mut self.this_kinds[0]);
        self.prev_kinds[1] = std::mem::take(&mut self.this_kinds[1]);
    }

    // ----- room transitions & stagnation -----

    /// Strip per-encounter residue, keeping meters, trust, and persistent
    /// conditions for the next room
    pub fn carry_into_next_room(&mut self) {
        self.conditions.retain(|c| c.scope == ConditionScope::Persistent);
        self.traps.clear();
        self.held_reactions.clear();
        self.prev_kinds = [Vec::new(), Vec::new()];
        self.this_kinds = [Vec::new(), Vec::new()];
        self.round = 0;
        self.log.clear();
    }

    /// Exact bit-level fingerprint of every meter, for Inert detection
    pub fn fingerprint(&self) -> Vec<u32> {
        let mut bits = vec![
            self.dungeon.structure.value.to_bits(),
            self.dungeon.veil.value.to_bits(),
            self.dungeon.presence.value.to_bits(),
            self.dungeon.rapport.to_bits(),
            self.visitor.resolve.value.to_bits(),
            self.visitor.nerve.value.to_bits(),
            self.visitor.trust.to_bits(),
        ];
        match &self.visitor.body {
            VisitorBody::Solitary { vitality } => bits.push(vitality.value.to_bits()),
            VisitorBody::Party { members, .. } => {
                for member in members {
                    bits.push(member.vitality.value.to_bits());
                    bits.push(member.knocked_out as u32);
                }
            }
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::scenario::{DungeonTemplate, VisitorBodyTemplate, VisitorTemplate};
    use crate::ai::profile::ProfileContribution;

    fn party_context() -> EncounterContext {
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
            body: VisitorBodyTemplate::Party {
                members: vec![
                    crate::content::scenario::MemberTemplate {
                        name: "Skald".into(),
                        vitality: 4.0,
                        cards: Vec::new(),
                        profile: ProfileContribution::default(),
                    },
                    crate::content::scenario::MemberTemplate {
                        name: "Warden".into(),
                        vitality: 6.0,
                        cards: Vec::new(),
                        profile: ProfileContribution::default(),
                    },
                ],
                knockout_morale: vec![
                    MoralePenalty {
                        resolve: 2.0,
                        nerve: 3.0,
                    },
                    MoralePenalty {
                        resolve: 4.0,
                        nerve: 5.0,
                    },
                ],
            },
            profile: ProfileContribution::default(),
        });
        EncounterContext::new(dungeon, visitor, 1)
    }

    #[test]
    fn test_knockout_applies_morale_same_step() {
        let mut ctx = party_context();
        ctx.damage_member(0, 4.0);
        assert_eq!(ctx.visitor.knockouts(), 1);
        assert_eq!(ctx.visitor.resolve.value, 8.0);
        assert_eq!(ctx.visitor.nerve.value, 7.0);
    }

    #[test]
    fn test_knockout_count_never_exceeds_party() {
        let mut ctx = party_context();
        ctx.damage_member(0, 99.0);
        ctx.damage_member(0, 99.0); // already down, must be a no-op
        ctx.damage_member(1, 99.0);
        assert_eq!(ctx.visitor.knockouts(), 2);
        assert_eq!(ctx.visitor.party_size(), Some(2));
    }

    #[test]
    fn test_revive_restores_fractional_vitality() {
        let mut ctx = party_context();
        ctx.damage_member(0, 4.0);
        let name = ctx.revive_member(0.5);
        assert_eq!(name.as_deref(), Some("Skald"));
        assert_eq!(ctx.visitor.knockouts(), 0);
        if let VisitorBody::Party { members, .. } = &ctx.visitor.body {
            assert_eq!(members[0].vitality.value, 2.0);
        }
    }

    #[test]
    fn test_crash_trust_fires_dependency_debt() {
        let mut ctx = party_context();
        ctx.add_trust(Side::Dungeon, 8.0);
        ctx.add_condition(Condition::persistent(
            ConditionKind::DependencyDebt {
                creditor: Side::Dungeon,
            },
            Side::Visitor,
            5.0,
            99,
        ));
        ctx.crash_trust(Side::Dungeon, 0.5);
        assert_eq!(ctx.held_trust(Side::Dungeon), 4.0);
        assert!(ctx.conditions.is_empty());
        // the 5.0 reversal drops the 4-vitality front member
        assert_eq!(ctx.visitor.knockouts(), 1);
        assert_eq!(ctx.visitor.vitality_total(), 6.0);
    }

    #[test]
    fn test_tick_expires_and_purges() {
        let mut ctx = party_context();
        ctx.add_condition(Condition::new(
            ConditionKind::Eroding {
                meter: Meter::Resolve,
            },
            Side::Visitor,
            1.5,
            2,
        ));
        ctx.tick_conditions();
        assert_eq!(ctx.visitor.resolve.value, 8.5);
        assert_eq!(ctx.conditions.len(), 1);
        ctx.tick_conditions();
        assert_eq!(ctx.visitor.resolve.value, 7.0);
        assert!(ctx.conditions.is_empty());
    }

    #[test]
    fn test_temp_energy_expires_with_condition() {
        let mut ctx = party_context();
        ctx.energy_mut(Side::Dungeon).gain(2.0);
        ctx.add_condition(Condition::new(
            ConditionKind::TempEnergy,
            Side::Dungeon,
            2.0,
            1,
        ));
        assert_eq!(ctx.energy(Side::Dungeon).available, 5.0);
        ctx.tick_conditions();
        assert_eq!(ctx.energy(Side::Dungeon).available, 3.0);
    }

    #[test]
    fn test_carry_keeps_only_persistent_conditions(){
        let mut ctx = party_context();
        ctx.add_condition(Condition::new(ConditionKind::Fortify, Side::Visitor, 1.0, 3));
        ctx.add_condition(Condition::persistent(
            ConditionKind::BindingToll {
                meter: Meter::Resolve,
            },
            Side::Visitor,
            1.0,
            3,
        ));
        ctx.carry_into_next_room();
        assert_eq!(ctx.conditions.len(), 1);
        assert!(matches!(
            ctx.conditions[0].kind,
            ConditionKind::BindingToll { .. }
        ));
    }
}
