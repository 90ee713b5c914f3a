//! Timed status conditions
//!
//! Conditions attach to a side (or a party member), carry a magnitude and a
//! round duration, and are ticked once per round after both queues resolve.
//! Zero-duration conditions are purged at round end.

use serde::{Deserialize, Serialize};

use crate::content::card::{CardKind, Keyword};
use crate::core::types::{Meter, Side};

/// Whether a condition survives into the next room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionScope {
    PerEncounter,
    Persistent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionKind {
    /// Next strike by the owner resolves at 1.5x power
    Advantage,
    /// Next strike by the owner resolves at 0.5x power
    Disadvantage,
    /// Flat power bonus on the owner's next strike
    PowerBonus,
    /// Owner's next strike gains a keyword
    KeywordGrant { keyword: Keyword },
    /// Owner's next strike loses a keyword
    KeywordStrip { keyword: Keyword },
    /// Owner takes magnitude damage when it next strikes
    Backlash,
    /// The guarded member intercepts strikes at reduced damage
    GuardMember,
    /// Flat reduction of incoming strike damage while active
    Fortify,
    /// Discount on the owner's next card of the matching type
    AttuneDiscount {
        #[serde(rename = "card_kind")]
        kind: CardKind,
    },
    /// One-round energy gain, removed from the pool at round end
    TempEnergy,
    /// Owner's card costs are raised while active
    Entangled,
    /// Damage over time against one of the owner's meters
    Eroding { meter: Meter },
    /// Incoming strike damage is amplified while active
    Exposed,
    /// Recurring cost from an accepted binding offer
    BindingToll { meter: Meter },
    /// Reversal cost that fires if the creditor's trust later crashes
    DependencyDebt { creditor: Side },
}

impl ConditionKind {
    /// Debuffs are what Counter clears and the `afflicted` predicate sees
    pub fn is_debuff(&self) -> bool {
        matches!(
            self,
            ConditionKind::Disadvantage
                | ConditionKind::KeywordStrip { .. }
                | ConditionKind::Backlash
                | ConditionKind::Entangled
                | ConditionKind::Eroding { .. }
                | ConditionKind::Exposed
                | ConditionKind::BindingToll { .. }
                | ConditionKind::DependencyDebt { .. }
        )
    }

    /// Empower-class buffs, the ones a Counter can steal
    pub fn is_empower(&self) -> bool {
        matches!(
            self,
            ConditionKind::Advantage
                | ConditionKind::PowerBonus
                | ConditionKind::KeywordGrant { .. }
        )
    }

    /// Consumed by the owner's next qualifying Strike
    pub fn modifies_next_strike(&self) -> bool {
        matches!(
            self,
            ConditionKind::Advantage
                | ConditionKind::Disadvantage
                | ConditionKind::PowerBonus
                | ConditionKind::KeywordGrant { .. }
                | ConditionKind::KeywordStrip { .. }
                | ConditionKind::Backlash
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    /// The side whose state or next strike this condition modifies
    pub owner: Side,
    /// Party member the condition is pinned to, if any
    #[serde(default)]
    pub member: Option<usize>,
    pub magnitude: f32,
    /// Rounds remaining; decremented at round end
    pub duration: u32,
    pub scope: ConditionScope,
}

impl Condition {
    pub fn new(kind: ConditionKind, owner: Side, magnitude: f32, duration: u32) -> Self {
        Self {
            kind,
            owner,
            member: None,
            magnitude,
            duration,
            scope: ConditionScope::PerEncounter,
        }
    }

    pub fn persistent(kind: ConditionKind, owner: Side, magnitude: f32, duration: u32) -> Self {
        Self {
            scope: ConditionScope::Persistent,
            ..Self::new(kind, owner, magnitude, duration)
        }
    }

    pub fn on_member(mut self, member: usize) -> Self {
        self.member = Some(member);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debuff_and_empower_are_disjoint() {
        let kinds = [
            ConditionKind::Advantage,
            ConditionKind::Disadvantage,
            ConditionKind::PowerBonus,
            ConditionKind::Backlash,
            ConditionKind::Fortify,
            ConditionKind::Entangled,
            ConditionKind::Exposed,
        ];
        for kind in kinds {
            assert!(!(kind.is_debuff() && kind.is_empower()));
        }
    }

    #[test]
    fn test_next_strike_conditions() {
        assert!(ConditionKind::Advantage.modifies_next_strike());
        assert!(ConditionKind::Backlash.modifies_next_strike());
        assert!(!ConditionKind::Fortify.modifies_next_strike());
        assert!(!ConditionKind::Eroding { meter: Meter::Veil }.modifies_next_strike());
    }

    #[test]
    fn test_persistent_builder_sets_scope() {
        let toll = Condition::persistent(
            ConditionKind::BindingToll {
                meter: Meter::Resolve,
            },
            Side::Visitor,
            1.0,
            3,
        );
        assert_eq!(toll.scope, ConditionScope::Persistent);
        let buff = Condition::new(ConditionKind::Advantage, Side::Dungeon, 0.0, 1);
        assert_eq!(buff.scope, ConditionScope::PerEncounter);
    }
}
