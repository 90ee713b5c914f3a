//! Armed trap registry
//!
//! Traps are an explicit per-side queue, not an event-subscriber graph.
//! A trap arms when its card resolves and is checked after every
//! subsequent resolved play by either side until it fires once.

use serde::{Deserialize, Serialize};

use crate::content::card::{CardCategory, TrapEffect, TrapTrigger};
use crate::core::types::{Round, Side};

/// A trap that has been played and is waiting for its trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmedTrap {
    pub owner: Side,
    pub trigger: TrapTrigger,
    pub effect: TrapEffect,
    pub armed_round: Round,
    /// Card name, for log lines
    pub source: String,
}

/// Play events the registry is asked about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrapEvent {
    Played { side: Side, category: CardCategory },
    OfferAccepted { recipient: Side },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrapRegistry {
    armed: Vec<ArmedTrap>,
}

impl TrapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, trap: ArmedTrap) {
        self.armed.push(trap);
    }

    pub fn armed(&self) -> &[ArmedTrap] {
        &self.armed
    }

    pub fn armed_by(&self, side: Side) -> usize {
        self.armed.iter().filter(|t| t.owner == side).count()
    }

    /// Remove expired per-encounter traps between rooms
    pub fn clear(&mut self) {
        self.armed.clear();
    }

    fn matches(trap: &ArmedTrap, event: &TrapEvent) -> bool {
        match event {
            TrapEvent::Played { side, category } => {
                if *side != trap.owner.opponent() {
                    return false;
                }
                matches!(
                    (trap.trigger, *category),
                    (TrapTrigger::StrikePlayed, CardCategory::Strike)
                        | (TrapTrigger::CounterPlayed, CardCategory::Counter)
                        | (TrapTrigger::EmpowerPlayed, CardCategory::Empower)
                )
            }
            TrapEvent::OfferAccepted { recipient } => {
                trap.trigger == TrapTrigger::OfferAccepted && *recipient == trap.owner.opponent()
            }
        }
    }

    /// Pull every trap the event springs. Fired traps leave the registry,
    /// so each fires at most once.
    pub fn spring(&mut self, event: &TrapEvent) -> Vec<ArmedTrap> {
        let mut fired = Vec::new();
        let mut index = 0;
        while index < self.armed.len() {
            if Self::matches(&self.armed[index], event) {
                fired.push(self.armed.remove(index));
            } else {
                index += 1;
            }
        }
        fired
    }
}
