//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Round counter within an encounter (1-based once the first round starts)
pub type Round = u32;

/// The two sides of an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Dungeon,
    Visitor,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Dungeon => Side::Visitor,
            Side::Visitor => Side::Dungeon,
        }
    }

    /// Index into per-side arrays
    pub fn index(&self) -> usize {
        match self {
            Side::Dungeon => 0,
            Side::Visitor => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Dungeon => write!(f, "dungeon"),
            Side::Visitor => write!(f, "visitor"),
        }
    }
}

/// Damage meters, three per side. Trust accumulators (rapport/trust) are
/// tracked separately and are not strike targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meter {
    Structure,
    Veil,
    Presence,
    Vitality,
    Resolve,
    Nerve,
}

impl Meter {
    /// Which side this meter belongs to
    pub fn side(&self) -> Side {
        match self {
            Meter::Structure | Meter::Veil | Meter::Presence => Side::Dungeon,
            Meter::Vitality | Meter::Resolve | Meter::Nerve => Side::Visitor,
        }
    }

    /// Where Overwhelm spillover lands when this meter is emptied
    pub fn spill_target(&self) -> Meter {
        match self {
            Meter::Structure => Meter::Veil,
            Meter::Veil => Meter::Presence,
            Meter::Presence => Meter::Structure,
            Meter::Vitality => Meter::Resolve,
            Meter::Resolve => Meter::Nerve,
            Meter::Nerve => Meter::Vitality,
        }
    }

    /// The meter hit by reflected or backlash damage against this side
    pub fn primary(side: Side) -> Meter {
        match side {
            Side::Dungeon => Meter::Structure,
            Side::Visitor => Meter::Vitality,
        }
    }
}

impl std::fmt::Display for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Meter::Structure => "structure",
            Meter::Veil => "veil",
            Meter::Presence => "presence",
            Meter::Vitality => "vitality",
            Meter::Resolve => "resolve",
            Meter::Nerve => "nerve",
        };
        write!(f, "{}", name)
    }
}
