//! Card, encounter, and scenario content records
//!
//! Immutable declarative content consumed at orchestration start. All of
//! it is serde-backed so external tooling can author scenarios as TOML or
//! JSON; validation fails fast at load.

pub mod card;
pub mod demo;
pub mod encounter;
pub mod loader;
pub mod scenario;

pub use card::{Card, CardCategory, CardKind, Keyword};
pub use encounter::{AutoEffect, Cadence, EncounterConfig, EncounterDef};
pub use loader::load_scenario;
pub use scenario::{DungeonTemplate, ScenarioDef, VisitorTemplate};
