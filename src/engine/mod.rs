//! Encounter resolution engine
//!
//! State machine core: side state, conditions, card resolution, trust
//! negotiation, traps, turn scheduling, win evaluation, and the external
//! event/snapshot surface.

pub mod condition;
pub mod context;
pub mod events;
pub mod negotiation;
pub mod resolver;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod traps;
pub mod victory;

pub use context::EncounterContext;
pub use events::{PlayAction, QueuedPlay, StepEvent, StepEventKind};
pub use scheduler::{ControlMode, EncounterEngine};
pub use snapshot::Snapshot;
pub use victory::{Outcome, WinCondition};
