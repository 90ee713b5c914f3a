//! Core types and error taxonomy

pub mod error;
pub mod types;

pub use error::{CourtError, Result};
pub use types::{Meter, Round, RunId, Side};
