//! Scenario loading and fail-fast validation
//!
//! Malformed content is rejected at load, before any engine is built:
//! serde enforces the per-category payload shapes, and `validate()`
//! catches the cross-field constraints serde cannot express.

use std::fs;
use std::path::Path;

use crate::content::scenario::ScenarioDef;
use crate::core::error::{CourtError, Result};

/// Load a scenario from a TOML or JSON file, validated
pub fn load_scenario(path: &Path) -> Result<ScenarioDef> {
    let text = fs::read_to_string(path)?;
    let scenario = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)?,
        _ => toml::from_str(&text)?,
    };
    validated(scenario)
}

pub fn scenario_from_toml(text: &str) -> Result<ScenarioDef> {
    validated(toml::from_str(text)?)
}

pub fn scenario_from_json(text: &str) -> Result<ScenarioDef> {
    validated(serde_json::from_str(text)?)
}

fn validated(scenario: ScenarioDef) -> Result<ScenarioDef> {
    scenario
        .validate()
        .map_err(CourtError::InvalidScenario)?;
    Ok(scenario)
}
