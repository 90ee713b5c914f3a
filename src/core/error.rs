use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourtError {
    #[error("invalid card '{card}': {reason}")]
    InvalidCard { card: String, reason: String },

    #[error("invalid encounter '{encounter}': {reason}")]
    InvalidEncounter { encounter: String, reason: String },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("engine is not awaiting input for {0}")]
    NotAwaitingInput(crate::core::types::Side),

    #[error("rejected card queue: {0}")]
    QueueRejected(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CourtError>;
