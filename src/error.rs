use thiserror::Error;

/// Reasons a raw record cannot become an [`Entry`](crate::journal::entry::Entry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("body is not an object")]
    NotAnObject,
    #[error("missing id")]
    MissingId,
    #[error("missing date")]
    MissingDate,
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid lunar_phase: {0}")]
    InvalidLunarPhase(String),
    #[error("invalid privacy: {0}")]
    InvalidPrivacy(String),
    #[error("invalid tag (commas separate tags in filters): {0}")]
    InvalidTag(String),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad payload: {0}")]
    Validation(#[from] ValidationError),
    #[error("store write failed: {0:#}")]
    Store(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("cycle plans invalid: {0}")]
    InvalidCycles(String),
}
