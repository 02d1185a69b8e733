// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeldError {
    #[error("invalid thresholds JSON: {0}")]
    ThresholdJson(String),

    #[error(
        "conflicting duplicate element '{fqn}' in {document}: same identity reported at different source locations"
    )]
    ConflictingElement { document: String, fqn: String },

    #[error("Regex error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, MeldError>;
