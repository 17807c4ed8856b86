use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Readsmith operations
#[derive(Error, Debug)]
pub enum ReadsmithError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Missing prerequisite file: expected {expected}")]
    MissingPrerequisite { expected: PathBuf },
}

pub type Result<T> = std::result::Result<T, ReadsmithError>;
