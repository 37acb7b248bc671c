use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthzError {
    #[error("Authorization backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authorization backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Tuple has empty fields and cannot be written: {0}")]
    IncompleteTuple(String),

    #[error("Invalid relation filter: {0}")]
    InvalidFilter(String),

    #[error("Authorization model source could not be loaded: {0}")]
    ModelSource(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
