// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheepdogError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("executable not found: {program}: {reason}")]
    ExecutableNotFound { program: String, reason: String },

    #[error("failed to start {program}: {reason}")]
    StartFailed { program: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SheepdogError>;
