use std::io;

use finanz_domain::{DomainError, MonthKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Month not found: {0}")]
    MonthNotFound(MonthKey),
    #[error("Month already exists: {0}")]
    MonthExists(MonthKey),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CoreError {
    /// True for rejections the user can fix by re-entering input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_) | CoreError::Domain(_) | CoreError::MonthExists(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}
