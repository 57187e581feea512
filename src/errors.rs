use finanz_config::ConfigError;
use finanz_core::CoreError;
use thiserror::Error;

const STORAGE_NOTICE: &str = "Your data could not be read or saved. Please try again.";

/// Error type surfaced by the [`crate::FinanzApp`] facade.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// True when the user can fix the problem by changing their input.
    pub fn is_validation(&self) -> bool {
        match self {
            AppError::Core(err) => err.is_validation() || matches!(err, CoreError::MonthNotFound(_)),
            AppError::Config(_) => false,
        }
    }

    /// Text for the failure notice. Storage and configuration problems share
    /// one generic message; input problems carry their reason.
    pub fn user_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            STORAGE_NOTICE.to_string()
        }
    }
}

impl From<finanz_domain::DomainError> for AppError {
    fn from(err: finanz_domain::DomainError) -> Self {
        AppError::Core(err.into())
    }
}
