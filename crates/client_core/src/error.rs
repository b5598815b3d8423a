use shared::domain::ContactValidationError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("`{action}` is not available while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("session is still connecting")]
    Transitioning,
    #[error("session has already ended")]
    Closed,
}

#[derive(Debug, Error)]
pub enum GuardianSaveError {
    #[error(transparent)]
    Validation(#[from] ContactValidationError),
    #[error("could not save guardian contact: {0}")]
    Backend(String),
}

impl GuardianSaveError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
