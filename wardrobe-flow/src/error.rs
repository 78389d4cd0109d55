use thiserror::Error;

use crate::step::Step;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Invalid transition at {step}: {reason}")]
    InvalidTransition { step: Step, reason: String },

    #[error("Formatter failed: {0}")]
    FormatterFailure(String),

    #[error("Malformed formatter response: {0}")]
    MalformedResponse(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

impl WizardError {
    pub fn invalid(step: Step, reason: impl Into<String>) -> Self {
        Self::InvalidTransition {
            step,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WizardError>;
