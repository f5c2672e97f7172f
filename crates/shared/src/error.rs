//! Application-wide error types.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Access denied for the acting role.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The accounting period is closed for the acting role.
    #[error("Period locked: {0}")]
    PeriodLocked(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden(_) => 403,
            Self::PeriodLocked(_) => 423,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::PeriodLocked(_) => "PERIOD_LOCKED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns true when the request was well-formed but refused: the role
    /// lacks the privilege or the period is closed to it.
    #[must_use]
    pub const fn is_denial(&self) -> bool {
        matches!(self, Self::Forbidden(_) | Self::PeriodLocked(_))
    }
}
