//! Error types for exploration sessions.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExplorationError>;

/// Errors surfaced by the session driver and the session store.
///
/// Each variant corresponds to a distinct client-facing outcome. Use
/// [`ExplorationError::status_code`] to map an error onto an HTTP response and
/// [`ExplorationError::is_retryable`] to decide whether a caller may retry the
/// same request.
#[derive(Debug, Error)]
pub enum ExplorationError {
    /// No dimension catalog exists for the requested subject category.
    #[error("subject category '{0}' is not supported")]
    UnsupportedCategory(String),

    /// A session or subject does not exist (or is not visible to the caller).
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The session already reached its terminal state.
    #[error("session '{0}' is already completed")]
    AlreadyCompleted(String),

    /// A concurrent modification won the race for this session.
    #[error("session '{0}' was modified concurrently")]
    Conflict(String),

    /// The insight generator failed or timed out.
    #[error("insight generation unavailable: {0}")]
    GenerationUnavailable(#[from] GenerationError),

    /// The underlying database failed.
    #[error("session store unavailable: {0}")]
    StoreUnavailable(#[from] DbErr),

    /// A persisted JSON column could not be decoded.
    #[error("failed to decode stored {column}: {message}")]
    Decode {
        column: &'static str,
        message: String,
    },
}

impl ExplorationError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn decode(column: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            column,
            message: err.to_string(),
        }
    }

    /// Maps a database error raised while writing a transcript row.
    ///
    /// A duplicate `(session_id, order_index)` means another writer appended to
    /// the same session first.
    pub(crate) fn from_append(session_id: &str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(session_id.to_string()),
            _ => Self::StoreUnavailable(err),
        }
    }

    /// Whether the same request may succeed if retried (after re-fetching state).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Conflict(_) | Self::GenerationUnavailable(_) | Self::StoreUnavailable(_)
        )
    }

    /// HTTP-equivalent status code for the request layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedCategory(_) => 400,
            Self::NotFound { .. } => 404,
            Self::AlreadyCompleted(_) | Self::Conflict(_) => 409,
            Self::GenerationUnavailable(_) | Self::StoreUnavailable(_) => 503,
            Self::Decode { .. } => 500,
        }
    }
}

/// Failure reported by an [`InsightGenerator`](crate::insight::InsightGenerator).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("generation service failed: {0}")]
    Service(String),

    #[error("generation service returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Service(_) => "service",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Failure reported by a [`CompletionHook`](crate::hook::CompletionHook).
///
/// Hook failures are logged and never roll back a completed session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("completion hook '{hook}' failed: {message}")]
pub struct CompletionHookError {
    pub hook: &'static str,
    pub message: String,
}
