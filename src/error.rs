//! Error types shared across the quiz core.

use thiserror::Error;

use crate::session::SessionState;

/// Errors emitted by `QuizSession`.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error("question source ran out of questions before the round was complete")]
    QuestionSourceExhausted,
}

/// Errors emitted by statistics stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors emitted while loading question data.
///
/// The `Display` text is shown to the player as-is, so keep it readable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("{0}")]
    Load(String),
    #[error("question data is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors emitted by `SessionCoordinator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoordinatorError {
    #[error("a question load is already in progress")]
    Busy,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by the CSV round log.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
