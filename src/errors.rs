//! Typed error hierarchy for the demand board.
//!
//! `BoardError` is the taxonomy every core operation reports:
//! - `Validation`: missing/malformed input, rejected before any write
//! - `Forbidden`: cross-tenant or insufficient-role access
//! - `NotFound`: id does not resolve inside the caller's company; a record
//!   owned by another company reports the same message, with `cross_tenant` set
//! - `Storage`: store/transaction failure, never retried here

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("{kind} {id} not found")]
    NotFound {
        kind: &'static str,
        id: i64,
        cross_tenant: bool,
    },

    #[error("Database error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Database task failed: {0}")]
    TaskFailed(String),
}

impl BoardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound {
            kind,
            id,
            cross_tenant: false,
        }
    }

    /// The record exists but belongs to another company. Callers see a plain
    /// "not found"; only the audit trail tells the two apart.
    pub fn not_found_cross_tenant(kind: &'static str, id: i64) -> Self {
        Self::NotFound {
            kind,
            id,
            cross_tenant: true,
        }
    }

    /// Whether the failure came from the store rather than from the request.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::LockPoisoned | Self::TaskFailed(_)
        )
    }
}

impl From<rusqlite::Error> for BoardError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err)
    }
}

pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = BoardError::not_found("Board", 42);
        assert_eq!(err.to_string(), "Board 42 not found");
        assert!(!err.is_storage());

        let hidden = BoardError::not_found_cross_tenant("Board", 42);
        assert_eq!(hidden.to_string(), err.to_string());
    }

    #[test]
    fn rusqlite_errors_become_storage() {
        let err: BoardError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, BoardError::Storage(_)));
        assert!(err.is_storage());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn validation_and_forbidden_are_matchable() {
        match BoardError::validation("title is required") {
            BoardError::Validation(msg) => assert_eq!(msg, "title is required"),
            other => panic!("Expected Validation, got {:?}", other),
        }
        match BoardError::forbidden("other company") {
            BoardError::Forbidden(msg) => assert_eq!(msg, "other company"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
        assert!(BoardError::LockPoisoned.is_storage());
    }
}
