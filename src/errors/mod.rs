use thiserror::Error;

use crate::domain::{MatchId, MatchStatus, Role};

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("match {match_id} cannot move from {from} to {to}")]
    InvalidTransition {
        match_id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    },

    #[error("match {match_id} is {status} and can no longer be changed")]
    MatchClosed { match_id: MatchId, status: MatchStatus },

    #[error("invalid swap: {0}")]
    InvalidSwap(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("actor {actor} ({role}) may not {action}")]
    Forbidden {
        actor: String,
        role: Role,
        action: &'static str,
    },

    #[error("{entity} {id} was modified concurrently (expected version {expected}, found {found})")]
    Conflict {
        entity: &'static str,
        id: String,
        expected: i64,
        found: i64,
    },

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound { .. } => "NotFound",
            EngineError::InvalidTransition { .. } => "InvalidTransition",
            EngineError::MatchClosed { .. } => "MatchClosed",
            EngineError::InvalidSwap(_) => "InvalidSwap",
            EngineError::Validation(_) => "Validation",
            EngineError::Forbidden { .. } => "Forbidden",
            EngineError::Conflict { .. } => "Conflict",
            EngineError::Storage(_) => "Storage",
        }
    }

    /// Infrastructure failures are worth retrying, input problems are not.
    pub fn is_retriable(&self) -> bool {
        matches!(self, EngineError::Storage(_) | EngineError::Conflict { .. })
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::Storage(anyhow::Error::new(err))
    }
}

impl From<r2d2::Error> for EngineError {
    fn from(err: r2d2::Error) -> Self {
        EngineError::Storage(anyhow::Error::new(err).context("Failed to get database connection from pool"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_infrastructure_errors_are_retriable() {
        let storage = EngineError::Storage(anyhow::anyhow!("disk full"));
        let swap = EngineError::InvalidSwap("both starters".into());

        assert!(storage.is_retriable());
        assert!(!swap.is_retriable());
        assert_eq!(swap.kind(), "InvalidSwap");
    }

    #[test]
    fn test_messages_name_the_entity() {
        let err = EngineError::not_found("match", 42);
        assert_eq!(err.to_string(), "match 42 not found");

        let err = EngineError::InvalidTransition {
            match_id: 7,
            from: MatchStatus::Completed,
            to: MatchStatus::Scheduled,
        };
        assert_eq!(err.to_string(), "match 7 cannot move from COMPLETED to SCHEDULED");
    }
}
