use thiserror::Error;

use crate::models::EntityKind;

/// A generated record that must not reach the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{kind} field `{field}` must not be empty")]
    EmptyField {
        kind: EntityKind,
        field: &'static str,
    },

    #[error("{kind} field `{field}` is out of range: {value}")]
    OutOfRange {
        kind: EntityKind,
        field: &'static str,
        value: f64,
    },

    #[error("review overall score {overall} is not the mean of its sub-scores ({expected})")]
    OverallMismatch { overall: f64, expected: f64 },

    #[error("{kind} timestamp `{field}` precedes `{other}`")]
    Chronology {
        kind: EntityKind,
        field: &'static str,
        other: &'static str,
    },

    #[error("inconsistent {kind}: {detail}")]
    Inconsistent {
        kind: EntityKind,
        detail: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} already exists: {key}")]
    Conflict { kind: EntityKind, key: String },

    #[error("No transaction is active")]
    NoTransaction,

    #[error("A transaction is already active")]
    TransactionActive,

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the failure is a uniqueness violation the caller may retry around.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
