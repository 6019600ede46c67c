use thiserror::Error;

use catalog::{StoreError, ValidationError};

use super::Phase;
use crate::report::ErrorReport;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Storage error while running {phase}")]
    Store {
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("Generated an invalid record while running {phase}")]
    Invalid {
        phase: Phase,
        #[source]
        source: ValidationError,
    },

    #[error("The last {attempts} attempts to create user {user_id} failed")]
    RetriesExhausted {
        user_id: i64,
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

impl GenerateError {
    /// The phase the run stopped in.
    pub fn phase(&self) -> Phase {
        match self {
            GenerateError::Store { phase, .. } | GenerateError::Invalid { phase, .. } => *phase,
            GenerateError::RetriesExhausted { .. } => Phase::CreateUsers,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::new(self, Some(self.phase().to_string()))
    }
}

/// Attaches the running phase to storage errors.
pub(crate) trait InPhase<T> {
    fn in_phase(self, phase: Phase) -> Result<T, GenerateError>;
}

impl<T> InPhase<T> for Result<T, StoreError> {
    fn in_phase(self, phase: Phase) -> Result<T, GenerateError> {
        self.map_err(|source| GenerateError::Store { phase, source })
    }
}
