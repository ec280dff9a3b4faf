//! User store error types

use crate::tool::{FailureKind, ToolError};
use thiserror::Error;

/// Errors raised by a user store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Input rejected before reaching the store
    #[error("{0}")]
    Validation(String),

    /// Store rejected the write (e.g. duplicate email)
    #[error("{0}")]
    Constraint(String),

    /// Could not connect to the store
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other statement failure
    #[error("Store query failed: {0}")]
    Query(String),
}

impl StoreError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            StoreError::Validation(_) => FailureKind::Validation,
            StoreError::Constraint(_) => FailureKind::Constraint,
            StoreError::Unavailable(_) => FailureKind::StoreUnavailable,
            StoreError::Query(_) => FailureKind::Store,
        }
    }
}

impl From<StoreError> for ToolError {
    fn from(err: StoreError) -> Self {
        ToolError::new(err.failure_kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_failure_kind() {
        let cases = [
            (StoreError::Validation("x".into()), FailureKind::Validation),
            (StoreError::Constraint("x".into()), FailureKind::Constraint),
            (StoreError::Unavailable("x".into()), FailureKind::StoreUnavailable),
            (StoreError::Query("x".into()), FailureKind::Store),
        ];
        for (err, kind) in cases {
            assert_eq!(ToolError::from(err).kind, kind);
        }
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("unable to open database file".into());
        assert_eq!(
            err.to_string(),
            "Store unavailable: unable to open database file"
        );
    }
}
