//! Custom error types for tally
//!
//! Defines the error taxonomy for the application using thiserror. The
//! taxonomy matters to callers: validation and not-found errors are
//! correctable, an unsupported ledger-entry kind is data corruption, and
//! a transition error always means the atomic unit was rolled back.

use thiserror::Error;

/// The main error type for tally operations
#[derive(Error, Debug)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user-supplied data; nothing was mutated
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity absent
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A stored ledger entry carries a kind tag this build does not
    /// recognize. Treated as data corruption, not user error.
    #[error("Unsupported ledger entry kind: '{0}'")]
    UnsupportedKind(String),

    /// A pending/paid transition failed partway. The atomic unit was
    /// rolled back before this was raised; the cause is preserved.
    #[error("Transition failed: {source}")]
    Transition {
        #[source]
        source: Box<TallyError>,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TallyError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for ledger entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Ledger entry",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for incomes
    pub fn income_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Income",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budget items
    pub fn budget_item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget item",
            identifier: identifier.into(),
        }
    }

    /// Wrap a lower-level failure as a transition failure
    pub fn transition(source: TallyError) -> Self {
        Self::Transition {
            source: Box::new(source),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a transition failure
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for tally operations
pub type TallyResult<T> = Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TallyError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = TallyError::account_not_found("Checking");
        assert_eq!(err.to_string(), "Account not found: Checking");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unsupported_kind_display() {
        let err = TallyError::UnsupportedKind("sideways".into());
        assert_eq!(err.to_string(), "Unsupported ledger entry kind: 'sideways'");
    }

    #[test]
    fn test_transition_preserves_cause() {
        let cause = TallyError::Validation("amount must be positive".into());
        let err = TallyError::transition(cause);
        assert!(err.is_transition());
        assert_eq!(
            err.to_string(),
            "Transition failed: Validation error: amount must be positive"
        );
        // The cause is reachable through the error chain
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(
            source.to_string(),
            "Validation error: amount must be positive"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let tally_err: TallyError = io_err.into();
        assert!(matches!(tally_err, TallyError::Io(_)));
    }
}
