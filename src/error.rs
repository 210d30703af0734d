//! Unified error handling for TensorPlan
//!
//! This module provides a crate-level error type that consolidates the
//! module-specific errors, with categorization so callers can decide whether
//! a failure is actionable by the user, worth retrying with a bigger planner,
//! or a setup problem.

use std::fmt;

use crate::logging::LoggingError;
use crate::planner::PlannerError;

/// Unified error type for TensorPlan
///
/// Wraps the module-specific errors so applications can hold one error type
/// at their boundary and still match on the underlying condition.
#[derive(Debug, thiserror::Error)]
pub enum TensorPlanError {
    /// Planner operation failed
    #[error(transparent)]
    Planner(#[from] PlannerError),

    /// Logging initialization failed
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl TensorPlanError {
    /// Categorize the error for handling decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            // An out-of-range index is the caller's bug to fix.
            TensorPlanError::Planner(PlannerError::IndexOutOfRange { .. }) => ErrorCategory::User,
            // A full planner can be retried with a larger capacity.
            TensorPlanError::Planner(PlannerError::CapacityExceeded { .. }) => {
                ErrorCategory::Recoverable
            }
            TensorPlanError::Logging(_) => ErrorCategory::Config,
        }
    }

    /// Check if this error is recoverable (retry with different resources)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Recoverable)
    }

    /// Check if this is a user-facing error (actionable by users)
    pub fn is_user_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::User)
    }
}

/// Error category for handling decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User error - invalid input
    User,
    /// Recoverable error - retry with more capacity
    Recoverable,
    /// Configuration error - environment or setup issue
    Config,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::User => write!(f, "User"),
            ErrorCategory::Recoverable => write!(f, "Recoverable"),
            ErrorCategory::Config => write!(f, "Config"),
        }
    }
}

/// Result alias using the unified error type
pub type PlanResult<T> = std::result::Result<T, TensorPlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err: TensorPlanError = PlannerError::IndexOutOfRange { index: 9, count: 2 }.into();
        assert_eq!(err.category(), ErrorCategory::User);
        assert!(err.is_user_error());
        assert!(!err.is_recoverable());

        let err: TensorPlanError = PlannerError::CapacityExceeded { capacity: 16 }.into();
        assert_eq!(err.category(), ErrorCategory::Recoverable);
        assert!(err.is_recoverable());
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_error_display_passes_through() {
        let err: TensorPlanError = PlannerError::CapacityExceeded { capacity: 16 }.into();
        assert_eq!(err.to_string(), "too many buffers (capacity is 16)");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::User.to_string(), "User");
        assert_eq!(ErrorCategory::Recoverable.to_string(), "Recoverable");
        assert_eq!(ErrorCategory::Config.to_string(), "Config");
    }
}
