use crate::errors::LeftoversError;

/// Failure of a single `Deletable::delete` attempt.
///
/// The sweeper only retries `DependencyBlocked`; `NotFound` counts as
/// already clean. Everything else is recorded once and never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeleteError {
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Resource is still in use: {message}")]
    DependencyBlocked { message: String },

    #[error("Operation '{operation}' failed: {message}")]
    OperationFailed { operation: String, message: String },

    #[error("Operation '{operation}' timed out after {elapsed_ms}ms")]
    OperationTimedOut { operation: String, elapsed_ms: u64 },

    #[error("Deletion cancelled")]
    Cancelled,

    #[error("Provider request failed: {message}")]
    Provider { message: String },
}

impl DeleteError {
    /// The resource is already gone; treated as a successful delete.
    pub fn is_already_gone(&self) -> bool {
        matches!(self, DeleteError::NotFound { .. })
    }

    /// Another resource still references the target; retryable next pass.
    pub fn is_dependency_blocked(&self) -> bool {
        matches!(self, DeleteError::DependencyBlocked { .. })
    }
}

impl LeftoversError for DeleteError {
    fn error_code(&self) -> &'static str {
        match self {
            DeleteError::NotFound { .. } => "DELETE_NOT_FOUND",
            DeleteError::DependencyBlocked { .. } => "DELETE_DEPENDENCY_BLOCKED",
            DeleteError::OperationFailed { .. } => "DELETE_OPERATION_FAILED",
            DeleteError::OperationTimedOut { .. } => "DELETE_OPERATION_TIMED_OUT",
            DeleteError::Cancelled => "DELETE_CANCELLED",
            DeleteError::Provider { .. } => "DELETE_PROVIDER_ERROR",
        }
    }
}

/// Failure to build a `ResourceSet` for one resource kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListError {
    #[error("Failed to list {resource_type}: {message}")]
    ListFailed {
        resource_type: String,
        message: String,
    },

    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },

    #[error("Listing cancelled")]
    Cancelled,
}

impl LeftoversError for ListError {
    fn error_code(&self) -> &'static str {
        match self {
            ListError::ListFailed { .. } => "LIST_FAILED",
            ListError::InvalidFilter { .. } => "LIST_INVALID_FILTER",
            ListError::Cancelled => "LIST_CANCELLED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ListError::InvalidFilter { .. })
    }
}
