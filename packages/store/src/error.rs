//! Error types for the diagram store and repository.

use thiserror::Error;

/// Failure reported by a [`crate::DiagramStore`] backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A uniqueness or foreign-key constraint was violated.
    #[error("constraint violated: {0}")]
    Constraint(String),
    /// The backend could not complete the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors returned by [`crate::Repository`] operations.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Username or password incorrect.")]
    InvalidCredentials,
    #[error("No project selected.")]
    NoProject,
    #[error("Invalid project.")]
    NotAuthorized,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl DiagramError {
    /// HTTP status the error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            DiagramError::NotAuthenticated => 401,
            DiagramError::NotAuthorized => 403,
            DiagramError::InvalidCredentials
            | DiagramError::NoProject
            | DiagramError::InvalidInput(_) => 400,
            DiagramError::Storage(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_client_errors() {
        assert_eq!(DiagramError::NotAuthenticated.status_code(), 401);
        assert_eq!(DiagramError::NotAuthorized.status_code(), 403);
        assert_eq!(DiagramError::NoProject.status_code(), 400);
        assert_eq!(DiagramError::InvalidCredentials.status_code(), 400);
        assert_eq!(
            DiagramError::InvalidInput("class #1 has a non-finite position".into()).status_code(),
            400
        );
    }

    #[test]
    fn test_storage_failure_is_server_error() {
        let err = DiagramError::from(StoreError::Backend("connection reset".into()));
        assert_eq!(err.status_code(), 500);
    }
}
