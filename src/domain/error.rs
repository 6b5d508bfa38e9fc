use thiserror::Error;

/// Core domain errors
///
/// Store implementations translate every backend failure into one of these
/// variants; nothing backend-specific crosses the store boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Already exists: {message}")]
    AlreadyExists { message: String },

    #[error("Password mismatch")]
    PasswordMismatch,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Expected outcomes of normal operation, not faults worth logging
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Internal { .. } | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Team 'gophers' not found");
        assert_eq!(error.to_string(), "Not found: Team 'gophers' not found");
    }

    #[test]
    fn test_already_exists_error() {
        let error = DomainError::already_exists("Team 'gophers' already exists");
        assert_eq!(
            error.to_string(),
            "Already exists: Team 'gophers' already exists"
        );
    }

    #[test]
    fn test_expected_errors() {
        assert!(DomainError::not_found("x").is_expected());
        assert!(DomainError::already_exists("x").is_expected());
        assert!(DomainError::PasswordMismatch.is_expected());
        assert!(DomainError::validation("x").is_expected());
        assert!(!DomainError::internal("x").is_expected());
        assert!(!DomainError::Cancelled.is_expected());
    }
}
