//! Team validation

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("id is required")]
    EmptyId,

    #[error("id cannot exceed {0} characters")]
    IdTooLong(usize),

    #[error("id cannot contain '/'")]
    InvalidIdCharacters,
}

const MAX_TEAM_ID_LENGTH: usize = 100;

/// Validate a team ID
pub fn validate_team_id(id: &str) -> Result<(), TeamValidationError> {
    if id.is_empty() {
        return Err(TeamValidationError::EmptyId);
    }

    if id.len() > MAX_TEAM_ID_LENGTH {
        return Err(TeamValidationError::IdTooLong(MAX_TEAM_ID_LENGTH));
    }

    // Team ids are used as path segments
    if id.contains('/') {
        return Err(TeamValidationError::InvalidIdCharacters);
    }

    Ok(())
}
