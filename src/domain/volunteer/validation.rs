//! Volunteer validation

use thiserror::Error;

/// Errors that can occur during volunteer validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VolunteerValidationError {
    #[error("email is required")]
    EmptyEmail,

    #[error("email cannot exceed {0} characters")]
    EmailTooLong(usize),

    #[error("password is required")]
    EmptyPassword,
}

const MAX_EMAIL_LENGTH: usize = 254;

/// Validate a volunteer email
pub fn validate_email(email: &str) -> Result<(), VolunteerValidationError> {
    if email.is_empty() {
        return Err(VolunteerValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(VolunteerValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    Ok(())
}

/// Validate a login password
pub fn validate_password(password: &str) -> Result<(), VolunteerValidationError> {
    if password.is_empty() {
        return Err(VolunteerValidationError::EmptyPassword);
    }

    Ok(())
}
