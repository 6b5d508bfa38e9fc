//! Volunteer domain
//!
//! Volunteers are identified by email and own a write-once credential.

mod entity;
mod validation;

pub use entity::Volunteer;
pub use validation::{validate_email, validate_password, VolunteerValidationError};
