//! Volunteer entity

use serde::{Deserialize, Serialize};

/// Volunteer record
///
/// `password` carries credential material on the way into a store only.
/// Store read paths always return it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl Volunteer {
    /// Create a volunteer with a credential
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(password.into()),
        }
    }

    /// Create a volunteer without credential material
    pub fn redacted(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
        }
    }

    /// Copy of this volunteer with the password stripped
    pub fn without_password(&self) -> Self {
        Self::redacted(self.email.clone())
    }
}
