//! Team domain module
//!
//! Teams are identified by an externally chosen id and are immutable once created.

mod entity;
mod validation;

pub use entity::Team;
pub use validation::{validate_team_id, TeamValidationError};
