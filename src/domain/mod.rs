//! Domain layer - Core entities, store capability and errors

pub mod error;
pub mod store;
pub mod team;
pub mod volunteer;

pub use error::DomainError;
pub use store::{Store, TeamMemberCounts};
pub use team::Team;
pub use volunteer::Volunteer;
