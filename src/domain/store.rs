//! Store capability shared by every persistence backend

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::team::Team;
use super::volunteer::Volunteer;
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Team ID -> number of recorded memberships.
///
/// Teams without any membership are absent rather than mapped to zero.
pub type TeamMemberCounts = HashMap<String, usize>;

/// Persistence operations used by the API
///
/// Every operation observes `ctx` and fails with [`DomainError::Cancelled`]
/// once it is cancelled. Values returned from read paths never carry a password.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Authenticates the given account, creating it first when the email is unknown.
    ///
    /// Fails with `PasswordMismatch` when the account exists with another password.
    async fn authenticate_or_create(
        &self,
        ctx: &CancellationToken,
        email: &str,
        password: &str,
    ) -> Result<(), DomainError>;

    /// Finds a volunteer by email. Fails with `NotFound` when absent.
    async fn get_volunteer_by_email(
        &self,
        ctx: &CancellationToken,
        email: &str,
    ) -> Result<Volunteer, DomainError>;

    /// Stores a new team verbatim. Fails with `AlreadyExists` on a duplicate id.
    async fn create_team(&self, ctx: &CancellationToken, team: &Team) -> Result<(), DomainError>;

    /// Finds a team by id. Fails with `NotFound` when absent.
    async fn get_team_by_id(&self, ctx: &CancellationToken, id: &str) -> Result<Team, DomainError>;

    /// Adds a volunteer to a team.
    ///
    /// Fails with `NotFound` when the team or the volunteer is unknown and with
    /// `AlreadyExists` when the volunteer is a member already.
    async fn add_team_member(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
        email: &str,
    ) -> Result<(), DomainError>;

    /// Lists current members of a team. Fails with `NotFound` when the team is unknown.
    async fn list_team_members(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
    ) -> Result<Vec<Volunteer>, DomainError>;

    /// Removes a volunteer from a team.
    ///
    /// Fails with `NotFound` when there is no such team or membership.
    async fn remove_team_member(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
        email: &str,
    ) -> Result<(), DomainError>;

    /// Counts memberships per team.
    async fn count_team_members(
        &self,
        ctx: &CancellationToken,
    ) -> Result<TeamMemberCounts, DomainError>;

    /// Fails when the backend is unreachable. No side effects.
    async fn healthcheck(&self, ctx: &CancellationToken) -> Result<(), DomainError>;
}
