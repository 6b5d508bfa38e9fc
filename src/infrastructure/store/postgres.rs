//! PostgreSQL-backed store
//!
//! Requires the `pgcrypto` extension; credentials are hashed in the database
//! with `crypt()` and never leave it.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::cancellable;
use crate::domain::{DomainError, Store, Team, TeamMemberCounts, Volunteer};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Store keeping all data in PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store on top of the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps an integrity-constraint SQLSTATE onto a domain error
fn classify_sqlstate(code: &str, subject: &str) -> Option<DomainError> {
    match code {
        UNIQUE_VIOLATION => Some(DomainError::already_exists(format!(
            "{} already exists",
            subject
        ))),
        FOREIGN_KEY_VIOLATION => Some(DomainError::not_found(format!("{} not found", subject))),
        _ => None,
    }
}

/// Translates a database failure into the domain vocabulary
///
/// Anything that is not a known constraint violation or a missing row is
/// reported as `Internal` and logged with full context.
fn translate_error(err: sqlx::Error, subject: &str) -> DomainError {
    match &err {
        sqlx::Error::RowNotFound => {
            return DomainError::not_found(format!("{} not found", subject));
        }
        sqlx::Error::Database(db_err) => {
            if let Some(domain_err) = db_err
                .code()
                .and_then(|code| classify_sqlstate(code.as_ref(), subject))
            {
                return domain_err;
            }
        }
        _ => {}
    }

    error!(error = %err, subject, "Database query failed");
    DomainError::internal(format!("Failed to query {}: {}", subject, err))
}

#[async_trait]
impl Store for PostgresStore {
    async fn authenticate_or_create(
        &self,
        ctx: &CancellationToken,
        email: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        cancellable(ctx, async {
            // Insert the account, or on conflict compare against the stored hash.
            // The no-op update makes RETURNING yield the existing row. bcrypt reads
            // at most 72 bytes, so it is fed the hex SHA-256 of the password.
            let authenticated: bool = sqlx::query_scalar(
                r#"
                INSERT INTO volunteers (email, password)
                VALUES ($1, crypt(encode(digest($2, 'sha256'), 'hex'), gen_salt('bf')))
                ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
                RETURNING volunteers.password
                    = crypt(encode(digest($2, 'sha256'), 'hex'), volunteers.password)
                "#,
            )
            .bind(email)
            .bind(password)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| translate_error(e, "volunteer"))?;

            if authenticated {
                Ok(())
            } else {
                Err(DomainError::PasswordMismatch)
            }
        })
        .await
    }

    async fn get_volunteer_by_email(
        &self,
        ctx: &CancellationToken,
        email: &str,
    ) -> Result<Volunteer, DomainError> {
        cancellable(ctx, async {
            let email: String = sqlx::query_scalar("SELECT email FROM volunteers WHERE email = $1")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| translate_error(e, "volunteer"))?;

            Ok(Volunteer::redacted(email))
        })
        .await
    }

    async fn create_team(&self, ctx: &CancellationToken, team: &Team) -> Result<(), DomainError> {
        cancellable(ctx, async {
            sqlx::query("INSERT INTO teams (id, name) VALUES ($1, $2)")
                .bind(&team.id)
                .bind(team.name())
                .execute(&self.pool)
                .await
                .map_err(|e| translate_error(e, "team"))?;

            Ok(())
        })
        .await
    }

    async fn get_team_by_id(&self, ctx: &CancellationToken, id: &str) -> Result<Team, DomainError> {
        cancellable(ctx, async {
            let (id, name): (String, Option<String>) =
                sqlx::query_as("SELECT id, name FROM teams WHERE id = $1")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| translate_error(e, "team"))?;

            Ok(Team { id, name })
        })
        .await
    }

    async fn add_team_member(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
        email: &str,
    ) -> Result<(), DomainError> {
        cancellable(ctx, async {
            // Foreign keys reject unknown teams and volunteers
            sqlx::query("INSERT INTO team_members (team_id, volunteer_email) VALUES ($1, $2)")
                .bind(team_id)
                .bind(email)
                .execute(&self.pool)
                .await
                .map_err(|e| translate_error(e, "team member"))?;

            Ok(())
        })
        .await
    }

    async fn list_team_members(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
    ) -> Result<Vec<Volunteer>, DomainError> {
        cancellable(ctx, async {
            // A known team always yields at least one row; NULL marks a team without members
            let rows: Vec<Option<String>> = sqlx::query_scalar(
                r#"
                SELECT tm.volunteer_email
                FROM teams AS t
                LEFT JOIN team_members AS tm ON tm.team_id = t.id
                WHERE t.id = $1
                "#,
            )
            .bind(team_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| translate_error(e, "team members"))?;

            if rows.is_empty() {
                return Err(DomainError::not_found(format!(
                    "Team '{}' not found",
                    team_id
                )));
            }

            Ok(rows.into_iter().flatten().map(Volunteer::redacted).collect())
        })
        .await
    }

    async fn remove_team_member(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
        email: &str,
    ) -> Result<(), DomainError> {
        cancellable(ctx, async {
            let result =
                sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND volunteer_email = $2")
                    .bind(team_id)
                    .bind(email)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| translate_error(e, "team member"))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(format!(
                    "'{}' is not a member of team '{}'",
                    email, team_id
                )));
            }

            Ok(())
        })
        .await
    }

    async fn count_team_members(
        &self,
        ctx: &CancellationToken,
    ) -> Result<TeamMemberCounts, DomainError> {
        cancellable(ctx, async {
            let rows: Vec<(String, i64)> = sqlx::query_as(
                "SELECT team_id, COUNT(*) FROM team_members GROUP BY team_id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| translate_error(e, "team member counts"))?;

            Ok(rows
                .into_iter()
                .map(|(team_id, count)| (team_id, count as usize))
                .collect())
        })
        .await
    }

    async fn healthcheck(&self, ctx: &CancellationToken) -> Result<(), DomainError> {
        cancellable(ctx, async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| translate_error(e, "database"))?;

            Ok(())
        })
        .await
    }
}
