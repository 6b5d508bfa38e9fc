//! In-memory store implementation

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::cancellable;
use crate::domain::{DomainError, Store, Team, TeamMemberCounts, Volunteer};
use crate::infrastructure::auth::{Argon2Hasher, PasswordHasher};

/// All data guarded by the store lock
#[derive(Debug, Default)]
struct Tables {
    /// email -> volunteer, password holding the Argon2 hash
    volunteers: HashMap<String, Volunteer>,
    /// team id -> team
    teams: HashMap<String, Team>,
    /// team id -> member emails
    team_members: HashMap<String, HashSet<String>>,
}

/// Store keeping all data in process memory
///
/// A single reader/writer lock guards all three tables, so existence checks
/// and the mutation they protect happen under the same lock.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    hasher: Arc<dyn PasswordHasher>,
}

impl InMemoryStore {
    /// Create an empty store hashing credentials with Argon2
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(Argon2Hasher::new()))
    }

    /// Create an empty store with a custom password hasher
    pub fn with_hasher(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            hasher,
        }
    }

    async fn read(&self, ctx: &CancellationToken) -> Result<RwLockReadGuard<'_, Tables>, DomainError> {
        cancellable(ctx, async { Ok(self.tables.read().await) }).await
    }

    async fn write(
        &self,
        ctx: &CancellationToken,
    ) -> Result<RwLockWriteGuard<'_, Tables>, DomainError> {
        cancellable(ctx, async { Ok(self.tables.write().await) }).await
    }

    /// Hash on the blocking pool
    async fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn check_password(
        &self,
        password: &str,
        stored_hash: Option<String>,
    ) -> Result<(), DomainError> {
        let hash = stored_hash
            .ok_or_else(|| DomainError::internal("Stored volunteer has no credential"))?;
        let hasher = self.hasher.clone();
        let password = password.to_string();

        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                DomainError::internal(format!("Password verification task failed: {}", e))
            })?;

        if verified {
            Ok(())
        } else {
            Err(DomainError::PasswordMismatch)
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_team(tables: &Tables, team_id: &str) -> Result<(), DomainError> {
    if tables.teams.contains_key(team_id) {
        Ok(())
    } else {
        Err(DomainError::not_found(format!("Team '{}' not found", team_id)))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn authenticate_or_create(
        &self,
        ctx: &CancellationToken,
        email: &str,
        password: &str,
    ) -> Result<(), DomainError> {
        // Credentials are write-once, so a hash seen under the read lock stays valid
        // and can be verified after the lock is released.
        let existing = self
            .read(ctx)
            .await?
            .volunteers
            .get(email)
            .map(|v| v.password.clone());

        if let Some(hash) = existing {
            return self.check_password(password, hash).await;
        }

        let hash = self.hash_password(password).await?;

        let existing = {
            let mut tables = self.write(ctx).await?;

            match tables.volunteers.entry(email.to_string()) {
                Entry::Occupied(entry) => entry.get().password.clone(),
                Entry::Vacant(entry) => {
                    entry.insert(Volunteer::new(email, hash));
                    debug!(email = %email, "Volunteer account created");
                    return Ok(());
                }
            }
        };

        // Lost the race against a concurrent create for the same email
        self.check_password(password, existing).await
    }

    async fn get_volunteer_by_email(
        &self,
        ctx: &CancellationToken,
        email: &str,
    ) -> Result<Volunteer, DomainError> {
        let tables = self.read(ctx).await?;

        tables
            .volunteers
            .get(email)
            .map(Volunteer::without_password)
            .ok_or_else(|| DomainError::not_found(format!("Volunteer '{}' not found", email)))
    }

    async fn create_team(&self, ctx: &CancellationToken, team: &Team) -> Result<(), DomainError> {
        let mut tables = self.write(ctx).await?;

        match tables.teams.entry(team.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::already_exists(format!(
                "Team '{}' already exists",
                team.id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(team.clone());
                Ok(())
            }
        }
    }

    async fn get_team_by_id(&self, ctx: &CancellationToken, id: &str) -> Result<Team, DomainError> {
        let tables = self.read(ctx).await?;

        tables
            .teams
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))
    }

    async fn add_team_member(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
        email: &str,
    ) -> Result<(), DomainError> {
        let mut tables = self.write(ctx).await?;

        ensure_team(&tables, team_id)?;

        if !tables.volunteers.contains_key(email) {
            return Err(DomainError::not_found(format!(
                "Volunteer '{}' not found",
                email
            )));
        }

        // First member creates the set
        let inserted = tables
            .team_members
            .entry(team_id.to_string())
            .or_default()
            .insert(email.to_string());

        if inserted {
            Ok(())
        } else {
            Err(DomainError::already_exists(format!(
                "Volunteer '{}' is already a member of team '{}'",
                email, team_id
            )))
        }
    }

    async fn list_team_members(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
    ) -> Result<Vec<Volunteer>, DomainError> {
        let tables = self.read(ctx).await?;

        ensure_team(&tables, team_id)?;

        let members = tables
            .team_members
            .get(team_id)
            .map(|emails| {
                emails
                    .iter()
                    .filter_map(|email| tables.volunteers.get(email))
                    .map(Volunteer::without_password)
                    .collect()
            })
            .unwrap_or_default();

        Ok(members)
    }

    async fn remove_team_member(
        &self,
        ctx: &CancellationToken,
        team_id: &str,
        email: &str,
    ) -> Result<(), DomainError> {
        let mut tables = self.write(ctx).await?;

        ensure_team(&tables, team_id)?;

        let removed = tables
            .team_members
            .get_mut(team_id)
            .is_some_and(|members| members.remove(email));

        if tables.team_members.get(team_id).is_some_and(HashSet::is_empty) {
            tables.team_members.remove(team_id);
        }

        if removed {
            Ok(())
        } else {
            Err(DomainError::not_found(format!(
                "Volunteer '{}' is not a member of team '{}'",
                email, team_id
            )))
        }
    }

    async fn count_team_members(
        &self,
        ctx: &CancellationToken,
    ) -> Result<TeamMemberCounts, DomainError> {
        let tables = self.read(ctx).await?;

        let counts = tables
            .team_members
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(team_id, members)| (team_id.clone(), members.len()))
            .collect();

        Ok(counts)
    }

    async fn healthcheck(&self, ctx: &CancellationToken) -> Result<(), DomainError> {
        drop(self.read(ctx).await?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::task::JoinSet;

    fn create_store() -> Arc<InMemoryStore> {
        let hasher = Argon2Hasher::with_params(8, 1, 1).unwrap();
        Arc::new(InMemoryStore::with_hasher(Arc::new(hasher)))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contract() {
        crate::infrastructure::store::contract::run_all(create_store()).await;
    }

    #[tokio::test]
    async fn test_password_stored_hashed() {
        let store = create_store();
        let ctx = CancellationToken::new();

        store
            .authenticate_or_create(&ctx, "me@example.com", "secret")
            .await
            .unwrap();

        let tables = store.tables.read().await;
        let stored = tables.volunteers["me@example.com"].password.clone().unwrap();
        assert_ne!(stored, "secret");
        assert!(stored.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_listed_members_are_copies() {
        let store = create_store();
        let ctx = CancellationToken::new();

        store
            .authenticate_or_create(&ctx, "me@example.com", "secret")
            .await
            .unwrap();
        store.create_team(&ctx, &Team::new("gophers", "The Gophers")).await.unwrap();
        store.add_team_member(&ctx, "gophers", "me@example.com").await.unwrap();

        let mut members = store.list_team_members(&ctx, "gophers").await.unwrap();
        members[0].email = "mutated@example.com".to_string();
        members[0].password = Some("mutated".to_string());

        let tables = store.tables.read().await;
        let stored = &tables.volunteers["me@example.com"];
        assert_eq!(stored.email, "me@example.com");
        assert_ne!(stored.password.as_deref(), Some("mutated"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_login_creates_once() {
        let store = create_store();
        let mut tasks = JoinSet::new();

        for _ in 0..16 {
            let store = store.clone();
            tasks.spawn(async move {
                let ctx = CancellationToken::new();
                store
                    .authenticate_or_create(&ctx, "race@example.com", "secret")
                    .await
            });
        }

        while let Some(result) = tasks.join_next().await {
            assert!(result.unwrap().is_ok());
        }

        let tables = store.tables.read().await;
        assert_eq!(tables.volunteers.len(), 1);
    }

    /// Delegates to Argon2 after holding the calling thread
    #[derive(Debug)]
    struct SlowHasher(Argon2Hasher);

    impl PasswordHasher for SlowHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            std::thread::sleep(Duration::from_millis(300));
            self.0.hash(password)
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            std::thread::sleep(Duration::from_millis(300));
            self.0.verify(password, hash)
        }
    }

    #[tokio::test]
    async fn test_hashing_leaves_runtime_responsive() {
        let hasher = SlowHasher(Argon2Hasher::with_params(8, 1, 1).unwrap());
        let store = Arc::new(InMemoryStore::with_hasher(Arc::new(hasher)));

        let login = tokio::spawn({
            let store = store.clone();
            async move {
                let ctx = CancellationToken::new();
                store
                    .authenticate_or_create(&ctx, "slow@example.com", "secret")
                    .await
            }
        });

        let start = std::time::Instant::now();
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() < Duration::from_millis(250));

        assert_eq!(login.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let store = create_store();
        let ctx = CancellationToken::new();
        ctx.cancel();

        let result = store.create_team(&ctx, &Team::new("gophers", "The Gophers")).await;
        assert_eq!(result.unwrap_err(), DomainError::Cancelled);

        let live = CancellationToken::new();
        assert!(store.get_team_by_id(&live, "gophers").await.is_err());
    }

    #[tokio::test]
    async fn test_cancellation_while_waiting_for_lock() {
        let store = create_store();
        let guard = store.tables.write().await;

        let ctx = CancellationToken::new();
        let pending = {
            let store = store.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                store.create_team(&ctx, &Team::new("gophers", "The Gophers")).await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();

        let result = pending.await.unwrap();
        assert_eq!(result.unwrap_err(), DomainError::Cancelled);

        drop(guard);
        assert!(store.tables.read().await.teams.is_empty());
    }

    #[tokio::test]
    async fn test_count_omits_emptied_teams() {
        let store = create_store();
        let ctx = CancellationToken::new();

        store
            .authenticate_or_create(&ctx, "me@example.com", "secret")
            .await
            .unwrap();
        store.create_team(&ctx, &Team::new("gophers", "The Gophers")).await.unwrap();
        store.add_team_member(&ctx, "gophers", "me@example.com").await.unwrap();
        store.remove_team_member(&ctx, "gophers", "me@example.com").await.unwrap();

        let counts = store.count_team_members(&ctx).await.unwrap();
        assert!(counts.is_empty());

        // The team is still usable after its member set was dropped
        store.add_team_member(&ctx, "gophers", "me@example.com").await.unwrap();
        let counts = store.count_team_members(&ctx).await.unwrap();
        assert_eq!(counts.get("gophers"), Some(&1));
    }
}
