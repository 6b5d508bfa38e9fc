//! Behavioural checks every `Store` implementation must pass
//!
//! Identifiers carry a random suffix so the suite can run repeatedly
//! against a persistent database.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::{DomainError, Store, Team};

struct Fixture {
    suffix: String,
}

impl Fixture {
    fn new() -> Self {
        Self {
            suffix: Uuid::new_v4().simple().to_string(),
        }
    }

    fn email(&self, name: &str) -> String {
        format!("{}-{}@example.com", name, self.suffix)
    }

    fn team_id(&self, name: &str) -> String {
        format!("{}-{}", name, self.suffix)
    }
}

pub(crate) async fn run_all(store: Arc<dyn Store>) {
    concurrent_first_login(store.clone()).await;
    concurrent_first_login_single_winner(store.clone()).await;

    let store = &*store;
    authenticate_or_create(store).await;
    long_passwords_compared_in_full(store).await;
    get_volunteer(store).await;
    create_and_get_team(store).await;
    add_and_list_members(store).await;
    remove_members(store).await;
    membership_requires_existing_entities(store).await;
    count_members(store).await;
    healthcheck(store).await;
}

async fn authenticate_or_create(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let email = fx.email("login");

    store.authenticate_or_create(&ctx, &email, "secret").await.unwrap();
    store.authenticate_or_create(&ctx, &email, "secret").await.unwrap();

    let result = store.authenticate_or_create(&ctx, &email, "other").await;
    assert_eq!(result.unwrap_err(), DomainError::PasswordMismatch);

    // The failed attempt must not have overwritten the credential
    store.authenticate_or_create(&ctx, &email, "secret").await.unwrap();
}

async fn long_passwords_compared_in_full(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let email = fx.email("long");
    let prefix = "A".repeat(72);
    let correct = format!("{}correct", prefix);
    let wrong = format!("{}WRONG-password", prefix);

    store.authenticate_or_create(&ctx, &email, &correct).await.unwrap();

    let result = store.authenticate_or_create(&ctx, &email, &wrong).await;
    assert_eq!(result.unwrap_err(), DomainError::PasswordMismatch);

    let result = store.authenticate_or_create(&ctx, &email, &prefix).await;
    assert_eq!(result.unwrap_err(), DomainError::PasswordMismatch);

    store.authenticate_or_create(&ctx, &email, &correct).await.unwrap();
}

const CONCURRENT_LOGINS: usize = 16;

async fn concurrent_first_login(store: Arc<dyn Store>) {
    let fx = Fixture::new();
    let email = fx.email("race");
    let mut tasks = JoinSet::new();

    for _ in 0..CONCURRENT_LOGINS {
        let store = store.clone();
        let email = email.clone();
        tasks.spawn(async move {
            let ctx = CancellationToken::new();
            store.authenticate_or_create(&ctx, &email, "secret").await
        });
    }

    while let Some(result) = tasks.join_next().await {
        assert_eq!(result.unwrap(), Ok(()));
    }

    let ctx = CancellationToken::new();
    let volunteer = store.get_volunteer_by_email(&ctx, &email).await.unwrap();
    assert_eq!(volunteer.email, email);

    store.authenticate_or_create(&ctx, &email, "secret").await.unwrap();
    let result = store.authenticate_or_create(&ctx, &email, "other").await;
    assert_eq!(result.unwrap_err(), DomainError::PasswordMismatch);
}

async fn concurrent_first_login_single_winner(store: Arc<dyn Store>) {
    let fx = Fixture::new();
    let email = fx.email("split");
    let mut tasks = JoinSet::new();

    for i in 0..CONCURRENT_LOGINS {
        let store = store.clone();
        let email = email.clone();
        let password = if i % 2 == 0 { "even" } else { "odd" };
        tasks.spawn(async move {
            let ctx = CancellationToken::new();
            let result = store.authenticate_or_create(&ctx, &email, password).await;
            (password, result)
        });
    }

    let mut winners = HashSet::new();
    let mut mismatches = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            (password, Ok(())) => {
                winners.insert(password);
            }
            (_, Err(DomainError::PasswordMismatch)) => mismatches += 1,
            (_, Err(e)) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(mismatches, CONCURRENT_LOGINS / 2);
}

async fn get_volunteer(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let email = fx.email("me");

    let missing = store.get_volunteer_by_email(&ctx, &email).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    store.authenticate_or_create(&ctx, &email, "secret").await.unwrap();

    let volunteer = store.get_volunteer_by_email(&ctx, &email).await.unwrap();
    assert_eq!(volunteer.email, email);
    assert!(volunteer.password.is_none());
}

async fn create_and_get_team(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let named = Team::new(fx.team_id("gophers"), "The Gophers");
    let unnamed = Team::unnamed(fx.team_id("nameless"));

    let missing = store.get_team_by_id(&ctx, &named.id).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    store.create_team(&ctx, &named).await.unwrap();
    store.create_team(&ctx, &unnamed).await.unwrap();

    let duplicate = store
        .create_team(&ctx, &Team::new(named.id.clone(), "Impostors"))
        .await;
    assert!(matches!(duplicate, Err(DomainError::AlreadyExists { .. })));

    assert_eq!(store.get_team_by_id(&ctx, &named.id).await.unwrap(), named);
    assert_eq!(store.get_team_by_id(&ctx, &unnamed.id).await.unwrap(), unnamed);
}

async fn add_and_list_members(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let team = Team::new(fx.team_id("gophers"), "The Gophers");
    let alice = fx.email("alice");
    let bob = fx.email("bob");

    store.create_team(&ctx, &team).await.unwrap();
    store.authenticate_or_create(&ctx, &alice, "a").await.unwrap();
    store.authenticate_or_create(&ctx, &bob, "b").await.unwrap();

    let empty = store.list_team_members(&ctx, &team.id).await.unwrap();
    assert!(empty.is_empty());

    store.add_team_member(&ctx, &team.id, &alice).await.unwrap();
    store.add_team_member(&ctx, &team.id, &bob).await.unwrap();

    let again = store.add_team_member(&ctx, &team.id, &alice).await;
    assert!(matches!(again, Err(DomainError::AlreadyExists { .. })));

    let members = store.list_team_members(&ctx, &team.id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members.iter().filter(|v| v.email == alice).count(), 1);
    assert_eq!(members.iter().filter(|v| v.email == bob).count(), 1);
    assert!(members.iter().all(|v| v.password.is_none()));
}

async fn remove_members(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let team = Team::new(fx.team_id("gophers"), "The Gophers");
    let email = fx.email("leaver");

    store.create_team(&ctx, &team).await.unwrap();
    store.authenticate_or_create(&ctx, &email, "secret").await.unwrap();

    let never_joined = store.remove_team_member(&ctx, &team.id, &email).await;
    assert!(matches!(never_joined, Err(DomainError::NotFound { .. })));

    store.add_team_member(&ctx, &team.id, &email).await.unwrap();
    store.remove_team_member(&ctx, &team.id, &email).await.unwrap();

    let members = store.list_team_members(&ctx, &team.id).await.unwrap();
    assert!(members.iter().all(|v| v.email != email));

    let twice = store.remove_team_member(&ctx, &team.id, &email).await;
    assert!(matches!(twice, Err(DomainError::NotFound { .. })));

    let unknown_team = store
        .remove_team_member(&ctx, &fx.team_id("unknown"), &email)
        .await;
    assert!(matches!(unknown_team, Err(DomainError::NotFound { .. })));

    // Membership can be re-created after removal
    store.add_team_member(&ctx, &team.id, &email).await.unwrap();
}

async fn membership_requires_existing_entities(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let team = Team::new(fx.team_id("gophers"), "The Gophers");
    let known = fx.email("known");
    let unknown = fx.email("unknown");
    let missing_team = fx.team_id("missing");

    store.create_team(&ctx, &team).await.unwrap();
    store.authenticate_or_create(&ctx, &known, "secret").await.unwrap();

    for email in [&known, &unknown] {
        let result = store.add_team_member(&ctx, &missing_team, email).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    let result = store.add_team_member(&ctx, &team.id, &unknown).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));

    let result = store.list_team_members(&ctx, &missing_team).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

async fn count_members(store: &dyn Store) {
    let fx = Fixture::new();
    let ctx = CancellationToken::new();
    let busy = Team::new(fx.team_id("busy"), "Busy");
    let idle = Team::new(fx.team_id("idle"), "Idle");
    let alice = fx.email("alice");
    let bob = fx.email("bob");

    store.create_team(&ctx, &busy).await.unwrap();
    store.create_team(&ctx, &idle).await.unwrap();
    store.authenticate_or_create(&ctx, &alice, "a").await.unwrap();
    store.authenticate_or_create(&ctx, &bob, "b").await.unwrap();
    store.add_team_member(&ctx, &busy.id, &alice).await.unwrap();
    store.add_team_member(&ctx, &busy.id, &bob).await.unwrap();

    let counts = store.count_team_members(&ctx).await.unwrap();
    assert_eq!(counts.get(&busy.id), Some(&2));
    assert!(!counts.contains_key(&idle.id));
}

async fn healthcheck(store: &dyn Store) {
    let ctx = CancellationToken::new();
    store.healthcheck(&ctx).await.unwrap();
}
