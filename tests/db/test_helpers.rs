//! Shared helpers for database tests.

use std::sync::OnceLock;

use saltci_web_lib::config::Config;
use saltci_web_lib::db::{DbPool, SeaOrmStore, accounts};
use saltci_web_lib::models::{
    Account, OrganizationSnapshot, RemoteOrganization, RemoteRepository, RemoteUser, Snapshot,
};
use secrecy::SecretString;
use uuid::Uuid;

static MIGRATIONS_RUN: OnceLock<()> = OnceLock::new();

/// Create a fresh DB pool. Migrations run only once.
pub async fn create_test_pool() -> DbPool {
    let mut config = Config::from_env().expect(
        "Failed to load config. Ensure RUST_ENV and DATABASE_URL are set, \
         and that PostgreSQL is running.",
    );
    config.database.max_connections = 2;
    config.database.min_connections = 1;

    let pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to database");

    if MIGRATIONS_RUN.get().is_none() {
        pool.run_migrations()
            .await
            .expect("Failed to run migrations");
        let _ = MIGRATIONS_RUN.set(());
    }

    pool
}

/// Base for GitHub ids used by one test. Tests add small offsets to it, so
/// rows from different tests never share a primary key.
pub fn unique_base() -> i64 {
    i64::from(rand::random::<u32>()) * 1000 + 1_000_000
}

/// Sign in a new account with a random GitHub id and token.
pub async fn create_test_account(pool: &DbPool) -> Account {
    let github_id = unique_base();
    let user = RemoteUser {
        id: github_id,
        login: format!("user-{}", github_id),
        gravatar_id: None,
    };
    let token = SecretString::from(format!("gho_{}", Uuid::new_v4().simple()));

    accounts::upsert_from_github(pool.connection(), &user, &token)
        .await
        .expect("Failed to create account")
}

/// A store on its own transaction.
pub fn store(pool: &DbPool) -> SeaOrmStore {
    SeaOrmStore::new(pool.connection().clone())
}

pub fn remote_repo(id: i64, name: &str, admin: bool, organization: Option<i64>) -> RemoteRepository {
    RemoteRepository {
        id,
        name: name.to_string(),
        url: format!("https://github.com/test/{}", name),
        description: None,
        fork: false,
        private: false,
        admin,
        organization,
    }
}

pub fn remote_org(
    id: i64,
    name: Option<&str>,
    repositories: Vec<RemoteRepository>,
) -> OrganizationSnapshot {
    OrganizationSnapshot {
        organization: RemoteOrganization {
            id,
            name: name.map(str::to_string),
            login: format!("org-{}", id),
        },
        repositories,
    }
}

pub fn snapshot(
    organizations: Vec<OrganizationSnapshot>,
    personal_repositories: Vec<RemoteRepository>,
) -> Snapshot {
    Snapshot {
        organizations,
        personal_repositories,
    }
}
