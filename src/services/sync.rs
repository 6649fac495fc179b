//! Repository sync for a signed-in account.

use tracing::info;

use super::github::GitHubClient;
use super::provider::{RemoteProvider, fetch_snapshot};
use super::reconciler::Reconciler;
use crate::config::Config;
use crate::db::{DbPool, SeaOrmStore};
use crate::error::AppResult;
use crate::models::{Account, SyncSummary};
use crate::store::LocalStore;

/// Fetch the account's GitHub snapshot and reconcile it into the database.
pub async fn sync_account(
    pool: &DbPool,
    config: &Config,
    account: &Account,
) -> AppResult<SyncSummary> {
    let client = GitHubClient::new(&config.github, account.github_token.clone())?;
    let mut store = SeaOrmStore::new(pool.connection().clone());
    let reconciler = Reconciler::new(config.sync_commit_mode);

    info!("Syncing repositories for '{}'", account.github_login);
    sync_with(&client, &mut store, &reconciler, account).await
}

/// Same as [`sync_account`] with the provider and store supplied by the caller.
pub async fn sync_with<P, S>(
    provider: &P,
    store: &mut S,
    reconciler: &Reconciler,
    account: &Account,
) -> AppResult<SyncSummary>
where
    P: RemoteProvider + ?Sized,
    S: LocalStore + ?Sized,
{
    let snapshot = fetch_snapshot(provider).await?;
    reconciler.reconcile(store, account.id, &snapshot).await
}
