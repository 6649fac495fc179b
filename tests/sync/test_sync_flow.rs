//! Fetch-then-reconcile flow against the mock API and the in-memory store.

use std::collections::BTreeSet;

use saltci_web_lib::error::AppError;
use saltci_web_lib::models::{CommitMode, Repository};
use saltci_web_lib::services::{GitHubClient, Reconciler, sync_with};
use saltci_web_lib::store::MemoryStore;
use secrecy::SecretString;
use serde_json::json;

use super::mock_github::{MockGitHub, repo_json};
use super::test_helpers::*;

#[actix_rt::test]
async fn test_first_sync_imports_admin_repositories() {
    let mock = MockGitHub::start(default_state()).await;
    let account = test_account();
    let mut store = MemoryStore::new();

    let summary = sync_with(&client(&mock), &mut store, &Reconciler::default(), &account)
        .await
        .unwrap();

    assert_eq!(summary.organizations_created, 2);
    assert_eq!(summary.organizations_joined, 2);
    assert_eq!(summary.repositories_created, 5);
    assert_eq!(summary.skipped_without_admin, 2);

    assert_eq!(store.memberships(account.id), BTreeSet::from([100, 200]));
    assert_eq!(store.followed(account.id), BTreeSet::from([5, 6]));
    assert_eq!(store.managed(account.id), BTreeSet::from([1, 2, 4, 5, 6]));
    assert_eq!(store.linked_to(100), BTreeSet::from([1, 2]));
    assert_eq!(store.linked_to(200), BTreeSet::from([4]));
    assert!(store.repository(3).is_none());
    assert!(store.repository(7).is_none());
    assert!(store.repositories().all(|r| !r.active));

    assert_eq!(store.organization(200).unwrap().display_name(), "globex");
    assert_eq!(store.organization(100).unwrap().display_name(), "Acme Corp");
    assert_eq!(store.commits(), 1);
}

#[actix_rt::test]
async fn test_resync_without_remote_changes_is_a_no_op() {
    let mock = MockGitHub::start(default_state()).await;
    let account = test_account();
    let mut store = MemoryStore::new();
    let reconciler = Reconciler::default();
    let client = client(&mock);

    sync_with(&client, &mut store, &reconciler, &account)
        .await
        .unwrap();
    let before: Vec<Repository> = store.repositories().cloned().collect();

    let summary = sync_with(&client, &mut store, &reconciler, &account)
        .await
        .unwrap();

    assert_eq!(summary.changes(), 0, "unexpected changes: {:?}", summary);
    let after: Vec<Repository> = store.repositories().cloned().collect();
    assert_eq!(before, after);
}

#[actix_rt::test]
async fn test_remote_changes_are_applied_and_active_survives() {
    let mock = MockGitHub::start(default_state()).await;
    let account = test_account();
    let mut store = MemoryStore::new();
    let reconciler = Reconciler::default();
    let client = client(&mock);

    sync_with(&client, &mut store, &reconciler, &account)
        .await
        .unwrap();

    // The user switches two repositories on.
    for id in [1, 5] {
        let mut repo = store.repository(id).unwrap().clone();
        repo.active = true;
        store.insert_repository(repo);
    }

    // acme drops repo 2 and renames repo 1; alice leaves globex and makes dotfiles private.
    mock.update(|state| {
        let acme = &mut state.orgs[0];
        acme.repos.retain(|r| r["id"] != json!(2));
        acme.repos[0]["name"] = json!("api-v2");
        acme.repos[0]["html_url"] = json!("https://github.com/acme/api-v2");
        state.orgs.truncate(1);
        state.user_repos[0]["private"] = json!(true);
    });

    let summary = sync_with(&client, &mut store, &reconciler, &account)
        .await
        .unwrap();

    let api = store.repository(1).unwrap();
    assert_eq!(api.name, "api-v2");
    assert!(api.active);

    let dotfiles = store.repository(5).unwrap();
    assert!(dotfiles.private);
    assert!(dotfiles.active);

    // Repo 2 is no longer listed under acme: unlinked and no longer managed, row kept.
    assert_eq!(store.repository(2).unwrap().organization_id, None);
    assert_eq!(store.linked_to(100), BTreeSet::from([1]));
    assert_eq!(store.memberships(account.id), BTreeSet::from([100]));
    // globex was left, so repo 4 is no longer confirmed as managed either.
    assert_eq!(store.managed(account.id), BTreeSet::from([1, 5, 6]));
    assert!(store.organization(200).is_some());

    assert_eq!(summary.organizations_left, 1);
    assert_eq!(summary.repositories_updated, 2);
    assert_eq!(summary.repositories_unlinked, 1);
}

#[actix_rt::test]
async fn test_lost_admin_keeps_repository_but_drops_management() {
    let mock = MockGitHub::start(default_state()).await;
    let account = test_account();
    let mut store = MemoryStore::new();
    let reconciler = Reconciler::default();
    let client = client(&mock);

    sync_with(&client, &mut store, &reconciler, &account)
        .await
        .unwrap();

    mock.update(|state| {
        state.user_repos[0] = repo_json(5, "dotfiles-renamed", "alice", "User", false);
    });

    let summary = sync_with(&client, &mut store, &reconciler, &account)
        .await
        .unwrap();

    let dotfiles = store.repository(5).unwrap();
    assert_eq!(dotfiles.name, "dotfiles", "non-admin entries are not updated");
    assert!(store.followed(account.id).contains(&5));
    assert!(!store.managed(account.id).contains(&5));
    assert_eq!(summary.managed_removed, 1);
    assert_eq!(summary.changes(), 1);
}

#[actix_rt::test]
async fn test_provider_failure_leaves_store_untouched() {
    let mock = MockGitHub::start(default_state()).await;
    let account = test_account();
    let mut store = MemoryStore::new();
    let reconciler = Reconciler::new(CommitMode::Organization);

    sync_with(&client(&mock), &mut store, &reconciler, &account)
        .await
        .unwrap();
    let commits = store.commits();
    let before: Vec<Repository> = store.repositories().cloned().collect();

    let revoked = GitHubClient::new(
        &settings(&mock),
        SecretString::from("gho_revoked".to_string()),
    )
    .unwrap();
    let result = sync_with(&revoked, &mut store, &reconciler, &account).await;

    assert!(matches!(result, Err(AppError::Provider(_))));
    assert_eq!(store.commits(), commits);
    let after: Vec<Repository> = store.repositories().cloned().collect();
    assert_eq!(before, after);
    assert_eq!(store.memberships(account.id), BTreeSet::from([100, 200]));
}
