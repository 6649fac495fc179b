//! Reconciler against the SeaORM store: persistence, idempotence and
//! transaction boundaries.

use std::collections::BTreeSet;

use saltci_web_lib::models::{CommitMode, Organization, RemoteOrganization, Repository};
use saltci_web_lib::services::Reconciler;
use saltci_web_lib::store::LocalStore;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_sync_persists_and_resync_is_a_no_op() {
    let pool = create_test_pool().await;
    let account = create_test_account(&pool).await;
    let base = unique_base();
    let org = base + 1;

    let remote = snapshot(
        vec![remote_org(
            org,
            Some("Acme"),
            vec![
                remote_repo(base + 10, "api", true, Some(org)),
                remote_repo(base + 11, "web", true, Some(org)),
                remote_repo(base + 12, "secret", false, Some(org)),
            ],
        )],
        vec![remote_repo(base + 20, "dotfiles", true, None)],
    );
    let reconciler = Reconciler::default();

    let mut first = store(&pool);
    let summary = reconciler
        .reconcile(&mut first, account.id, &remote)
        .await
        .unwrap();
    drop(first);

    assert_eq!(summary.organizations_created, 1);
    assert_eq!(summary.repositories_created, 3);
    assert_eq!(summary.skipped_without_admin, 1);

    let mut check = store(&pool);
    assert_eq!(
        check.account_organizations(account.id).await.unwrap(),
        BTreeSet::from([org])
    );
    assert_eq!(
        check.account_repositories(account.id).await.unwrap(),
        BTreeSet::from([base + 20])
    );
    assert_eq!(
        check.account_managed_repositories(account.id).await.unwrap(),
        BTreeSet::from([base + 10, base + 11, base + 20])
    );
    assert_eq!(
        check.organization_repositories(org).await.unwrap(),
        BTreeSet::from([base + 10, base + 11])
    );
    let api = check.find_repository(base + 10).await.unwrap().unwrap();
    assert!(!api.active);
    assert!(check.find_repository(base + 12).await.unwrap().is_none());
    drop(check);

    let mut second = store(&pool);
    let summary = reconciler
        .reconcile(&mut second, account.id, &remote)
        .await
        .unwrap();

    assert_eq!(summary.changes(), 0, "unexpected changes: {:?}", summary);
}

#[actix_rt::test]
async fn test_failed_account_sync_rolls_back() {
    let pool = create_test_pool().await;
    let account = create_test_account(&pool).await;
    let base = unique_base();

    // The second organization's repository name overflows its column.
    let remote = snapshot(
        vec![
            remote_org(base + 1, None, vec![remote_repo(base + 10, "api", true, Some(base + 1))]),
            remote_org(
                base + 2,
                None,
                vec![remote_repo(base + 20, &"x".repeat(300), true, Some(base + 2))],
            ),
        ],
        vec![],
    );

    let mut sync = store(&pool);
    let result = Reconciler::new(CommitMode::Account)
        .reconcile(&mut sync, account.id, &remote)
        .await;
    drop(sync);

    assert!(result.is_err());

    let mut check = store(&pool);
    assert!(check.find_organization(base + 1).await.unwrap().is_none());
    assert!(check.find_repository(base + 10).await.unwrap().is_none());
    assert!(check.account_organizations(account.id).await.unwrap().is_empty());
    assert!(
        check
            .account_managed_repositories(account.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[actix_rt::test]
async fn test_organization_checkpoint_survives_later_failure() {
    let pool = create_test_pool().await;
    let account = create_test_account(&pool).await;
    let base = unique_base();

    let remote = snapshot(
        vec![
            remote_org(base + 1, None, vec![remote_repo(base + 10, "api", true, Some(base + 1))]),
            remote_org(
                base + 2,
                None,
                vec![remote_repo(base + 20, &"x".repeat(300), true, Some(base + 2))],
            ),
        ],
        vec![],
    );

    let mut sync = store(&pool);
    let result = Reconciler::new(CommitMode::Organization)
        .reconcile(&mut sync, account.id, &remote)
        .await;
    drop(sync);

    assert!(result.is_err());

    let mut check = store(&pool);
    assert!(check.find_organization(base + 1).await.unwrap().is_some());
    assert!(check.find_repository(base + 10).await.unwrap().is_some());
    assert_eq!(
        check.account_organizations(account.id).await.unwrap(),
        BTreeSet::from([base + 1])
    );
    assert_eq!(
        check.account_managed_repositories(account.id).await.unwrap(),
        BTreeSet::from([base + 10])
    );
    assert!(check.find_organization(base + 2).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_edge_inserts_ignore_existing_rows() {
    let pool = create_test_pool().await;
    let account = create_test_account(&pool).await;
    let base = unique_base();
    let org = Organization::from(&RemoteOrganization {
        id: base + 1,
        name: None,
        login: format!("org-{}", base + 1),
    });
    let repo = Repository::first_seen(&remote_repo(base + 10, "api", true, None), None);

    let mut s = store(&pool);
    s.create_organization(&org).await.unwrap();
    s.create_repository(&repo).await.unwrap();
    for _ in 0..2 {
        s.add_membership(account.id, org.id).await.unwrap();
        s.add_followed(account.id, repo.id).await.unwrap();
        s.add_managed(account.id, repo.id).await.unwrap();
    }
    s.commit().await.unwrap();

    // Same edges again from a separate transaction.
    s.add_followed(account.id, repo.id).await.unwrap();
    s.commit().await.unwrap();

    assert_eq!(
        s.account_organizations(account.id).await.unwrap(),
        BTreeSet::from([org.id])
    );
    assert_eq!(
        s.account_repositories(account.id).await.unwrap(),
        BTreeSet::from([repo.id])
    );
    assert_eq!(
        s.account_managed_repositories(account.id).await.unwrap(),
        BTreeSet::from([repo.id])
    );
}
