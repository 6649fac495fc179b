//! Account synchronization: diff a GitHub snapshot against the local store
//! and apply the smallest set of changes that makes them agree.
//!
//! Relations are tracked as check-lists. Everything the account had before the
//! sync goes on a list, every entity seen in the snapshot is ticked off, and
//! whatever is left at the end loses its edge. Rows are never deleted and the
//! `active` flag is never touched.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    CommitMode, Organization, RemoteRepository, Repository, RepositoryUpdate, Snapshot,
    SyncSummary,
};
use crate::store::LocalStore;

/// Per-sync bookkeeping.
struct Checklist {
    /// Memberships not yet seen in the snapshot.
    organizations: BTreeSet<i64>,
    /// Followed repositories not yet seen in the snapshot.
    repositories: BTreeSet<i64>,
    /// Followed repositories, including those added during this sync.
    followed: BTreeSet<i64>,
    /// Managed repositories when the sync started.
    managed: BTreeSet<i64>,
    /// Repositories reported with admin permission during this sync.
    admin_confirmed: BTreeSet<i64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    commit_mode: CommitMode,
}

impl Reconciler {
    pub fn new(commit_mode: CommitMode) -> Self {
        Self { commit_mode }
    }

    /// Bring the account's organizations, followed and managed repositories in
    /// line with `snapshot`.
    #[instrument(skip(self, store, snapshot), fields(commit_mode = ?self.commit_mode))]
    pub async fn reconcile<S: LocalStore + ?Sized>(
        &self,
        store: &mut S,
        account_id: Uuid,
        snapshot: &Snapshot,
    ) -> AppResult<SyncSummary> {
        let mut summary = SyncSummary::default();
        let followed = store.account_repositories(account_id).await?;
        let mut checklist = Checklist {
            organizations: store.account_organizations(account_id).await?,
            repositories: followed.clone(),
            followed,
            managed: store.account_managed_repositories(account_id).await?,
            admin_confirmed: BTreeSet::new(),
        };

        for org_snapshot in &snapshot.organizations {
            let remote_org = &org_snapshot.organization;

            if store.find_organization(remote_org.id).await?.is_none() {
                store
                    .create_organization(&Organization::from(remote_org))
                    .await?;
                summary.organizations_created += 1;
            }
            if !checklist.organizations.remove(&remote_org.id) {
                store.add_membership(account_id, remote_org.id).await?;
                summary.organizations_joined += 1;
            }

            let mut org_repositories = store.organization_repositories(remote_org.id).await?;

            for remote in &org_snapshot.repositories {
                org_repositories.remove(&remote.id);
                checklist.repositories.remove(&remote.id);

                if !remote.admin {
                    summary.skipped_without_admin += 1;
                    continue;
                }

                self.upsert_repository(store, remote, Some(remote_org.id), &mut summary)
                    .await?;
                self.confirm_admin(store, account_id, remote.id, &mut checklist, &mut summary)
                    .await?;
            }

            for repository_id in org_repositories {
                store.set_repository_organization(repository_id, None).await?;
                summary.repositories_unlinked += 1;
            }

            if self.commit_mode == CommitMode::Organization {
                store.commit().await?;
                debug!("Checkpoint after organization '{}'", remote_org.login);
            }
        }

        for organization_id in std::mem::take(&mut checklist.organizations) {
            store.remove_membership(account_id, organization_id).await?;
            summary.organizations_left += 1;
        }

        for remote in &snapshot.personal_repositories {
            checklist.repositories.remove(&remote.id);

            if !remote.admin {
                summary.skipped_without_admin += 1;
                continue;
            }

            // Only link to organizations this instance already knows about.
            let organization_id = match remote.organization {
                Some(id) if store.find_organization(id).await?.is_some() => Some(id),
                _ => None,
            };

            self.upsert_repository(store, remote, organization_id, &mut summary)
                .await?;

            if checklist.followed.insert(remote.id) {
                store.add_followed(account_id, remote.id).await?;
                summary.followed_added += 1;
            }

            self.confirm_admin(store, account_id, remote.id, &mut checklist, &mut summary)
                .await?;
        }

        for repository_id in std::mem::take(&mut checklist.repositories) {
            store.remove_followed(account_id, repository_id).await?;
            summary.followed_removed += 1;
            if checklist.managed.remove(&repository_id) {
                store.remove_managed(account_id, repository_id).await?;
                summary.managed_removed += 1;
            }
        }

        for repository_id in checklist.managed.difference(&checklist.admin_confirmed) {
            store.remove_managed(account_id, *repository_id).await?;
            summary.managed_removed += 1;
        }

        store.commit().await?;

        info!(
            changes = summary.changes(),
            skipped_without_admin = summary.skipped_without_admin,
            "Synchronized account {}",
            account_id
        );

        Ok(summary)
    }

    /// Create the repository, or bring its synced fields and organization link
    /// up to date. `active` is left as the user set it.
    async fn upsert_repository<S: LocalStore + ?Sized>(
        &self,
        store: &mut S,
        remote: &RemoteRepository,
        organization_id: Option<i64>,
        summary: &mut SyncSummary,
    ) -> AppResult<()> {
        let Some(existing) = store.find_repository(remote.id).await? else {
            store
                .create_repository(&Repository::first_seen(remote, organization_id))
                .await?;
            summary.repositories_created += 1;
            return Ok(());
        };

        let update = RepositoryUpdate::from(remote);
        if !update.matches(&existing) {
            store.update_repository(remote.id, &update).await?;
            summary.repositories_updated += 1;
        }

        if existing.organization_id != organization_id {
            store
                .set_repository_organization(remote.id, organization_id)
                .await?;
            if organization_id.is_some() {
                summary.repositories_linked += 1;
            } else {
                summary.repositories_unlinked += 1;
            }
        }

        Ok(())
    }

    async fn confirm_admin<S: LocalStore + ?Sized>(
        &self,
        store: &mut S,
        account_id: Uuid,
        repository_id: i64,
        checklist: &mut Checklist,
        summary: &mut SyncSummary,
    ) -> AppResult<()> {
        if !checklist.managed.contains(&repository_id)
            && !checklist.admin_confirmed.contains(&repository_id)
        {
            store.add_managed(account_id, repository_id).await?;
            summary.managed_added += 1;
        }
        checklist.admin_confirmed.insert(repository_id);
        Ok(())
    }
}
