//! In-process store backed by ordered maps and sets.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use uuid::Uuid;

use super::LocalStore;
use crate::error::{AppError, AppResult};
use crate::models::{ActiveToggle, Organization, Repository, RepositoryUpdate, ToggleResponse};

/// Keeps every row and relation edge in memory. Writes are visible immediately;
/// `commit` only counts checkpoints.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    organizations: BTreeMap<i64, Organization>,
    repositories: BTreeMap<i64, Repository>,
    memberships: BTreeSet<(Uuid, i64)>,
    followed: BTreeSet<(Uuid, i64)>,
    managed: BTreeSet<(Uuid, i64)>,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an organization row.
    pub fn insert_organization(&mut self, organization: Organization) {
        self.organizations.insert(organization.id, organization);
    }

    /// Insert or replace a repository row.
    pub fn insert_repository(&mut self, repository: Repository) {
        self.repositories.insert(repository.id, repository);
    }

    pub fn organization(&self, id: i64) -> Option<&Organization> {
        self.organizations.get(&id)
    }

    pub fn repository(&self, id: i64) -> Option<&Repository> {
        self.repositories.get(&id)
    }

    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.values()
    }

    pub fn memberships(&self, account_id: Uuid) -> BTreeSet<i64> {
        edges_of(&self.memberships, account_id)
    }

    pub fn followed(&self, account_id: Uuid) -> BTreeSet<i64> {
        edges_of(&self.followed, account_id)
    }

    pub fn managed(&self, account_id: Uuid) -> BTreeSet<i64> {
        edges_of(&self.managed, account_id)
    }

    /// Ids of repositories linked to the organization.
    pub fn linked_to(&self, organization_id: i64) -> BTreeSet<i64> {
        self.repositories
            .values()
            .filter(|r| r.organization_id == Some(organization_id))
            .map(|r| r.id)
            .collect()
    }

    /// Number of `commit` calls so far.
    pub fn commits(&self) -> usize {
        self.commits
    }

    fn repository_mut(&mut self, id: i64) -> AppResult<&mut Repository> {
        self.repositories
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Repository {}", id)))
    }
}

/// Set `active` on the listed rows that exist and are in `managed`.
fn apply_active(
    repositories: &mut BTreeMap<i64, Repository>,
    managed: &BTreeSet<i64>,
    ids: &[i64],
    active: bool,
) -> u64 {
    let ids: BTreeSet<i64> = ids.iter().copied().collect();
    let mut affected = 0;
    for id in ids.intersection(managed) {
        if let Some(repo) = repositories.get_mut(id) {
            repo.active = active;
            affected += 1;
        }
    }
    affected
}

fn edges_of(edges: &BTreeSet<(Uuid, i64)>, account_id: Uuid) -> BTreeSet<i64> {
    edges
        .range((account_id, i64::MIN)..=(account_id, i64::MAX))
        .map(|(_, id)| *id)
        .collect()
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn account_organizations(&mut self, account_id: Uuid) -> AppResult<BTreeSet<i64>> {
        Ok(self.memberships(account_id))
    }

    async fn account_repositories(&mut self, account_id: Uuid) -> AppResult<BTreeSet<i64>> {
        Ok(self.followed(account_id))
    }

    async fn account_managed_repositories(
        &mut self,
        account_id: Uuid,
    ) -> AppResult<BTreeSet<i64>> {
        Ok(self.managed(account_id))
    }

    async fn find_organization(&mut self, id: i64) -> AppResult<Option<Organization>> {
        Ok(self.organizations.get(&id).cloned())
    }

    async fn create_organization(&mut self, organization: &Organization) -> AppResult<()> {
        if self.organizations.contains_key(&organization.id) {
            return Err(AppError::Database(format!(
                "Organization {} already exists",
                organization.id
            )));
        }
        self.insert_organization(organization.clone());
        Ok(())
    }

    async fn organization_repositories(
        &mut self,
        organization_id: i64,
    ) -> AppResult<BTreeSet<i64>> {
        Ok(self.linked_to(organization_id))
    }

    async fn find_repository(&mut self, id: i64) -> AppResult<Option<Repository>> {
        Ok(self.repositories.get(&id).cloned())
    }

    async fn create_repository(&mut self, repository: &Repository) -> AppResult<()> {
        if self.repositories.contains_key(&repository.id) {
            return Err(AppError::Database(format!(
                "Repository {} already exists",
                repository.id
            )));
        }
        self.insert_repository(repository.clone());
        Ok(())
    }

    async fn update_repository(&mut self, id: i64, update: &RepositoryUpdate) -> AppResult<()> {
        let repo = self.repository_mut(id)?;
        repo.name = update.name.clone();
        repo.url = update.url.clone();
        repo.description = update.description.clone();
        repo.fork = update.fork;
        repo.private = update.private;
        Ok(())
    }

    async fn set_repository_organization(
        &mut self,
        id: i64,
        organization_id: Option<i64>,
    ) -> AppResult<()> {
        self.repository_mut(id)?.organization_id = organization_id;
        Ok(())
    }

    async fn add_membership(&mut self, account_id: Uuid, organization_id: i64) -> AppResult<()> {
        self.memberships.insert((account_id, organization_id));
        Ok(())
    }

    async fn remove_membership(
        &mut self,
        account_id: Uuid,
        organization_id: i64,
    ) -> AppResult<()> {
        self.memberships.remove(&(account_id, organization_id));
        Ok(())
    }

    async fn add_followed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        self.followed.insert((account_id, repository_id));
        Ok(())
    }

    async fn remove_followed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        self.followed.remove(&(account_id, repository_id));
        Ok(())
    }

    async fn add_managed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        self.managed.insert((account_id, repository_id));
        Ok(())
    }

    async fn remove_managed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        self.managed.remove(&(account_id, repository_id));
        Ok(())
    }

    async fn set_active(
        &mut self,
        account_id: Uuid,
        toggle: &ActiveToggle,
    ) -> AppResult<ToggleResponse> {
        let managed = self.managed(account_id);
        let activated = apply_active(&mut self.repositories, &managed, &toggle.activate, true);
        let deactivated =
            apply_active(&mut self.repositories, &managed, &toggle.deactivate, false);
        Ok(ToggleResponse {
            activated,
            deactivated,
        })
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.commits += 1;
        Ok(())
    }
}
