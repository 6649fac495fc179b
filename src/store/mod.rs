//! Local store abstraction used by the reconciler.
//!
//! Relations are exposed as sets of remote ids so a sync can be written as
//! plain set arithmetic. Every method takes `&mut self`: implementations may
//! hold an open transaction and begin it lazily on first use.

pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ActiveToggle, Organization, Repository, RepositoryUpdate, ToggleResponse};

pub use memory::MemoryStore;

#[async_trait]
pub trait LocalStore: Send {
    /// Organizations the account is a member of.
    async fn account_organizations(&mut self, account_id: Uuid) -> AppResult<BTreeSet<i64>>;
    /// Repositories the account follows.
    async fn account_repositories(&mut self, account_id: Uuid) -> AppResult<BTreeSet<i64>>;
    /// Repositories the account administrates.
    async fn account_managed_repositories(&mut self, account_id: Uuid)
    -> AppResult<BTreeSet<i64>>;

    async fn find_organization(&mut self, id: i64) -> AppResult<Option<Organization>>;
    async fn create_organization(&mut self, organization: &Organization) -> AppResult<()>;
    /// Repositories currently linked to the organization.
    async fn organization_repositories(&mut self, organization_id: i64)
    -> AppResult<BTreeSet<i64>>;

    async fn find_repository(&mut self, id: i64) -> AppResult<Option<Repository>>;
    async fn create_repository(&mut self, repository: &Repository) -> AppResult<()>;
    /// Overwrite the synced fields. Must leave `active` and the organization link alone.
    async fn update_repository(&mut self, id: i64, update: &RepositoryUpdate) -> AppResult<()>;
    async fn set_repository_organization(
        &mut self,
        id: i64,
        organization_id: Option<i64>,
    ) -> AppResult<()>;

    async fn add_membership(&mut self, account_id: Uuid, organization_id: i64) -> AppResult<()>;
    async fn remove_membership(&mut self, account_id: Uuid, organization_id: i64)
    -> AppResult<()>;
    async fn add_followed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()>;
    async fn remove_followed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()>;
    async fn add_managed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()>;
    async fn remove_managed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()>;

    /// Switch `active` on or off for repositories the account manages. Ids the
    /// account does not manage are ignored; no other column changes.
    async fn set_active(
        &mut self,
        account_id: Uuid,
        toggle: &ActiveToggle,
    ) -> AppResult<ToggleResponse>;

    /// Make everything written so far durable.
    async fn commit(&mut self) -> AppResult<()>;
}
