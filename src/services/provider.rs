//! Remote snapshot provider abstraction.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::{
    OrganizationSnapshot, RemoteOrganization, RemoteRepository, RemoteUser, Snapshot,
};

/// Read-only view of the authenticated user's account at the provider.
#[async_trait]
pub trait RemoteProvider: Send + Sync {
    /// The user the token belongs to.
    async fn current_user(&self) -> AppResult<RemoteUser>;

    /// Organizations the user is a member of.
    async fn list_organizations(&self) -> AppResult<Vec<RemoteOrganization>>;

    /// Repositories of one organization, with the user's admin permission on each.
    async fn list_organization_repositories(
        &self,
        organization: &RemoteOrganization,
    ) -> AppResult<Vec<RemoteRepository>>;

    /// Repositories listed for the user, with the user's admin permission on each.
    async fn list_user_repositories(&self) -> AppResult<Vec<RemoteRepository>>;
}

/// Fetch everything a sync needs. Nothing is written locally until this returns,
/// so a provider failure never leaves a partial sync behind.
pub async fn fetch_snapshot<P: RemoteProvider + ?Sized>(provider: &P) -> AppResult<Snapshot> {
    let mut snapshot = Snapshot::default();

    for organization in provider.list_organizations().await? {
        let repositories = provider
            .list_organization_repositories(&organization)
            .await?;
        debug!(
            "Fetched {} repositories for organization '{}'",
            repositories.len(),
            organization.login
        );
        snapshot.organizations.push(OrganizationSnapshot {
            organization,
            repositories,
        });
    }

    snapshot.personal_repositories = provider.list_user_repositories().await?;

    info!(
        "Fetched snapshot: {} organizations, {} repository entries",
        snapshot.organizations.len(),
        snapshot.repository_count()
    );

    Ok(snapshot)
}
