//! Remote snapshot types: what GitHub reports for an account at sync time.

/// The authenticated GitHub user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub id: i64,
    pub login: String,
    pub gravatar_id: Option<String>,
}

/// An organization the authenticated user belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOrganization {
    pub id: i64,
    /// Display name; GitHub leaves it unset for many organizations.
    pub name: Option<String>,
    pub login: String,
}

/// A repository as listed by GitHub, with the caller's admin permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub private: bool,
    pub admin: bool,
    /// Owning organization id, when the repository belongs to one.
    pub organization: Option<i64>,
}

/// An organization together with its repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationSnapshot {
    pub organization: RemoteOrganization,
    pub repositories: Vec<RemoteRepository>,
}

/// Everything a sync needs from GitHub, fetched before any local mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub organizations: Vec<OrganizationSnapshot>,
    pub personal_repositories: Vec<RemoteRepository>,
}

impl Snapshot {
    /// Total number of repository entries across organizations and personal listings.
    pub fn repository_count(&self) -> usize {
        self.organizations
            .iter()
            .map(|o| o.repositories.len())
            .sum::<usize>()
            + self.personal_repositories.len()
    }
}
