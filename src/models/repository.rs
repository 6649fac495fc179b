//! Organization and repository models.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use utoipa::ToSchema;

use super::snapshot::{RemoteOrganization, RemoteRepository};
use crate::error::{AppError, AppResult};

/// Form field prefix for the active toggle: `active.<repository_id>`.
pub const ACTIVE_FIELD_PREFIX: &str = "active.";

/// Local organization row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Organization {
    pub id: i64,
    pub name: Option<String>,
    pub login: String,
}

impl Organization {
    /// Name shown to users; falls back to the login when GitHub has no display name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

impl From<&RemoteOrganization> for Organization {
    fn from(o: &RemoteOrganization) -> Self {
        Self {
            id: o.id,
            name: o.name.clone(),
            login: o.login.clone(),
        }
    }
}

/// Local repository row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub private: bool,
    /// User opt-in for CI processing. Never written by a sync.
    pub active: bool,
    pub organization_id: Option<i64>,
}

impl Repository {
    /// Build a repository seen for the first time. New repositories start inactive.
    pub fn first_seen(remote: &RemoteRepository, organization_id: Option<i64>) -> Self {
        Self {
            id: remote.id,
            name: remote.name.clone(),
            url: remote.url.clone(),
            description: remote.description.clone(),
            fork: remote.fork,
            private: remote.private,
            active: false,
            organization_id,
        }
    }
}

/// The fields a sync is allowed to overwrite on an existing repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUpdate {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub private: bool,
}

impl RepositoryUpdate {
    /// True when applying this update would not change `repo`.
    pub fn matches(&self, repo: &Repository) -> bool {
        self.name == repo.name
            && self.url == repo.url
            && self.description == repo.description
            && self.fork == repo.fork
            && self.private == repo.private
    }
}

impl From<&RemoteRepository> for RepositoryUpdate {
    fn from(r: &RemoteRepository) -> Self {
        Self {
            name: r.name.clone(),
            url: r.url.clone(),
            description: r.description.clone(),
            fork: r.fork,
            private: r.private,
        }
    }
}

/// Repositories visible to an account, grouped the way the repositories page shows them.
#[derive(Debug, Serialize, ToSchema)]
pub struct RepositoryListResponse {
    /// Followed repositories that are not forks.
    pub own_repositories: Vec<Repository>,
    /// Followed repositories that are forks.
    pub fork_repositories: Vec<Repository>,
    /// Managed repositories keyed by organization display name.
    pub organization_repositories: BTreeMap<String, Vec<Repository>>,
}

/// Repository ids to switch on and off, parsed from `active.<id>` form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveToggle {
    pub activate: Vec<i64>,
    pub deactivate: Vec<i64>,
}

impl ActiveToggle {
    /// Parse `active.<id>=<n>` fields; `n > 0` activates, anything else deactivates.
    ///
    /// Fields without the prefix are ignored. A non-integer id or value is rejected.
    pub fn from_form(form: &HashMap<String, String>) -> AppResult<Self> {
        let mut toggle = ActiveToggle::default();

        for (key, value) in form {
            let Some(raw_id) = key.strip_prefix(ACTIVE_FIELD_PREFIX) else {
                continue;
            };

            let id = raw_id.trim().parse::<i64>().map_err(|_| {
                AppError::InvalidInput(format!("Invalid repository id in field '{}'", key))
            })?;
            let flag = value.trim().parse::<i64>().map_err(|_| {
                AppError::InvalidInput(format!("Invalid value '{}' for field '{}'", value, key))
            })?;

            if flag > 0 {
                toggle.activate.push(id);
            } else {
                toggle.deactivate.push(id);
            }
        }

        toggle.activate.sort_unstable();
        toggle.deactivate.sort_unstable();
        Ok(toggle)
    }

    pub fn is_empty(&self) -> bool {
        self.activate.is_empty() && self.deactivate.is_empty()
    }
}

/// Result of an active toggle.
#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResponse {
    /// Rows switched on.
    pub activated: u64,
    /// Rows switched off.
    pub deactivated: u64,
}
