//! Sync configuration and result types.

use serde::Serialize;
use utoipa::ToSchema;

/// Where a sync draws its transaction boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitMode {
    /// One transaction for the whole account: a failed sync persists nothing.
    #[default]
    Account,
    /// Commit after every organization: finished organizations survive a later failure.
    Organization,
}

impl CommitMode {
    /// Parse commit mode from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "account" => Some(Self::Account),
            "organization" | "org" => Some(Self::Organization),
            _ => None,
        }
    }
}

/// What a sync changed. All counters are zero when local state already matched GitHub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SyncSummary {
    pub organizations_created: u32,
    pub organizations_joined: u32,
    pub organizations_left: u32,
    pub repositories_created: u32,
    pub repositories_updated: u32,
    pub repositories_linked: u32,
    pub repositories_unlinked: u32,
    pub followed_added: u32,
    pub followed_removed: u32,
    pub managed_added: u32,
    pub managed_removed: u32,
    /// Repository entries seen without admin permission (informational, not a change).
    pub skipped_without_admin: u32,
}

impl SyncSummary {
    /// Number of mutations applied.
    pub fn changes(&self) -> u32 {
        self.organizations_created
            + self.organizations_joined
            + self.organizations_left
            + self.repositories_created
            + self.repositories_updated
            + self.repositories_linked
            + self.repositories_unlinked
            + self.followed_added
            + self.followed_removed
            + self.managed_added
            + self.managed_removed
    }
}

/// Response body for a repository sync.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResponse {
    pub summary: SyncSummary,
}
