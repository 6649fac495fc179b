//! Domain models for Salt-CI web.

pub mod account;
pub mod repository;
pub mod snapshot;
pub mod sync;

// Re-export commonly used types
pub use account::{Account, AccountResponse, HooksTokenResponse};
pub use repository::{
    ActiveToggle, Organization, Repository, RepositoryListResponse, RepositoryUpdate,
    ToggleResponse,
};
pub use snapshot::{OrganizationSnapshot, RemoteOrganization, RemoteRepository, RemoteUser, Snapshot};
pub use sync::{CommitMode, SyncResponse, SyncSummary};
