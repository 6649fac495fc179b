//! Business logic services.

pub mod github;
pub mod provider;
pub mod reconciler;
pub mod sync;

pub use github::GitHubClient;
pub use provider::{RemoteProvider, fetch_snapshot};
pub use reconciler::Reconciler;
pub use sync::{sync_account, sync_with};
