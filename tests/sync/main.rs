//! Sync test suite.
//!
//! Drives the GitHub client and the reconciler end-to-end against an
//! in-process mock of the GitHub REST API. The local side is the in-memory
//! store, so no database is needed.
//!
//! Run with: cargo test --test sync

mod mock_github;
mod test_helpers;

mod test_sync_flow;
