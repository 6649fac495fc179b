//! Salt-CI web library.
//!
//! GitHub-backed accounts, and synchronization of their organizations and
//! repositories into the local database.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod store;
