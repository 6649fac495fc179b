//! SeaORM entity definitions for PostgreSQL database.

pub mod account;
pub mod account_managed_repository;
pub mod account_organization;
pub mod account_repository;
pub mod organization;
pub mod repository;
