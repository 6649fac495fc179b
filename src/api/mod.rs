//! API endpoint modules.

pub mod account;
pub mod health;
pub mod openapi;
pub mod repositories;

pub use account::configure_routes as configure_account_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use repositories::configure_routes as configure_repository_routes;
