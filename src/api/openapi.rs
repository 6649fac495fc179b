//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salt-CI Web",
        version = "0.1.0",
        description = "GitHub sign-in and organization/repository synchronization for Salt-CI"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Account endpoints
        api::account::signin,
        api::account::get_account,
        api::account::regenerate_hooks_token,
        // Repository endpoints
        api::repositories::list_repositories,
        api::repositories::update_repositories,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Account
            models::AccountResponse,
            models::HooksTokenResponse,
            // Repositories
            models::Organization,
            models::Repository,
            models::RepositoryListResponse,
            models::ToggleResponse,
            models::SyncSummary,
            models::SyncResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Account", description = "GitHub sign-in and account settings"),
        (name = "Repositories", description = "Repository sync and activation")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the GitHub bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .description(Some("GitHub OAuth token"))
                        .build(),
                ),
            );
        }
    }
}
