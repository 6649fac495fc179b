//! Repository endpoints: listing, sync and the active toggle.

use std::collections::HashMap;

use actix_web::{HttpResponse, get, post, web};
use tracing::info;

use crate::auth::AccountAuth;
use crate::config::Config;
use crate::db::{DbPool, SeaOrmStore, repositories};
use crate::error::AppResult;
use crate::models::{ActiveToggle, RepositoryListResponse, SyncResponse};
use crate::services;
use crate::store::LocalStore;

/// Form field that requests a sync instead of an active toggle.
pub const SYNC_FIELD: &str = "sync_repos";

/// Configure repository routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_repositories).service(update_repositories);
}

/// Repositories the account follows or manages.
#[utoipa::path(
    get,
    path = "/api/v1/account/repositories",
    tag = "Repositories",
    responses(
        (status = 200, description = "Repositories grouped by owner", body = RepositoryListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer" = [])
    )
)]
#[get("/account/repositories")]
pub async fn list_repositories(
    auth: AccountAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let listing = repositories::list_for_account(pool.connection(), auth.account.id).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// Sync with GitHub, or switch repositories on and off.
///
/// A form containing `sync_repos` triggers a sync and returns its summary.
/// Otherwise every `active.<id>=<n>` field is applied: `n > 0` activates.
/// Only repositories the account manages are changed.
#[utoipa::path(
    post,
    path = "/api/v1/account/repositories",
    tag = "Repositories",
    responses(
        (status = 200, description = "Sync summary (`SyncResponse`) or toggle counts (`ToggleResponse`)"),
        (status = 400, description = "Malformed active field"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "GitHub request failed")
    ),
    security(
        ("bearer" = [])
    )
)]
#[post("/account/repositories")]
pub async fn update_repositories(
    auth: AccountAuth,
    form: web::Form<HashMap<String, String>>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    if form.contains_key(SYNC_FIELD) {
        let summary = services::sync_account(pool.get_ref(), config.get_ref(), &auth.account).await?;
        return Ok(HttpResponse::Ok().json(SyncResponse { summary }));
    }

    let toggle = ActiveToggle::from_form(&form)?;
    let mut store = SeaOrmStore::new(pool.connection().clone());
    let result = store.set_active(auth.account.id, &toggle).await?;
    store.commit().await?;
    info!(
        "Active toggle for '{}': {} activated, {} deactivated",
        auth.account.github_login, result.activated, result.deactivated
    );

    Ok(HttpResponse::Ok().json(result))
}
