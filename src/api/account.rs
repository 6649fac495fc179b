//! Account endpoints: sign-in, profile and hooks token.

use actix_web::{HttpResponse, get, post, web};
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::auth::{AccountAuth, BearerToken};
use crate::config::Config;
use crate::db::{DbPool, accounts};
use crate::error::{AppError, AppResult};
use crate::models::{AccountResponse, HooksTokenResponse};
use crate::services::{GitHubClient, RemoteProvider};

/// Configure account routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signin)
        .service(get_account)
        .service(regenerate_hooks_token);
}

/// Sign in with a GitHub OAuth token.
///
/// Known tokens resolve directly. Otherwise GitHub is asked who owns the token
/// and the account is created, or refreshed if the GitHub user is already known.
#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    tag = "Account",
    responses(
        (status = 200, description = "Signed-in account", body = AccountResponse),
        (status = 401, description = "Missing token or rejected by GitHub")
    ),
    security(
        ("bearer" = [])
    )
)]
#[post("/account/signin")]
pub async fn signin(
    token: BearerToken,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let BearerToken(token) = token;
    let conn = pool.connection();

    let token_hash = accounts::hash_token(token.expose_secret());
    if let Some(account) = accounts::find_by_token_hash(conn, &token_hash).await? {
        return Ok(HttpResponse::Ok().json(AccountResponse::from(&account)));
    }

    let client = GitHubClient::new(&config.github, token.clone())?;
    let user = client.current_user().await.map_err(|e| {
        warn!("Sign-in: failed to fetch GitHub user: {}", e);
        AppError::Unauthorized("GitHub authentication failed".to_string())
    })?;

    let account = accounts::upsert_from_github(conn, &user, &token).await?;
    info!(
        "GitHub sign-in: login='{}' (github_id={}, account={})",
        account.github_login, account.github_id, account.id
    );

    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}

/// Current account profile.
#[utoipa::path(
    get,
    path = "/api/v1/account",
    tag = "Account",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer" = [])
    )
)]
#[get("/account")]
pub async fn get_account(auth: AccountAuth) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(AccountResponse::from(&auth.account)))
}

/// Generate a new hooks token, replacing any previous one.
#[utoipa::path(
    post,
    path = "/api/v1/account/hooks-token",
    tag = "Account",
    responses(
        (status = 200, description = "New hooks token", body = HooksTokenResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer" = [])
    )
)]
#[post("/account/hooks-token")]
pub async fn regenerate_hooks_token(
    auth: AccountAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let hooks_token = accounts::rotate_hooks_token(pool.connection(), auth.account.id).await?;
    info!("Regenerated hooks token for '{}'", auth.account.github_login);

    Ok(HttpResponse::Ok().json(HooksTokenResponse { hooks_token }))
}
