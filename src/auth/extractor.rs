//! Actix-web extractors for bearer token authentication.
//!
//! The token is wrapped in `SecretString` as soon as it leaves the header and
//! is only compared through its SHA-256 hash.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};
use std::future::{Ready, ready};
use tracing::{error, warn};

use super::bearer_token;
use crate::db::{DbPool, accounts};
use crate::error::ErrorResponse;
use crate::models::Account;

const MISSING_TOKEN: &str = "Missing GitHub token. Provide 'Authorization: Bearer <token>' header.";

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    message: String,
}

impl AuthError {
    fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.to_string(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal configuration error".to_string(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        let error = if self.status == StatusCode::UNAUTHORIZED {
            "UNAUTHORIZED"
        } else {
            "INTERNAL_ERROR"
        };
        HttpResponse::build(self.status).json(ErrorResponse {
            error: error.to_string(),
            message: self.message.clone(),
        })
    }
}

/// A bearer token that has not been matched to an account yet.
/// Used by sign-in, where the account may not exist.
pub struct BearerToken(pub SecretString);

impl FromRequest for BearerToken {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            bearer_token(req)
                .map(BearerToken)
                .ok_or_else(|| AuthError::unauthorized(MISSING_TOKEN)),
        )
    }
}

/// Extractor that requires a token belonging to a signed-in account.
///
/// ```ignore
/// async fn protected_handler(auth: AccountAuth) -> impl Responder {
///     // auth.account is the signed-in account
/// }
/// ```
pub struct AccountAuth {
    pub account: Account,
}

impl FromRequest for AccountAuth {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let token = token.ok_or_else(|| AuthError::unauthorized(MISSING_TOKEN))?;
            let Some(pool) = pool else {
                error!("DbPool missing from app data");
                return Err(AuthError::internal());
            };

            let token_hash = accounts::hash_token(token.expose_secret());
            match accounts::find_by_token_hash(pool.connection(), &token_hash).await {
                Ok(Some(account)) => Ok(AccountAuth { account }),
                Ok(None) => {
                    warn!("Rejected bearer token with no matching account");
                    Err(AuthError::unauthorized(
                        "Unknown token. Sign in with POST /api/v1/account/signin first.",
                    ))
                }
                Err(e) => {
                    error!("Account lookup failed: {}", e);
                    Err(AuthError::internal())
                }
            }
        })
    }
}
