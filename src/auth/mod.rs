//! Authentication module: GitHub OAuth tokens presented as bearer credentials.

mod extractor;

use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;
use secrecy::SecretString;

pub use extractor::{AccountAuth, AuthError, BearerToken};

/// Extract the token from an `Authorization: Bearer <token>` header.
/// Returns None if the header is missing, not a bearer credential, or empty.
pub fn bearer_token(req: &HttpRequest) -> Option<SecretString> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(SecretString::from(token.to_string()))
}
