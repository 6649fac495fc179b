//! Account models for GitHub-backed users.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Account stored in database.
///
/// `github_token` is the provider OAuth token used for every sync; it never
/// leaves the server and prints as `[REDACTED]` in debug output.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub github_id: i64,
    pub github_login: String,
    pub github_token: SecretString,
    pub gravatar_id: Option<String>,
    pub hooks_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account info response (returned by /account and /account/signin).
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: String,
    pub github_id: i64,
    pub github_login: String,
    pub gravatar_id: Option<String>,
    /// Whether a hooks token has been generated.
    pub has_hooks_token: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id.to_string(),
            github_id: a.github_id,
            github_login: a.github_login.clone(),
            gravatar_id: a.gravatar_id.clone(),
            has_hooks_token: a.hooks_token.is_some(),
            created_at: a.created_at,
        }
    }
}

/// Freshly generated hooks token.
#[derive(Debug, Serialize, ToSchema)]
pub struct HooksTokenResponse {
    pub hooks_token: String,
}
